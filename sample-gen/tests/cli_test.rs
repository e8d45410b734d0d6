use std::process::Command;

fn sample_gen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sample-gen"));
    cmd.env_remove("SAMPLE_PDFS_DIR").env_remove("RUST_LOG");
    cmd
}

#[test]
fn no_arguments_writes_into_sample_pdfs() {
    let tmp = tempfile::tempdir().unwrap();

    let output = sample_gen().current_dir(tmp.path()).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Generating sample PDFs for testing...");
    assert_eq!(lines[1], "Created sample_pdfs/INV-001.pdf");
    assert_eq!(lines[5], "Created sample_pdfs/INV-005.pdf");
    assert!(stdout.contains("1. Click 'Load Sample Data'"));
    assert!(stdout.contains("3. Navigate to the 'sample_pdfs' folder and select ALL files."));

    for n in 1..=5 {
        assert!(tmp.path().join(format!("sample_pdfs/INV-00{n}.pdf")).is_file());
    }
}

#[test]
fn output_dir_from_environment() {
    let tmp = tempfile::tempdir().unwrap();

    let output = sample_gen()
        .current_dir(tmp.path())
        .env("SAMPLE_PDFS_DIR", "fixtures")
        .arg("--manifest")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(tmp.path().join("fixtures/INV-003.pdf").is_file());
    assert!(tmp.path().join("fixtures/customers.csv").is_file());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Created fixtures/customers.csv"));
    assert!(stdout.contains("Navigate to the 'fixtures' folder"));
}

#[test]
fn unwritable_output_exits_non_zero() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("blocked"), "file").unwrap();

    let output = sample_gen()
        .current_dir(tmp.path())
        .args(["--output-dir", "blocked"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not generate sample PDFs in blocked"));
}
