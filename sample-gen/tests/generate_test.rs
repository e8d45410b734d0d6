use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use pdf_core::PdfReader;
use sample_gen::generate::MANIFEST_FILE_NAME;
use sample_gen::{
    create_invoice_pdf, generate, generate_with, render_invoice, GenerateError, GeneratorConfig,
    SAMPLE_RECORDS,
};

fn config_for(dir: &Path) -> GeneratorConfig {
    GeneratorConfig {
        output_dir: dir.to_path_buf(),
        ..GeneratorConfig::default()
    }
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn writes_one_single_page_pdf_per_record() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("sample_pdfs");

    let report = generate(&config_for(&out)).unwrap();

    assert_eq!(report.created.len(), SAMPLE_RECORDS.len());
    assert_eq!(report.manifest, None);
    for (record, path) in SAMPLE_RECORDS.iter().zip(&report.created) {
        assert_eq!(path, &out.join(format!("{}.pdf", record.id)));
        assert!(fs::metadata(path).unwrap().len() > 0);

        let reader = PdfReader::open(path).unwrap();
        assert_eq!(reader.page_count(), 1);
        assert_eq!(reader.page_text(0).unwrap(), record.payload());
        assert_eq!(
            reader.info("Title"),
            Some(format!("Invoice {}", record.id).as_str())
        );
    }
}

#[test]
fn first_invoice_text() {
    let tmp = tempfile::tempdir().unwrap();
    let path = create_invoice_pdf(&SAMPLE_RECORDS[0], tmp.path(), false).unwrap();

    let reader = PdfReader::open(&path).unwrap();
    assert_eq!(
        reader.page_text(0).unwrap(),
        "Invoice: INV-001\nCustomer: John Mensah\nAmount: 500.00"
    );
}

#[test]
fn creates_missing_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("nested").join("sample_pdfs");
    assert!(!out.exists());

    generate(&config_for(&out)).unwrap();

    assert!(out.is_dir());
}

#[test]
fn existing_directory_is_reused() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("notes.txt"), "keep me").unwrap();

    generate(&config_for(tmp.path())).unwrap();

    assert_eq!(
        fs::read_to_string(tmp.path().join("notes.txt")).unwrap(),
        "keep me"
    );
}

#[test]
fn rerun_overwrites_instead_of_duplicating() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_for(tmp.path());
    fs::write(tmp.path().join("INV-002.pdf"), "stale").unwrap();

    generate(&config).unwrap();
    let first = file_names(tmp.path());
    generate(&config).unwrap();
    let second = file_names(tmp.path());

    assert_eq!(first, second);
    assert_eq!(first.len(), SAMPLE_RECORDS.len());
    let replaced = fs::read(tmp.path().join("INV-002.pdf")).unwrap();
    assert!(replaced.starts_with(b"%PDF-"));
}

#[test]
fn callback_sees_files_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let mut seen = Vec::new();

    generate_with(&config_for(tmp.path()), |path| {
        assert!(path.is_file());
        seen.push(path.file_name().unwrap().to_string_lossy().into_owned());
    })
    .unwrap();

    assert_eq!(
        seen,
        ["INV-001.pdf", "INV-002.pdf", "INV-003.pdf", "INV-004.pdf", "INV-005.pdf"]
    );
}

#[test]
fn compressed_output_reads_back_the_same() {
    let tmp = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        compress: true,
        ..config_for(tmp.path())
    };

    let report = generate(&config).unwrap();

    let bytes = fs::read(&report.created[3]).unwrap();
    assert!(bytes.windows(11).any(|w| w == b"FlateDecode"));
    let reader = PdfReader::from_bytes(bytes).unwrap();
    assert_eq!(reader.page_text(0).unwrap(), SAMPLE_RECORDS[3].payload());
}

#[test]
fn manifest_lists_every_invoice() {
    let tmp = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        manifest: true,
        ..config_for(tmp.path())
    };

    let report = generate(&config).unwrap();

    let manifest = report.manifest.unwrap();
    assert_eq!(manifest, tmp.path().join(MANIFEST_FILE_NAME));
    let csv = fs::read_to_string(manifest).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "name,phone,amount,invoice");
    assert_eq!(lines[5], "Kofi Boateng,233245678901,500.00,INV-005");
    assert_eq!(lines.len(), 6);
}

#[test]
fn blocked_output_dir_fails_without_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("sample_pdfs");
    fs::write(&blocker, "not a directory").unwrap();

    let err = generate(&config_for(&blocker)).unwrap_err();

    match err {
        GenerateError::CreateDir { path, .. } => assert_eq!(path, blocker),
        other => panic!("expected CreateDir, got {other:?}"),
    }
    assert_eq!(file_names(tmp.path()).len(), 1);
}

#[test]
fn render_to_memory() {
    let bytes = render_invoice(&SAMPLE_RECORDS[2], Vec::new(), false).unwrap();
    let reader = PdfReader::from_bytes(bytes).unwrap();
    assert_eq!(
        reader.page_text(0).unwrap(),
        "Invoice: INV-003\nCustomer: Kwame Osei\nAmount: 500.00"
    );
}

#[test]
fn pages_are_a4() {
    let bytes = render_invoice(&SAMPLE_RECORDS[0], Vec::new(), false).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/MediaBox [0.0 0.0 595.2756 841.8898]"));
}
