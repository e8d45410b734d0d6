use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sample_gen::generate::DEFAULT_OUTPUT_DIR;
use sample_gen::{generate_with, GeneratorConfig};

mod logging;

/// Generate placeholder invoice PDFs for testing the Web App's PDF upload.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory the PDFs are written to.
    #[arg(short, long, env = "SAMPLE_PDFS_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Compress page content streams.
    #[arg(long)]
    compress: bool,

    /// Also write customers.csv for the Web App's CSV upload.
    #[arg(long)]
    manifest: bool,

    /// Log more (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<&Args> for GeneratorConfig {
    fn from(args: &Args) -> Self {
        GeneratorConfig {
            output_dir: args.output_dir.clone(),
            compress: args.compress,
            manifest: args.manifest,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let config = GeneratorConfig::from(&args);

    println!("Generating sample PDFs for testing...");
    let report = generate_with(&config, |path| println!("Created {}", path.display()))
        .with_context(|| {
            format!(
                "could not generate sample PDFs in {}",
                config.output_dir.display()
            )
        })?;
    if let Some(manifest) = &report.manifest {
        println!("Created {}", manifest.display());
    }

    let folder = report
        .output_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.output_dir.display().to_string());
    println!("\n✅ Done! Now go to the Web App:");
    println!("1. Click 'Load Sample Data'");
    println!("2. Click 'Upload PDFs'");
    println!("3. Navigate to the '{}' folder and select ALL files.", folder);

    Ok(())
}
