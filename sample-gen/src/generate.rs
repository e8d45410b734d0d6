use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::GenerateError;
use crate::records::{InvoiceRecord, AMOUNT, SAMPLE_RECORDS};
use crate::render::create_invoice_pdf;

pub const DEFAULT_OUTPUT_DIR: &str = "sample_pdfs";
pub const MANIFEST_FILE_NAME: &str = "customers.csv";

/// Header row the upload manifest starts with.
const MANIFEST_HEADER: &str = "name,phone,amount,invoice";

/// Settings for one generation run. `Default` is the no-argument run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub output_dir: PathBuf,
    /// FlateDecode the page content streams.
    pub compress: bool,
    /// Also write `customers.csv` next to the PDFs.
    pub manifest: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            compress: false,
            manifest: false,
        }
    }
}

/// What a run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    /// Document paths in generation order.
    pub created: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
}

/// Write every sample invoice into `config.output_dir`.
pub fn generate(config: &GeneratorConfig) -> Result<GenerationReport, GenerateError> {
    generate_with(config, |_| {})
}

/// Like [`generate`], calling `on_created` after each document is on disk.
///
/// The output directory (and any missing parents) is created first.
/// Existing documents with the same name are overwritten. The first
/// failure stops the run.
pub fn generate_with<F>(
    config: &GeneratorConfig,
    mut on_created: F,
) -> Result<GenerationReport, GenerateError>
where
    F: FnMut(&Path),
{
    let dir = &config.output_dir;
    ensure_output_dir(dir)?;

    let mut created = Vec::with_capacity(SAMPLE_RECORDS.len());
    for record in &SAMPLE_RECORDS {
        let path = create_invoice_pdf(record, dir, config.compress)?;
        on_created(&path);
        created.push(path);
    }

    let manifest = if config.manifest {
        Some(write_manifest(&SAMPLE_RECORDS, dir)?)
    } else {
        None
    };

    info!(
        dir = %dir.display(),
        documents = created.len(),
        manifest = manifest.is_some(),
        "sample data generated"
    );
    Ok(GenerationReport {
        output_dir: dir.clone(),
        created,
        manifest,
    })
}

fn ensure_output_dir(dir: &Path) -> Result<(), GenerateError> {
    if dir.is_dir() {
        debug!(dir = %dir.display(), "output directory exists");
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| GenerateError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    info!(dir = %dir.display(), "created output directory");
    Ok(())
}

/// Write `<dir>/customers.csv` listing `records` in the column layout
/// the upload form expects.
pub fn write_manifest(records: &[InvoiceRecord], dir: &Path) -> Result<PathBuf, GenerateError> {
    let path = dir.join(MANIFEST_FILE_NAME);
    fs::write(&path, manifest_csv(records)).map_err(|source| GenerateError::WriteManifest {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), rows = records.len(), "manifest written");
    Ok(path)
}

fn manifest_csv(records: &[InvoiceRecord]) -> String {
    let mut csv = String::from(MANIFEST_HEADER);
    csv.push('\n');
    for record in records {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            record.name,
            record.phone,
            AMOUNT,
            record.id,
        ));
    }
    csv
}
