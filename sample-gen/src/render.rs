use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use pdf_core::PdfDocument;
use tracing::debug;

use crate::error::GenerateError;
use crate::records::InvoiceRecord;

/// A4, in points.
pub const PAGE_WIDTH: f64 = 595.2756;
pub const PAGE_HEIGHT: f64 = 841.8898;

/// Baseline of the first text line.
pub const TEXT_X: f64 = 100.0;
pub const TEXT_Y: f64 = 750.0;

/// Distance between consecutive baselines.
pub const LINE_LEADING: f64 = 14.0;

/// Write `record` as a one-page document to `writer`.
pub fn render_invoice<W: Write>(
    record: &InvoiceRecord,
    writer: W,
    compress: bool,
) -> io::Result<W> {
    let mut doc = PdfDocument::new(writer)?;
    doc.set_info("Title", &format!("Invoice {}", record.id))
        .set_info("Creator", "sample-gen")
        .set_compression(compress);
    doc.begin_page(PAGE_WIDTH, PAGE_HEIGHT)?
        .place_text_lines(&record.payload_lines(), TEXT_X, TEXT_Y, LINE_LEADING)?;
    doc.end_page()?;
    doc.end_document()
}

/// Write `record` to `<dir>/<id>.pdf`, replacing any file already there.
pub fn create_invoice_pdf(
    record: &InvoiceRecord,
    dir: &Path,
    compress: bool,
) -> Result<PathBuf, GenerateError> {
    let path = dir.join(record.file_name());
    File::create(&path)
        .and_then(|file| render_invoice(record, BufWriter::new(file), compress))
        .map_err(|source| GenerateError::WriteDocument {
            path: path.clone(),
            source,
        })?;
    debug!(invoice = record.id, path = %path.display(), "invoice written");
    Ok(path)
}
