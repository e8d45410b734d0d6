pub mod error;
pub mod generate;
pub mod records;
pub mod render;

pub use error::GenerateError;
pub use generate::{generate, generate_with, GenerationReport, GeneratorConfig};
pub use records::{InvoiceRecord, SAMPLE_RECORDS};
pub use render::{create_invoice_pdf, render_invoice};
