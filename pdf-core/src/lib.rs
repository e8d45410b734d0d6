pub mod content;
pub mod document;
pub mod fonts;
pub mod objects;
pub mod reader;
pub mod writer;

pub use document::PdfDocument;
pub use fonts::BuiltinFont;
pub use reader::{PdfReadError, PdfReader};
