use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::debug;

use crate::fonts::BuiltinFont;
use crate::objects::{ObjId, PdfObject};
use crate::writer::{escape_pdf_string, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FIRST_FONT_OBJ_NUM: u32 = 3;

/// Font size used by `place_text` and `place_text_lines`.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Builds a PDF document page by page.
///
/// Generic over `Write`, so the same code targets a file
/// (`BufWriter<File>`) or an in-memory `Vec<u8>`. Each page is written
/// out by `end_page()`; only the page tree references stay in memory.
///
/// Coordinates are in points with PDF's bottom-left origin.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    page_ids: Vec<ObjId>,
    current_page: Option<PageBuilder>,
    next_obj_num: u32,
    compress: bool,
}

struct PageBuilder {
    width: f64,
    height: f64,
    content: Vec<u8>,
}

impl PdfDocument<BufWriter<File>> {
    /// Create (or truncate) the file at `path` and start a document in it.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> PdfDocument<W> {
    /// Start a document. The header and the shared font objects are
    /// written immediately.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut writer = PdfWriter::new(writer);
        writer.write_header()?;

        for (i, font) in BuiltinFont::ALL.iter().enumerate() {
            let font_dict = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(font.pdf_base_name())),
            ]);
            writer.write_object(font_obj_id(i), &font_dict)?;
        }

        Ok(PdfDocument {
            writer,
            info: Vec::new(),
            page_ids: Vec::new(),
            current_page: None,
            next_obj_num: FIRST_FONT_OBJ_NUM + BuiltinFont::ALL.len() as u32,
            compress: false,
        })
    }

    /// Add an entry to the document info dictionary (`Title`, `Creator`, ...).
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// FlateDecode page content streams written after this call.
    pub fn set_compression(&mut self, enabled: bool) -> &mut Self {
        self.compress = enabled;
        self
    }

    /// Open a new page of `width` x `height` points, closing any page
    /// still open.
    pub fn begin_page(&mut self, width: f64, height: f64) -> io::Result<&mut Self> {
        if self.current_page.is_some() {
            self.end_page()?;
        }
        self.current_page = Some(PageBuilder {
            width,
            height,
            content: Vec::new(),
        });
        Ok(self)
    }

    /// Draw `text` at (x, y) in 12pt Helvetica.
    pub fn place_text(&mut self, text: &str, x: f64, y: f64) -> io::Result<&mut Self> {
        self.place_text_styled(text, x, y, BuiltinFont::Helvetica, DEFAULT_FONT_SIZE)
    }

    pub fn place_text_styled(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: BuiltinFont,
        font_size: f64,
    ) -> io::Result<&mut Self> {
        let ops = format!(
            "BT\n/{} {} Tf\n{} {} Td\n({}) Tj\nET\n",
            font.pdf_name(),
            format_coord(font_size),
            format_coord(x),
            format_coord(y),
            escape_pdf_string(text),
        );
        self.page_mut()?.content.extend_from_slice(ops.as_bytes());
        Ok(self)
    }

    /// Draw consecutive lines in 12pt Helvetica. The first baseline sits
    /// at (x, y); each following line is `leading` points lower.
    pub fn place_text_lines<S: AsRef<str>>(
        &mut self,
        lines: &[S],
        x: f64,
        y: f64,
        leading: f64,
    ) -> io::Result<&mut Self> {
        let mut ops = format!(
            "BT\n/{} {} Tf\n{} TL\n{} {} Td\n",
            BuiltinFont::Helvetica.pdf_name(),
            format_coord(DEFAULT_FONT_SIZE),
            format_coord(leading),
            format_coord(x),
            format_coord(y),
        );
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                ops.push_str("T*\n");
            }
            ops.push_str(&format!("({}) Tj\n", escape_pdf_string(line.as_ref())));
        }
        ops.push_str("ET\n");
        self.page_mut()?.content.extend_from_slice(ops.as_bytes());
        Ok(self)
    }

    /// Write the open page's content stream and page dictionary.
    pub fn end_page(&mut self) -> io::Result<()> {
        let page = self
            .current_page
            .take()
            .ok_or_else(|| no_open_page("end_page"))?;

        let content_id = self.alloc_obj_id();
        let page_id = self.alloc_obj_id();

        let content_stream = if self.compress {
            PdfObject::stream(
                vec![("Filter", PdfObject::name("FlateDecode"))],
                deflate(&page.content)?,
            )
        } else {
            PdfObject::stream(vec![], page.content)
        };
        self.writer.write_object(content_id, &content_stream)?;

        let fonts = BuiltinFont::ALL
            .iter()
            .enumerate()
            .map(|(i, f)| (f.pdf_name(), PdfObject::Reference(font_obj_id(i))))
            .collect();
        let page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PAGES_OBJ.into()),
            ("MediaBox", PdfObject::rect(0.0, 0.0, page.width, page.height)),
            ("Contents", content_id.into()),
            (
                "Resources",
                PdfObject::dict(vec![("Font", PdfObject::dict(fonts))]),
            ),
        ]);
        self.writer.write_object(page_id, &page_dict)?;

        self.page_ids.push(page_id);
        debug!(
            page = self.page_ids.len(),
            offset = self.writer.current_offset(),
            "page written"
        );
        Ok(())
    }

    /// Write the info dictionary, page tree, catalog and trailer, flush,
    /// and hand back the underlying writer. An open page is closed first.
    pub fn end_document(mut self) -> io::Result<W> {
        if self.current_page.is_some() {
            self.end_page()?;
        }

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = self.alloc_obj_id();
            let entries = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::literal_string(v)))
                .collect();
            self.writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            (
                "Kids",
                PdfObject::Array(self.page_ids.iter().map(|&id| id.into()).collect()),
            ),
            ("Count", PdfObject::Integer(self.page_ids.len() as i64)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PAGES_OBJ.into()),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;

        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;
        self.writer.flush()?;
        debug!(
            pages = self.page_ids.len(),
            bytes = self.writer.current_offset(),
            "document finished"
        );
        Ok(self.writer.into_inner())
    }

    fn page_mut(&mut self) -> io::Result<&mut PageBuilder> {
        self.current_page
            .as_mut()
            .ok_or_else(|| no_open_page("drawing"))
    }

    fn alloc_obj_id(&mut self) -> ObjId {
        let id = ObjId::new(self.next_obj_num);
        self.next_obj_num += 1;
        id
    }
}

fn font_obj_id(index: usize) -> ObjId {
    ObjId::new(FIRST_FONT_OBJ_NUM + index as u32)
}

fn no_open_page(op: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{} requires an open page; call begin_page first", op),
    )
}

fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Format a content-stream number: integers without a decimal point,
/// fractions with up to four places.
pub(crate) fn format_coord(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.4}", v)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::format_coord;

    #[test]
    fn coords_drop_needless_decimals() {
        assert_eq!(format_coord(750.0), "750");
        assert_eq!(format_coord(-3.0), "-3");
        assert_eq!(format_coord(12.5), "12.5");
        assert_eq!(format_coord(0.12346), "0.1235");
    }
}
