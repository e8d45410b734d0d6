use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::objects::{ObjId, PdfObject};

/// Low-level serializer. Writes indirect objects to any `Write` target
/// and remembers where each one starts so the xref table can be built
/// at the end.
pub struct PdfWriter<W: Write> {
    inner: W,
    offset: usize,
    offsets: BTreeMap<u32, usize>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(inner: W) -> Self {
        PdfWriter {
            inner,
            offset: 0,
            offsets: BTreeMap::new(),
        }
    }

    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.offset += bytes.len();
        Ok(())
    }

    /// `%PDF-1.7` followed by a comment of high-bit bytes so transfer
    /// tools treat the file as binary.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.emit(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n")
    }

    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        self.offsets.insert(id.0, self.offset);
        let mut buf = format!("{} {} obj\n", id.0, id.1).into_bytes();
        encode_object(obj, &mut buf);
        buf.extend_from_slice(b"\nendobj\n");
        self.emit(&buf)
    }

    /// Number of bytes written so far.
    pub fn current_offset(&self) -> usize {
        self.offset
    }

    /// Emit the xref table, trailer, `startxref` and `%%EOF`.
    /// Object numbers never written are listed as free entries.
    pub fn write_xref_and_trailer(
        &mut self,
        root: ObjId,
        info: Option<ObjId>,
    ) -> io::Result<()> {
        let xref_start = self.offset;
        let size = self.offsets.keys().next_back().map_or(1, |n| n + 1);

        let mut out = format!("xref\n0 {}\n", size).into_bytes();
        // Every entry is exactly 20 bytes including the CRLF.
        out.extend_from_slice(b"0000000000 65535 f\r\n");
        for num in 1..size {
            match self.offsets.get(&num) {
                Some(off) => {
                    out.extend_from_slice(format!("{:010} 00000 n\r\n", off).as_bytes())
                }
                None => out.extend_from_slice(b"0000000000 00000 f\r\n"),
            }
        }

        out.extend_from_slice(
            format!("trailer\n<< /Size {} /Root {} {} R", size, root.0, root.1).as_bytes(),
        );
        if let Some(info) = info {
            out.extend_from_slice(format!(" /Info {} {} R", info.0, info.1).as_bytes());
        }
        out.extend_from_slice(format!(" >>\nstartxref\n{}\n%%EOF\n", xref_start).as_bytes());
        self.emit(&out)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Append the PDF text form of `obj` to `out`.
pub fn encode_object(obj: &PdfObject, out: &mut Vec<u8>) {
    match obj {
        PdfObject::Integer(n) => out.extend_from_slice(n.to_string().as_bytes()),
        PdfObject::Real(f) => out.extend_from_slice(format_real(*f).as_bytes()),
        PdfObject::Name(name) => {
            out.push(b'/');
            out.extend_from_slice(name.as_bytes());
        }
        PdfObject::LiteralString(s) => {
            out.push(b'(');
            out.extend_from_slice(escape_pdf_string(s).as_bytes());
            out.push(b')');
        }
        PdfObject::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                encode_object(item, out);
            }
            out.push(b']');
        }
        PdfObject::Dictionary(entries) => {
            out.extend_from_slice(b"<<");
            encode_entries(entries, out);
            out.extend_from_slice(b" >>");
        }
        PdfObject::Stream { dict, data } => {
            out.extend_from_slice(b"<<");
            encode_entries(dict, out);
            out.extend_from_slice(format!(" /Length {} >>\nstream\n", data.len()).as_bytes());
            out.extend_from_slice(data);
            out.extend_from_slice(b"\nendstream");
        }
        PdfObject::Reference(id) => {
            out.extend_from_slice(format!("{} {} R", id.0, id.1).as_bytes())
        }
    }
}

fn encode_entries(entries: &[(String, PdfObject)], out: &mut Vec<u8>) {
    for (key, value) in entries {
        out.extend_from_slice(b" /");
        out.extend_from_slice(key.as_bytes());
        out.push(b' ');
        encode_object(value, out);
    }
}

/// Escape a string for use inside `( ... )`.
pub fn escape_pdf_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Whole numbers keep one decimal (`612.0`); others are trimmed to at
/// most six places. Never scientific notation.
fn format_real(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        format!("{:.6}", f)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
