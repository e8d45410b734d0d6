use std::collections::HashMap;
use std::io::{self, Read};
use std::path::Path;

use flate2::read::ZlibDecoder;
use thiserror::Error;

use crate::content::{bytes_to_text, extract_text, read_hex_string, read_literal_string};

/// Nesting limit for `/Pages` nodes; deeper trees are treated as cyclic.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Errors that can occur when reading a PDF file.
#[derive(Debug, Error, PartialEq)]
pub enum PdfReadError {
    #[error("not a PDF file")]
    NotAPdf,
    #[error("startxref not found")]
    StartxrefNotFound,
    #[error("malformed or missing xref table")]
    MalformedXref,
    #[error("malformed or missing trailer")]
    MalformedTrailer,
    /// PDF 1.5+ cross-reference streams are not supported.
    #[error("cross-reference streams (PDF 1.5+) are not supported")]
    XrefStreamNotSupported,
    #[error("cannot resolve object {0}")]
    UnresolvableObject(u32),
    #[error("malformed page tree")]
    MalformedPageTree,
    #[error("page {index} out of range (document has {count})")]
    PageOutOfRange { index: usize, count: usize },
    #[error("unsupported stream filter {0}")]
    UnsupportedFilter(String),
    #[error("corrupt stream in object {0}")]
    CorruptStream(u32),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for PdfReadError {
    fn from(e: io::Error) -> Self {
        PdfReadError::Io(e.to_string())
    }
}

/// Reads an existing PDF with a classic xref table.
///
/// Parsing happens up front: the xref table, trailer and page tree are
/// resolved in `from_bytes`. Page content is decoded lazily by
/// `page_text`.
pub struct PdfReader {
    data: Vec<u8>,
    xref: HashMap<u32, usize>,
    version: String,
    pages: Vec<u32>,
    info: HashMap<String, Value>,
}

impl PdfReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdfReadError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, PdfReadError> {
        let version = parse_version(&data)?;
        let xref_offset = find_startxref(&data)?;
        let section = &data[xref_offset..];
        if !skip_whitespace(section).starts_with(b"xref") {
            return Err(PdfReadError::XrefStreamNotSupported);
        }
        let xref = parse_xref_table(section)?;
        let trailer = parse_trailer(section)?;

        let root = trailer
            .get("Root")
            .and_then(Value::as_obj_num)
            .ok_or(PdfReadError::MalformedTrailer)?;

        let mut reader = PdfReader {
            data,
            xref,
            version,
            pages: Vec::new(),
            info: HashMap::new(),
        };

        let catalog = reader.resolve_dict(root)?;
        let pages_root = catalog
            .get("Pages")
            .and_then(Value::as_obj_num)
            .ok_or(PdfReadError::MalformedPageTree)?;
        let mut pages = Vec::new();
        reader.collect_pages(pages_root, 0, &mut pages)?;
        reader.pages = pages;

        if let Some(info_ref) = trailer.get("Info").and_then(Value::as_obj_num) {
            reader.info = reader.resolve_dict(info_ref)?;
        }

        Ok(reader)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// PDF version from the header (e.g. `"1.7"`).
    pub fn pdf_version(&self) -> &str {
        &self.version
    }

    /// A string entry of the document info dictionary.
    pub fn info(&self, key: &str) -> Option<&str> {
        match self.info.get(key) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Text shown on page `index` (zero-based), one line per text line.
    pub fn page_text(&self, index: usize) -> Result<String, PdfReadError> {
        let page_num = *self.pages.get(index).ok_or(PdfReadError::PageOutOfRange {
            index,
            count: self.pages.len(),
        })?;
        let page = self.resolve_dict(page_num)?;

        let mut content = Vec::new();
        match page.get("Contents") {
            Some(Value::Ref(num)) => content.extend(self.stream_data(*num)?),
            Some(Value::Array(raw)) => {
                for num in parse_ref_list(raw) {
                    content.extend(self.stream_data(num)?);
                    content.push(b'\n');
                }
            }
            // A page without /Contents is blank.
            None => {}
            Some(_) => return Err(PdfReadError::MalformedPageTree),
        }
        Ok(extract_text(&content))
    }

    fn collect_pages(
        &self,
        node: u32,
        depth: usize,
        out: &mut Vec<u32>,
    ) -> Result<(), PdfReadError> {
        if depth > MAX_PAGE_TREE_DEPTH {
            return Err(PdfReadError::MalformedPageTree);
        }
        let dict = self.resolve_dict(node)?;
        match dict.get("Type") {
            Some(Value::Atom(t)) if t == "/Page" => out.push(node),
            Some(Value::Atom(t)) if t == "/Pages" => {
                let kids = match dict.get("Kids") {
                    Some(Value::Array(raw)) => parse_ref_list(raw),
                    _ => return Err(PdfReadError::MalformedPageTree),
                };
                for kid in kids {
                    self.collect_pages(kid, depth + 1, out)?;
                }
            }
            _ => return Err(PdfReadError::MalformedPageTree),
        }
        Ok(())
    }

    /// Body of indirect object `num`, starting right after `obj`.
    fn object_body(&self, num: u32) -> Result<&[u8], PdfReadError> {
        let offset = self
            .xref
            .get(&num)
            .copied()
            .filter(|&off| off < self.data.len())
            .ok_or(PdfReadError::UnresolvableObject(num))?;
        skip_obj_header(&self.data[offset..]).ok_or(PdfReadError::UnresolvableObject(num))
    }

    fn resolve_dict(&self, num: u32) -> Result<HashMap<String, Value>, PdfReadError> {
        let body = self.object_body(num)?;
        parse_dict(body)
            .map(|(dict, _)| dict)
            .ok_or(PdfReadError::UnresolvableObject(num))
    }

    /// Decoded data of stream object `num`.
    fn stream_data(&self, num: u32) -> Result<Vec<u8>, PdfReadError> {
        let body = self.object_body(num)?;
        let (dict, rest) = parse_dict(body).ok_or(PdfReadError::UnresolvableObject(num))?;

        let rest = skip_whitespace(rest);
        let rest = rest
            .strip_prefix(b"stream")
            .ok_or(PdfReadError::CorruptStream(num))?;
        let rest = rest
            .strip_prefix(b"\r\n")
            .or_else(|| rest.strip_prefix(b"\n"))
            .ok_or(PdfReadError::CorruptStream(num))?;

        let length = match dict.get("Length") {
            Some(Value::Atom(n)) => n.parse::<usize>().ok(),
            Some(Value::Ref(len_obj)) => {
                next_token(self.object_body(*len_obj)?).and_then(|(t, _)| t.parse().ok())
            }
            _ => None,
        };
        let raw = match length {
            Some(len) if len <= rest.len() => &rest[..len],
            _ => {
                let end = find(rest, b"endstream").ok_or(PdfReadError::CorruptStream(num))?;
                &rest[..end]
            }
        };

        let filters = match dict.get("Filter") {
            None => Vec::new(),
            Some(Value::Atom(name)) => vec![name.clone()],
            Some(Value::Array(raw)) => raw.split_whitespace().map(str::to_string).collect(),
            Some(_) => return Err(PdfReadError::CorruptStream(num)),
        };

        let mut data = raw.to_vec();
        for filter in filters {
            data = match filter.as_str() {
                "/FlateDecode" => {
                    let mut out = Vec::new();
                    ZlibDecoder::new(data.as_slice())
                        .read_to_end(&mut out)
                        .map_err(|_| PdfReadError::CorruptStream(num))?;
                    out
                }
                other => return Err(PdfReadError::UnsupportedFilter(other.to_string())),
            };
        }
        Ok(data)
    }
}

// ── Dictionary values ──────────────────────────────────────────────────────────

/// A dictionary value as far as this reader cares about it.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    /// Indirect reference; only the object number is kept.
    Ref(u32),
    /// Number, name (with its `/`) or keyword.
    Atom(String),
    /// Raw text between the brackets.
    Array(String),
    /// Decoded literal or hex string.
    Text(String),
    /// Nested dictionary; contents are not retained.
    Dict,
}

impl Value {
    fn as_obj_num(&self) -> Option<u32> {
        match self {
            Value::Ref(n) => Some(*n),
            _ => None,
        }
    }
}

// ── Structure parsing ──────────────────────────────────────────────────────────

fn parse_version(data: &[u8]) -> Result<String, PdfReadError> {
    if data.len() < 8 || !data.starts_with(b"%PDF-") {
        return Err(PdfReadError::NotAPdf);
    }
    let rest = &data[5..];
    let end = rest
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(rest.len());
    std::str::from_utf8(&rest[..end])
        .map(str::to_string)
        .map_err(|_| PdfReadError::NotAPdf)
}

/// The `startxref` offset, searched for in the last KiB of the file.
fn find_startxref(data: &[u8]) -> Result<usize, PdfReadError> {
    let tail = &data[data.len().saturating_sub(1024)..];
    let keyword = b"startxref";
    let pos = tail
        .windows(keyword.len())
        .rposition(|w| w == keyword)
        .ok_or(PdfReadError::StartxrefNotFound)?;
    let offset: usize = next_token(&tail[pos + keyword.len()..])
        .and_then(|(tok, _)| tok.parse().ok())
        .ok_or(PdfReadError::StartxrefNotFound)?;
    if offset >= data.len() {
        return Err(PdfReadError::StartxrefNotFound);
    }
    Ok(offset)
}

/// Parse `xref` subsections of fixed 20-byte entries into an
/// object-number → offset map. Free entries are skipped.
fn parse_xref_table(section: &[u8]) -> Result<HashMap<u32, usize>, PdfReadError> {
    let mut map = HashMap::new();
    let mut cursor = skip_whitespace(section)
        .strip_prefix(b"xref")
        .ok_or(PdfReadError::MalformedXref)?;

    loop {
        cursor = skip_whitespace(cursor);
        if cursor.is_empty() || cursor.starts_with(b"trailer") {
            break;
        }
        let (first, after) = next_token(cursor).ok_or(PdfReadError::MalformedXref)?;
        let first: u32 = first.parse().map_err(|_| PdfReadError::MalformedXref)?;
        let (count, after) = next_token(after).ok_or(PdfReadError::MalformedXref)?;
        let count: usize = count.parse().map_err(|_| PdfReadError::MalformedXref)?;

        let entries = skip_line(after);
        let table_len = count
            .checked_mul(20)
            .filter(|&len| len <= entries.len())
            .ok_or(PdfReadError::MalformedXref)?;
        for (i, entry) in entries[..table_len].chunks(20).enumerate() {
            if entry[17] != b'n' {
                continue;
            }
            let offset = std::str::from_utf8(&entry[..10])
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .ok_or(PdfReadError::MalformedXref)?;
            let num = u32::try_from(i)
                .ok()
                .and_then(|i| first.checked_add(i))
                .ok_or(PdfReadError::MalformedXref)?;
            if num > 0 {
                map.insert(num, offset);
            }
        }
        cursor = &entries[table_len..];
    }
    Ok(map)
}

fn parse_trailer(section: &[u8]) -> Result<HashMap<String, Value>, PdfReadError> {
    let pos = find(section, b"trailer").ok_or(PdfReadError::MalformedTrailer)?;
    parse_dict(&section[pos + b"trailer".len()..])
        .map(|(dict, _)| dict)
        .ok_or(PdfReadError::MalformedTrailer)
}

/// Parse a `<< ... >>` dictionary. Returns the entries and the input
/// following the closing `>>`.
fn parse_dict(data: &[u8]) -> Option<(HashMap<String, Value>, &[u8])> {
    let mut cursor = skip_whitespace(data).strip_prefix(b"<<")?;
    let mut map = HashMap::new();

    loop {
        cursor = skip_whitespace(cursor);
        if let Some(rest) = cursor.strip_prefix(b">>") {
            return Some((map, rest));
        }
        let (key, after_key) = next_token(cursor)?;
        cursor = skip_whitespace(after_key);
        let Some(key) = key.strip_prefix('/') else {
            // Not a key; step over it.
            continue;
        };

        let (value, rest) = parse_value(cursor)?;
        map.insert(key.to_string(), value);
        cursor = rest;
    }
}

fn parse_value(data: &[u8]) -> Option<(Value, &[u8])> {
    if data.starts_with(b"<<") {
        let rest = skip_nested_dict(data)?;
        return Some((Value::Dict, rest));
    }
    match data.first()? {
        b'[' => {
            let end = matching_bracket(data)?;
            let inner = String::from_utf8_lossy(&data[1..end]).into_owned();
            Some((Value::Array(inner), &data[end + 1..]))
        }
        b'(' => {
            let (bytes, rest) = read_literal_string(data)?;
            Some((Value::Text(bytes_to_text(bytes)), rest))
        }
        b'<' => {
            let (bytes, rest) = read_hex_string(data)?;
            Some((Value::Text(bytes_to_text(bytes)), rest))
        }
        _ => {
            let (token, rest) = next_token(data)?;
            // `N G R` is an indirect reference.
            if let Ok(num) = token.parse::<u32>() {
                if let Some((gen, after_gen)) = next_token(rest) {
                    if let Some(("R", after_r)) = next_token(after_gen) {
                        if gen.parse::<u16>().is_ok() {
                            return Some((Value::Ref(num), after_r));
                        }
                    }
                }
            }
            Some((Value::Atom(token.to_string()), rest))
        }
    }
}

/// Object numbers of every `N G R` triple in an array's raw text.
fn parse_ref_list(raw: &str) -> Vec<u32> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    tokens
        .windows(3)
        .filter(|w| w[2] == "R")
        .filter_map(|w| w[0].parse().ok())
        .collect()
}

// ── Byte utilities ─────────────────────────────────────────────────────────────

fn skip_nested_dict(data: &[u8]) -> Option<&[u8]> {
    let mut depth = 0usize;
    let mut i = 0;
    while i < data.len() {
        if data[i..].starts_with(b"<<") {
            depth += 1;
            i += 2;
        } else if data[i..].starts_with(b">>") {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return Some(&data[i..]);
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Index of the `]` closing the array that opens at `data[0]`.
fn matching_bracket(data: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in data.iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Skip an `N G obj` header, returning the bytes after `obj`.
fn skip_obj_header(data: &[u8]) -> Option<&[u8]> {
    let (_, rest) = next_token(data)?;
    let (_, rest) = next_token(rest)?;
    match next_token(rest)? {
        ("obj", rest) => Some(rest),
        _ => None,
    }
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let pos = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    &data[pos..]
}

fn skip_line(data: &[u8]) -> &[u8] {
    match data.iter().position(|&b| b == b'\n') {
        Some(pos) => &data[pos + 1..],
        None => &data[data.len()..],
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Next whitespace- or delimiter-separated token. `<<`, `>>` and single
/// delimiters are tokens of their own; names keep their leading `/`.
fn next_token(data: &[u8]) -> Option<(&str, &[u8])> {
    let data = skip_whitespace(data);
    let first = *data.first()?;
    let len = if data.starts_with(b"<<") || data.starts_with(b">>") {
        2
    } else if matches!(first, b'[' | b']' | b'(' | b')' | b'<' | b'>') {
        1
    } else {
        let start = usize::from(first == b'/');
        start
            + data[start..]
                .iter()
                .position(|&b| {
                    b.is_ascii_whitespace()
                        || matches!(b, b'[' | b']' | b'(' | b')' | b'<' | b'>' | b'/')
                })
                .unwrap_or(data.len() - start)
    };
    let token = std::str::from_utf8(&data[..len]).ok()?;
    Some((token, &data[len..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_values_are_classified() {
        let (dict, rest) = parse_dict(
            b"<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612.0 792.0] \
              /Resources << /Font << /F1 3 0 R >> >> /Title (A \\(b\\)) /N 12 >> tail",
        )
        .unwrap();
        assert_eq!(dict["Type"], Value::Atom("/Page".into()));
        assert_eq!(dict["Parent"], Value::Ref(2));
        assert_eq!(dict["MediaBox"], Value::Array("0 0 612.0 792.0".into()));
        assert_eq!(dict["Resources"], Value::Dict);
        assert_eq!(dict["Title"], Value::Text("A (b)".into()));
        assert_eq!(dict["N"], Value::Atom("12".into()));
        assert_eq!(rest, b" tail");
    }

    #[test]
    fn adjacent_names_without_spaces() {
        let (dict, _) = parse_dict(b"<</Filter/FlateDecode/Length 10>>").unwrap();
        assert_eq!(dict["Filter"], Value::Atom("/FlateDecode".into()));
        assert_eq!(dict["Length"], Value::Atom("10".into()));
    }

    #[test]
    fn ref_list_from_kids() {
        assert_eq!(parse_ref_list("6 0 R 8 0 R 10 0 R"), vec![6, 8, 10]);
        assert!(parse_ref_list("").is_empty());
    }

    #[test]
    fn obj_header_is_skipped() {
        assert_eq!(skip_obj_header(b"12 0 obj\n<< >>"), Some(&b"\n<< >>"[..]));
        assert_eq!(skip_obj_header(b"12 0 R"), None);
    }
}
