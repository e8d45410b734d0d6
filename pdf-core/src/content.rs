//! Text extraction from decoded page content streams.
//!
//! Only the text-showing operators matter here: strings shown by `Tj`,
//! `TJ`, `'` and `"` are collected, and every line-positioning operator
//! (`Td`, `TD`, `T*`, `'`, `"`) or text object boundary (`BT`/`ET`)
//! starts a new output line. Empty lines are dropped.

/// Operand left on the stack for the next operator.
enum Operand {
    Text(String),
    TextArray(Vec<String>),
    Other,
}

/// Extract shown text from a content stream, one line per text line.
pub fn extract_text(content: &[u8]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut operands: Vec<Operand> = Vec::new();
    let mut rest = content;

    fn break_line(lines: &mut Vec<String>, current: &mut String) {
        if !current.is_empty() {
            lines.push(std::mem::take(current));
        }
    }

    loop {
        rest = skip_whitespace_and_comments(rest);
        let Some(&first) = rest.first() else {
            break;
        };

        match first {
            b'(' => match read_literal_string(rest) {
                Some((bytes, after)) => {
                    operands.push(Operand::Text(bytes_to_text(bytes)));
                    rest = after;
                }
                None => break,
            },
            b'<' if rest.starts_with(b"<<") => {
                // Inline dictionary operand (e.g. for BDC); contents unused.
                match rest.windows(2).position(|w| w == b">>") {
                    Some(end) => rest = &rest[end + 2..],
                    None => break,
                }
                operands.push(Operand::Other);
            }
            b'<' => match read_hex_string(rest) {
                Some((bytes, after)) => {
                    operands.push(Operand::Text(bytes_to_text(bytes)));
                    rest = after;
                }
                None => break,
            },
            b'[' => {
                let (items, after) = read_text_array(&rest[1..]);
                operands.push(Operand::TextArray(items));
                rest = after;
            }
            _ => {
                let (token, after) = read_regular_token(rest);
                rest = after;
                if token.is_empty() {
                    // Stray delimiter such as `]` or `)`.
                    rest = &rest[1..];
                    continue;
                }
                if is_operand_token(token) {
                    operands.push(Operand::Other);
                    continue;
                }

                match token {
                    b"BT" | b"ET" | b"Td" | b"TD" | b"T*" => {
                        break_line(&mut lines, &mut current)
                    }
                    b"Tj" => {
                        if let Some(Operand::Text(s)) = operands.last() {
                            current.push_str(s);
                        }
                    }
                    b"TJ" => {
                        if let Some(Operand::TextArray(items)) = operands.last() {
                            for item in items {
                                current.push_str(item);
                            }
                        }
                    }
                    b"'" | b"\"" => {
                        break_line(&mut lines, &mut current);
                        if let Some(Operand::Text(s)) = operands.last() {
                            current.push_str(s);
                        }
                    }
                    _ => {}
                }
                operands.clear();
            }
        }
    }
    break_line(&mut lines, &mut current);

    lines.join("\n")
}

/// Decode a `( ... )` literal string starting at `data[0]`. Returns the
/// raw bytes and the input following the closing paren.
pub(crate) fn read_literal_string(data: &[u8]) -> Option<(Vec<u8>, &[u8])> {
    debug_assert_eq!(data.first(), Some(&b'('));
    let mut out = Vec::new();
    let mut depth = 1usize;
    let mut i = 1;

    while i < data.len() {
        let b = data[i];
        match b {
            b'\\' => {
                let esc = *data.get(i + 1)?;
                i += 2;
                match esc {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    b'0'..=b'7' => {
                        let mut value = u32::from(esc - b'0');
                        let mut digits = 1;
                        while digits < 3 {
                            match data.get(i) {
                                Some(&d @ b'0'..=b'7') => {
                                    value = value * 8 + u32::from(d - b'0');
                                    i += 1;
                                    digits += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push(value as u8);
                    }
                    // Backslash-newline is a line continuation.
                    b'\r' => {
                        if data.get(i) == Some(&b'\n') {
                            i += 1;
                        }
                    }
                    b'\n' => {}
                    other => out.push(other),
                }
            }
            b'(' => {
                depth += 1;
                out.push(b);
                i += 1;
            }
            b')' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some((out, &data[i..]));
                }
                out.push(b);
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }
    None
}

/// Decode a `< ... >` hex string starting at `data[0]`.
pub(crate) fn read_hex_string(data: &[u8]) -> Option<(Vec<u8>, &[u8])> {
    debug_assert_eq!(data.first(), Some(&b'<'));
    let end = data.iter().position(|&b| b == b'>')?;
    let mut digits: Vec<u8> = data[1..end]
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|&b| hex_value(b))
        .collect::<Option<_>>()?;
    // An odd final digit is padded with 0.
    if digits.len() % 2 == 1 {
        digits.push(0);
    }
    let bytes = digits.chunks(2).map(|pair| pair[0] << 4 | pair[1]).collect();
    Some((bytes, &data[end + 1..]))
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Collect the strings of a `TJ` array; kerning numbers are skipped.
/// `data` starts just after the opening bracket.
fn read_text_array(mut data: &[u8]) -> (Vec<String>, &[u8]) {
    let mut items = Vec::new();
    loop {
        data = skip_whitespace_and_comments(data);
        match data.first() {
            None => return (items, data),
            Some(b']') => return (items, &data[1..]),
            Some(b'(') => match read_literal_string(data) {
                Some((bytes, after)) => {
                    items.push(bytes_to_text(bytes));
                    data = after;
                }
                None => return (items, &[]),
            },
            Some(b'<') => match read_hex_string(data) {
                Some((bytes, after)) => {
                    items.push(bytes_to_text(bytes));
                    data = after;
                }
                None => return (items, &[]),
            },
            Some(_) => {
                let (token, after) = read_regular_token(data);
                data = if token.is_empty() { &after[1..] } else { after };
            }
        }
    }
}

/// Interpret string bytes as UTF-8, falling back to Latin-1.
pub(crate) fn bytes_to_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| e.into_bytes().iter().map(|&b| char::from(b)).collect())
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

/// Split off a run of regular characters. A leading `/` is kept so names
/// come back whole.
fn read_regular_token(data: &[u8]) -> (&[u8], &[u8]) {
    let start = usize::from(data.first() == Some(&b'/'));
    let len = data[start..]
        .iter()
        .position(|&b| b.is_ascii_whitespace() || is_delimiter(b))
        .unwrap_or(data.len() - start);
    data.split_at(start + len)
}

fn is_operand_token(token: &[u8]) -> bool {
    matches!(token[0], b'/' | b'0'..=b'9' | b'-' | b'+' | b'.')
        || token == b"true"
        || token == b"false"
        || token == b"null"
}

fn skip_whitespace_and_comments(mut data: &[u8]) -> &[u8] {
    loop {
        let start = data
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(data.len());
        data = &data[start..];
        if data.first() != Some(&b'%') {
            return data;
        }
        let eol = data
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .unwrap_or(data.len());
        data = &data[eol..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_based_lines() {
        let ops = b"BT\n/F1 12 Tf\n14 TL\n100 750 Td\n(Invoice: INV-001) Tj\nT*\n\
                    (Customer: John Mensah) Tj\nT*\n(Amount: 500.00) Tj\nET\n";
        assert_eq!(
            extract_text(ops),
            "Invoice: INV-001\nCustomer: John Mensah\nAmount: 500.00"
        );
    }

    #[test]
    fn separate_text_objects_become_lines() {
        let ops = b"BT /F1 12 Tf 72 720 Td (Hello) Tj ET BT 72 700 Td (World) Tj ET";
        assert_eq!(extract_text(ops), "Hello\nWorld");
    }

    #[test]
    fn tj_arrays_and_hex_strings() {
        let ops = b"BT [(Amo) -20 (unt)] TJ T* <3530302E3030> Tj ET";
        assert_eq!(extract_text(ops), "Amount\n500.00");
    }

    #[test]
    fn quote_operator_moves_to_next_line() {
        let ops = b"BT 14 TL (one) Tj (two) ' 1 2 (three) \" ET";
        assert_eq!(extract_text(ops), "one\ntwo\nthree");
    }

    #[test]
    fn literal_escapes() {
        let (bytes, rest) = read_literal_string(b"(a\\(b\\) \\101\\\\ (n)) Tj").unwrap();
        assert_eq!(bytes, b"a(b) A\\ (n)");
        assert_eq!(rest, b" Tj");
    }

    #[test]
    fn graphics_only_stream_has_no_text() {
        let ops = b"q 0 0 1 rg 10 10 100 50 re f Q % trailing comment";
        assert_eq!(extract_text(ops), "");
    }
}
