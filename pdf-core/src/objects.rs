/// Indirect object identifier: (object number, generation).
/// Freshly written documents always use generation 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(pub u32, pub u16);

impl ObjId {
    pub fn new(num: u32) -> Self {
        ObjId(num, 0)
    }
}

/// The subset of PDF object types (PDF 32000-1:2008 Section 7.3)
/// this crate emits.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Integer(i64),
    Real(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal string, stored unescaped and without parens.
    LiteralString(String),
    Array(Vec<PdfObject>),
    /// Entries keep insertion order so output is deterministic.
    Dictionary(Vec<(String, PdfObject)>),
    /// `/Length` is derived from `data` at write time and must not
    /// appear in `dict`.
    Stream {
        dict: Vec<(String, PdfObject)>,
        data: Vec<u8>,
    },
    Reference(ObjId),
}

impl PdfObject {
    pub fn name(s: &str) -> Self {
        PdfObject::Name(s.to_string())
    }

    pub fn literal_string(s: &str) -> Self {
        PdfObject::LiteralString(s.to_string())
    }

    pub fn dict(entries: Vec<(&str, PdfObject)>) -> Self {
        PdfObject::Dictionary(owned_entries(entries))
    }

    pub fn stream(entries: Vec<(&str, PdfObject)>, data: Vec<u8>) -> Self {
        PdfObject::Stream {
            dict: owned_entries(entries),
            data,
        }
    }

    /// `[x0 y0 x1 y1]` rectangle, as used by `/MediaBox`.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        PdfObject::Array(vec![
            PdfObject::Real(x0),
            PdfObject::Real(y0),
            PdfObject::Real(x1),
            PdfObject::Real(y1),
        ])
    }

    /// Look up a key in a dictionary or stream dictionary.
    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        let entries = match self {
            PdfObject::Dictionary(entries) => entries,
            PdfObject::Stream { dict, .. } => dict,
            _ => return None,
        };
        entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl From<ObjId> for PdfObject {
    fn from(id: ObjId) -> Self {
        PdfObject::Reference(id)
    }
}

fn owned_entries(entries: Vec<(&str, PdfObject)>) -> Vec<(String, PdfObject)> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obj_id_defaults_to_generation_zero() {
        assert_eq!(ObjId::new(7), ObjId(7, 0));
        assert!(ObjId::new(2) < ObjId::new(10));
    }

    #[test]
    fn dict_preserves_entry_order() {
        let obj = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", ObjId::new(2).into()),
        ]);
        match obj {
            PdfObject::Dictionary(entries) => {
                let keys: Vec<&str> =
                    entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["Type", "Pages"]);
            }
            _ => panic!("expected Dictionary"),
        }
    }

    #[test]
    fn get_reads_dict_and_stream_entries() {
        let page = PdfObject::dict(vec![("Type", PdfObject::name("Page"))]);
        assert_eq!(page.get("Type"), Some(&PdfObject::name("Page")));
        assert_eq!(page.get("Parent"), None);

        let stream = PdfObject::stream(
            vec![("Filter", PdfObject::name("FlateDecode"))],
            b"x".to_vec(),
        );
        assert_eq!(
            stream.get("Filter"),
            Some(&PdfObject::name("FlateDecode"))
        );
        assert_eq!(PdfObject::Integer(1).get("Type"), None);
    }

    #[test]
    fn rect_is_four_reals() {
        match PdfObject::rect(0.0, 0.0, 612.0, 792.0) {
            PdfObject::Array(items) => {
                assert_eq!(items.len(), 4);
                assert_eq!(items[2], PdfObject::Real(612.0));
            }
            _ => panic!("expected Array"),
        }
    }
}
