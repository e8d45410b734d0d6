/// Standard Type1 fonts every document carries as shared resources.
/// Viewers supply these without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    /// Every builtin font, in resource-name order.
    pub const ALL: [BuiltinFont; 2] = [BuiltinFont::Helvetica, BuiltinFont::HelveticaBold];

    /// Resource name used in content streams (`/F1 12 Tf`).
    pub fn pdf_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "F1",
            BuiltinFont::HelveticaBold => "F2",
        }
    }

    /// Value of the font dictionary's `/BaseFont`.
    pub fn pdf_base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn from_name(name: &str) -> Option<BuiltinFont> {
        BuiltinFont::ALL
            .into_iter()
            .find(|f| f.pdf_base_name() == name)
    }
}
