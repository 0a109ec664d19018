/// A position in source text, tracking line and column for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// One entry of a `[...]` attribute list, still in raw (unescaped) form.
///
/// `value` is `None` for a valueless flag attribute such as `[disabled]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub name: String,
    pub value: Option<String>,
}

/// Token classification for shorthand source.
///
/// Data-carrying variants hold their payload in raw form: backslash escapes and
/// `$` placeholders are left in place for the parser to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Atoms
    Name(String),
    Id(String),
    Class(String),
    Attributes(Vec<RawAttribute>),
    Text(String),
    Multiplier(usize),

    // Operators
    Child,   // >
    Sibling, // +
    ClimbUp, // ^
    GroupOpen,
    GroupClose,

    // Anything the grammar has no use for; the parser skips it
    Unknown(char),

    // End of input
    Eof,
}

/// A token produced by the shorthand scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// True when this token can begin an element atom.
    pub fn starts_atom(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Name(_)
                | TokenKind::Id(_)
                | TokenKind::Class(_)
                | TokenKind::Attributes(_)
                | TokenKind::Text(_)
        )
    }
}

/// HTML void elements (never have a closing tag or children).
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Check if a tag name is a void element. The comparison ignores ASCII case.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Characters allowed in a tag name.
pub fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')
}
