//! SyntaxKind enum for all tokens and nodes in the markup CST.
//!
//! Tokens and nodes share a single enum so rowan can store either in the
//! same green tree. Every byte of the source appears as a token.

/// All syntax kinds for the markup CST.
///
/// The `repr(u16)` keeps rowan's green tree compact. SCREAMING_CASE follows
/// the usual rowan convention.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens (lexer output) ===
    /// Horizontal whitespace (spaces, tabs)
    WHITESPACE,
    /// Line ending
    NEWLINE,
    /// Character data that is neither a name nor markup punctuation
    TEXT,
    /// `<` opening a start tag
    LT,
    /// `</` opening an end tag
    LT_SLASH,
    /// `>` closing a tag
    GT,
    /// `/>` closing a self-closing tag
    SLASH_GT,
    /// A lone `/`
    SLASH,
    /// `=` between attribute name and value
    EQ,
    /// Quoted attribute value, quotes included
    STRING,
    /// Tag or attribute name; also plain words in character data
    NAME,
    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root node
    ROOT,
    /// An element: start tag, children, end tag
    ELEMENT,
    /// `<name attr="v">` or `<name/>`
    START_TAG,
    /// `</name>`
    END_TAG,
    /// `name="value"` inside a start tag
    ATTRIBUTE,
    /// Character data between tags
    TEXT_RUN,

    /// Error recovery node
    ERROR,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia (whitespace/newlines).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkupLang {}

impl rowan::Language for MarkupLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::ERROR as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<MarkupLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<MarkupLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<MarkupLang>;
