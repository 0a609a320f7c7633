//! Flat parse events, replayed by the [`Sink`](super::sink::Sink).
//!
//! `<p>Hi</p>` comes out of the grammar as
//!
//! ```text
//! Open(ELEMENT) Open(START_TAG) LT NAME GT Close Open(TEXT_RUN) NAME Close
//! Open(END_TAG) LT_SLASH NAME GT Close Close
//! ```

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Opens a node. `wrapper` is the index of a later `Open` that must
    /// enclose this one.
    Open {
        kind: SyntaxKind,
        wrapper: Option<usize>,
    },
    /// One lexer token, copied into the current node.
    Token(SyntaxKind),
    Close,
    /// A slot reserved by `Parser::start`, skipped when never filled.
    Tombstone,
}

impl Event {
    pub fn open(kind: SyntaxKind) -> Self {
        Event::Open { kind, wrapper: None }
    }
}
