//! # Lexer - Tokenizing Tagged Markup
//!
//! The first stage of parsing: breaking markup text into tokens with the
//! [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte in the input appears in exactly one token. Nothing is skipped,
//! so concatenating token texts reproduces the input:
//!
//! ```
//! use quire_syntax::lexer::lex;
//!
//! let input = "<p>Hello &amp; welcome</p>\n";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Two Modes
//!
//! Names are context-free: `class` lexes as `NAME` both in `<p class="x">`
//! and in `a class act`, and the parser folds the second one into a
//! `TEXT_RUN`. Quotes are not. Between `<name` and the closing `>` the
//! lexer runs in tag mode, where `"..."` / `'...'` is a `STRING`. Everywhere
//! else a quote is plain `TEXT`, so `it's` in a paragraph never swallows the
//! tags after it. Markup punctuation gets its own kinds in both modes:
//!
//! - `<`, `</` → `LT`, `LT_SLASH`
//! - `>`, `/>` → `GT`, `SLASH_GT`
//! - `=` → `EQ`
//! - `"..."` / `'...'` → `STRING` (tag mode only)
//!
//! Entities such as `&amp;` are left inside `TEXT` tokens; decoding is the
//! consumer's job.
//!
//! ## Public API
//!
//! - [`lex`] - Tokenize input, returning `Vec<Token>`
//! - [`lex_with_spans`] - Tokenize with byte offset spans
//! - [`Token`] - A token with its kind and text slice

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced inside a tag, from `<name` up to `>` or `/>`.
///
/// Kept separate from [`SyntaxKind`] because Logos needs to derive on it.
///
/// [`SyntaxKind`]: crate::syntax_kind::SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[token("</")]
    LtSlash,

    #[token("<")]
    Lt,

    #[token("/>")]
    SlashGt,

    #[token(">")]
    Gt,

    #[token("/")]
    Slash,

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*"|'[^']*'"#)]
    String,

    #[regex(r"[A-Za-z_][A-Za-z0-9_:.\-]*")]
    Name,

    /// Anything not matched by other rules
    #[regex(r#"[^\s<>/="'A-Za-z_]+"#)]
    Text,
}

/// Token kinds produced in character data. Quotes are text here.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[token("</")]
    LtSlash,

    #[token("<")]
    Lt,

    #[token("/>")]
    SlashGt,

    #[token(">")]
    Gt,

    #[token("/")]
    Slash,

    #[token("=")]
    Eq,

    #[regex(r"[A-Za-z_][A-Za-z0-9_:.\-]*")]
    Name,

    #[regex(r"[^\s<>/=A-Za-z_]+")]
    Text,
}

impl TagToken {
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TagToken::Whitespace => SyntaxKind::WHITESPACE,
            TagToken::Newline => SyntaxKind::NEWLINE,
            TagToken::LtSlash => SyntaxKind::LT_SLASH,
            TagToken::Lt => SyntaxKind::LT,
            TagToken::SlashGt => SyntaxKind::SLASH_GT,
            TagToken::Gt => SyntaxKind::GT,
            TagToken::Slash => SyntaxKind::SLASH,
            TagToken::Eq => SyntaxKind::EQ,
            TagToken::String => SyntaxKind::STRING,
            TagToken::Name => SyntaxKind::NAME,
            TagToken::Text => SyntaxKind::TEXT,
        }
    }
}

impl ContentToken {
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            ContentToken::Whitespace => SyntaxKind::WHITESPACE,
            ContentToken::Newline => SyntaxKind::NEWLINE,
            ContentToken::LtSlash => SyntaxKind::LT_SLASH,
            ContentToken::Lt => SyntaxKind::LT,
            ContentToken::SlashGt => SyntaxKind::SLASH_GT,
            ContentToken::Gt => SyntaxKind::GT,
            ContentToken::Slash => SyntaxKind::SLASH,
            ContentToken::Eq => SyntaxKind::EQ,
            ContentToken::Name => SyntaxKind::NAME,
            ContentToken::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

enum Mode<'a> {
    Content(logos::Lexer<'a, ContentToken>),
    Tag(logos::Lexer<'a, TagToken>),
}

/// `<` or `</` opens a tag only when a name follows directly.
fn opens_tag(kind: SyntaxKind, rest: &str) -> bool {
    matches!(kind, SyntaxKind::LT | SyntaxKind::LT_SLASH)
        && rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut mode = Mode::Content(ContentToken::lexer(input));

    loop {
        mode = match mode {
            Mode::Content(mut lexer) => {
                let Some(result) = lexer.next() else { break };
                // Unrecognized input stays as TEXT
                let kind = result.map_or(SyntaxKind::TEXT, ContentToken::to_syntax_kind);
                tokens.push((Token { kind, text: lexer.slice() }, lexer.span()));
                if opens_tag(kind, lexer.remainder()) {
                    Mode::Tag(lexer.morph())
                } else {
                    Mode::Content(lexer)
                }
            }
            Mode::Tag(mut lexer) => {
                let Some(result) = lexer.next() else { break };
                // An unterminated quote is one TEXT token
                let kind = result.map_or(SyntaxKind::TEXT, TagToken::to_syntax_kind);
                tokens.push((Token { kind, text: lexer.slice() }, lexer.span()));
                if matches!(kind, SyntaxKind::GT | SyntaxKind::SLASH_GT) {
                    Mode::Content(lexer.morph())
                } else {
                    Mode::Tag(lexer)
                }
            }
        };
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(kind: SyntaxKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_plain_word_is_a_name() {
        assert_eq!(lex("hello"), vec![token(SyntaxKind::NAME, "hello")]);
    }

    #[test]
    fn lex_newline_crlf() {
        assert_eq!(lex("\r\n"), vec![token(SyntaxKind::NEWLINE, "\r\n")]);
    }

    #[test]
    fn lex_start_tag_with_attribute() {
        let tokens = lex(r#"<block type="collapsible">"#);
        assert_eq!(
            tokens,
            vec![
                token(SyntaxKind::LT, "<"),
                token(SyntaxKind::NAME, "block"),
                token(SyntaxKind::WHITESPACE, " "),
                token(SyntaxKind::NAME, "type"),
                token(SyntaxKind::EQ, "="),
                token(SyntaxKind::STRING, "\"collapsible\""),
                token(SyntaxKind::GT, ">"),
            ]
        );
    }

    #[test]
    fn lex_end_and_self_closing_tags() {
        let tokens = lex("</p><reference/>");
        assert_eq!(
            tokens,
            vec![
                token(SyntaxKind::LT_SLASH, "</"),
                token(SyntaxKind::NAME, "p"),
                token(SyntaxKind::GT, ">"),
                token(SyntaxKind::LT, "<"),
                token(SyntaxKind::NAME, "reference"),
                token(SyntaxKind::SLASH_GT, "/>"),
            ]
        );
    }

    #[test]
    fn lex_character_data_with_entities() {
        let tokens = lex("1 &amp; 2");
        assert_eq!(
            tokens,
            vec![
                token(SyntaxKind::TEXT, "1"),
                token(SyntaxKind::WHITESPACE, " "),
                token(SyntaxKind::TEXT, "&"),
                token(SyntaxKind::NAME, "amp"),
                token(SyntaxKind::TEXT, ";"),
                token(SyntaxKind::WHITESPACE, " "),
                token(SyntaxKind::TEXT, "2"),
            ]
        );
    }

    #[test]
    fn lex_single_quoted_attribute() {
        let tokens = lex("<p a='x y'>");
        assert_eq!(tokens[5], token(SyntaxKind::STRING, "'x y'"));
    }

    #[test]
    fn quotes_in_character_data_are_text() {
        let tokens = lex("<p>it's</p><p>it's</p>");
        assert!(tokens.iter().all(|t| t.kind != SyntaxKind::STRING));
        assert_eq!(tokens[3], token(SyntaxKind::NAME, "it"));
        assert_eq!(tokens[4], token(SyntaxKind::TEXT, "'"));
        assert_eq!(tokens[6], token(SyntaxKind::LT_SLASH, "</"));
    }

    #[test]
    fn a_lone_angle_bracket_does_not_enter_a_tag() {
        let tokens = lex("a < \"b\" > c");
        assert!(tokens.iter().all(|t| t.kind != SyntaxKind::STRING));
    }

    #[test]
    fn lex_preserves_unterminated_quote() {
        let input = "say \"hi";
        let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
        assert_eq!(reconstructed, input);
    }

    #[test]
    fn lex_with_spans_reports_byte_offsets() {
        let spans: Vec<_> = lex_with_spans("<p>é</p>")
            .into_iter()
            .map(|(_, span)| span)
            .collect();
        assert_eq!(spans, vec![0..1, 1..2, 2..3, 3..5, 5..7, 7..8, 8..9]);
    }
}
