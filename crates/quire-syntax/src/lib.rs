//! # quire-syntax
//!
//! A lossless syntax tree for quire's tagged document markup, built with
//! [Rowan] + [Logos].
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//!
//! The markup is an HTML-like tag language (`<block>`, `<p>`, `<citation>`,
//! `<strong>` ...). This crate only knows about tags, attributes and
//! character data; mapping element names onto document nodes happens in
//! `quire-engine`.
//!
//! ## Pipeline
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! The concrete tree keeps every byte of the input, including whitespace
//! between tags and malformed fragments (wrapped in `ERROR` nodes), so a
//! consumer can report exactly where a file went wrong.
//!
//! ## Module Structure
//!
//! ```text
//! quire-syntax/
//! ├── lib.rs           # Public API and tree tests
//! ├── syntax_kind.rs   # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs         # Logos-based tokenizer
//! ├── ast.rs           # Typed views (Element, Attribute, TextRun)
//! └── parser/
//!     ├── mod.rs       # Parser struct, Marker system, public parse() function
//!     ├── event.rs     # Event enum (Open, Token, Close, Tombstone)
//!     ├── sink.rs      # Converts events to Rowan GreenNode
//!     └── grammar/     # root, element, tags, attributes, text runs
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use quire_syntax::{parse, SyntaxKind};
//! use quire_syntax::ast::{root_content, Content};
//!
//! let tree = parse(r#"<block type="bulletList"><p>Hello</p></block>"#);
//! assert_eq!(tree.text().to_string(), r#"<block type="bulletList"><p>Hello</p></block>"#);
//!
//! let Some(Content::Element(block)) = root_content(&tree).next() else { panic!() };
//! assert_eq!(block.name().as_deref(), Some("block"));
//! assert_eq!(block.syntax().kind(), SyntaxKind::ELEMENT);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use parser::parse;
pub use syntax_kind::{MarkupLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use rstest::rstest;

    /// Helper to format a syntax tree for snapshot testing.
    fn format_tree(node: &SyntaxNode, indent: usize) -> String {
        let mut result = String::new();
        let prefix = "  ".repeat(indent);

        result.push_str(&format!(
            "{}{:?}@{:?}\n",
            prefix,
            node.kind(),
            node.text_range()
        ));

        for child in node.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Node(n) => {
                    result.push_str(&format_tree(&n, indent + 1));
                }
                rowan::NodeOrToken::Token(t) => {
                    let text = t.text().replace('\n', "\\n");
                    result.push_str(&format!(
                        "{}  {:?}@{:?} {:?}\n",
                        prefix,
                        t.kind(),
                        t.text_range(),
                        text
                    ));
                }
            }
        }

        result
    }

    #[test]
    fn snapshot_simple_element() {
        let tree = parse("<p>Hi</p>");
        assert_snapshot!(format_tree(&tree, 0), @r#"
        ROOT@0..9
          ELEMENT@0..9
            START_TAG@0..3
              LT@0..1 "<"
              NAME@1..2 "p"
              GT@2..3 ">"
            TEXT_RUN@3..5
              NAME@3..5 "Hi"
            END_TAG@5..9
              LT_SLASH@5..7 "</"
              NAME@7..8 "p"
              GT@8..9 ">"
        "#);
    }

    #[test]
    fn snapshot_stray_end_tag() {
        let tree = parse("</b>x");
        assert_snapshot!(format_tree(&tree, 0), @r#"
        ROOT@0..5
          ERROR@0..4
            END_TAG@0..4
              LT_SLASH@0..2 "</"
              NAME@2..3 "b"
              GT@3..4 ">"
          TEXT_RUN@4..5
            NAME@4..5 "x"
        "#);
    }

    #[test]
    fn unclosed_element_has_no_end_tag() {
        let tree = parse("<block><p>draft");
        let block = tree.children().next().unwrap();
        assert_eq!(block.kind(), SyntaxKind::ELEMENT);
        assert!(block.children().all(|n| n.kind() != SyntaxKind::END_TAG));
    }

    #[test]
    fn garbage_inside_tag_is_recovered() {
        let tree = parse(r#"<p "oops" = >text</p>"#);
        let start = tree.children().next().unwrap().children().next().unwrap();
        assert_eq!(start.kind(), SyntaxKind::START_TAG);
        assert!(start.children().any(|n| n.kind() == SyntaxKind::ERROR));
    }

    #[test]
    fn apostrophes_do_not_swallow_tags() {
        let tree = parse("<p>it's</p><p>it's</p>");
        let elements: Vec<_> = tree.children().collect();
        assert_eq!(elements.len(), 2);
        assert!(elements.iter().all(|el| el.kind() == SyntaxKind::ELEMENT
            && el.children().any(|n| n.kind() == SyntaxKind::END_TAG)));
    }

    #[rstest]
    #[case("")]
    #[case("plain words")]
    #[case("<p>Hello</p>\n")]
    #[case(r#"<block collapsed="true"><p>a</p><block><p>b</p></block></block>"#)]
    #[case("<p>1 &lt; 2 &amp;&amp; 3 &gt; 2</p>")]
    #[case("<p>unterminated \"quote</p>")]
    #[case(r#"<p>say "hi", it's</p>"#)]
    #[case("<<>>/></ >")]
    #[case("<collapsible-block folded><summary>H</summary></collapsible-block>")]
    fn roundtrip_preserves_text(#[case] input: &str) {
        let tree = parse(input);
        assert_eq!(tree.text().to_string(), input, "Roundtrip failed for: {input:?}");
    }
}
