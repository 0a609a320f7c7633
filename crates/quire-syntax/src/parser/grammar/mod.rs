//! # Grammar Rules
//!
//! Each function takes a `&mut Parser`, inspects tokens (`p.at()`,
//! `p.nth()`), consumes them (`p.bump()`, `p.eat()`), and builds structure
//! with markers.
//!
//! ```text
//! root      := content*
//! content   := element | text_run | stray_end_tag
//! element   := start_tag (content* end_tag)?
//! start_tag := '<' NAME attribute* ('>' | '/>')
//! attribute := NAME ('=' (STRING | NAME | TEXT))?
//! end_tag   := '</' NAME? '>'
//! ```
//!
//! Rules are lenient: an unexpected token inside a tag becomes an `ERROR`
//! node, a stray end tag is wrapped in `ERROR`, and an element left open at
//! end of input simply has no `END_TAG` child.

mod element;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse the root node.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    while !p.at_end() {
        element::content(p);
    }

    m.complete(p, SyntaxKind::ROOT);
}
