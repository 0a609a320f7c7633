/*!
 * # Tagged Markup
 *
 * Documents persist as an HTML-like tag language:
 *
 * ```text
 * <block type="collapsible" collapsed="true">
 *   <h2>Title</h2>
 *   <block><p>Some <strong>bold</strong> text <citation><reference id="k" label="Knuth"/></citation></p></block>
 * </block>
 * ```
 *
 * [`serialize`] writes the canonical form: no whitespace between tags,
 * attributes only when they differ from the defaults, marks nested in
 * canonical order. [`parse`] reads the canonical form plus some sugar:
 *
 * - a bare `<p>` or `<hN>` where a block is expected gets its own block
 * - `<collapsible-block [collapsed|folded]>` with `<summary>` and
 *   `<content>` becomes a collapsible block, collapsed unless told otherwise
 * - `<b>`, `<i>` and `<strike>` stand for `<strong>`, `<em>` and `<s>`
 * - whitespace between block-level tags is ignored
 *
 * Tokenizing and tree building happen in `quire-syntax`; this module maps
 * its elements onto document nodes and checks them against the schema.
 */

mod parse;
mod serialize;

pub use parse::parse;
pub use serialize::serialize;

use crate::model::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown tag <{0}>")]
    UnknownTag(String),

    #[error("unbalanced markup: expected </{expected}>, found {found}")]
    Unbalanced { expected: String, found: String },

    #[error("malformed tag: {0}")]
    Malformed(String),

    #[error("bad value {value:?} for attribute {name}")]
    BadAttribute { name: String, value: String },

    #[error("content not allowed in <{0}>")]
    InvalidContent(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}
