/*!
 * # Document Model
 *
 * An immutable, persistent tree of typed nodes addressed by integer
 * positions.
 *
 * ## Positions
 *
 * Positions count tokens of the flattened tree: entering or leaving a
 * non-leaf node is one token, a leaf is one token, and each character of
 * text is one token. Position 0 is the start of the root's content.
 *
 * ```text
 * <block><p>One</p></block>
 * 0     1  2   5   6       7
 * ```
 *
 * ## Module Structure
 *
 * - **`schema`**: node kinds, content expressions, attributes and marks
 * - **`node`**: the `Node` value type
 * - **`fragment`**: ordered child sequences
 * - **`slice`**: fragments cut out of a tree with open edges
 * - **`resolved`**: positions resolved against a tree
 * - **`replace`**: the structure-preserving replace algorithm
 * - **`json`**: the validated serde shape of a node tree
 */

mod fragment;
mod json;
mod node;
pub(crate) mod replace;
mod resolved;
mod schema;
mod slice;

pub use fragment::Fragment;
pub use json::NodeRepr;
pub use node::Node;
pub use resolved::{NodeRange, ResolvedPos};
pub use schema::{AttrValue, Attrs, BlockKind, ContentTerm, Mark, NodeKind, normalize_marks};
pub use slice::Slice;

pub(crate) use node::char_slice;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("position {pos} outside of document (size {size})")]
    OutOfRange { pos: usize, size: usize },

    #[error("invalid content for node {kind}")]
    InvalidContent { kind: NodeKind },

    #[error("invalid attributes for node {kind}")]
    InvalidAttrs { kind: NodeKind },

    #[error("replace failed: {0}")]
    Replace(String),

    #[error("index {index} out of bounds ({count} children)")]
    IndexOutOfBounds { index: usize, count: usize },

    #[error("removing non-flat range")]
    NonFlatRange,
}
