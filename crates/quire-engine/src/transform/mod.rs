/*!
 * # Transforms
 *
 * Edits are expressed as [`Step`]s. Every step can be applied to a
 * document, inverted against the document it was applied to, and reports a
 * [`StepMap`] describing how positions move. A [`Transaction`] accumulates
 * steps, the intermediate documents, the composed [`Mapping`] and the
 * selection that should hold once it is dispatched.
 *
 * Steps of one transaction always apply to the document produced by the
 * previous step, never to the transaction's starting document.
 */

mod map;
mod step;
mod structure;
mod transaction;

pub use map::{Assoc, MapResult, Mapping, StepMap};
pub use step::Step;
pub use transaction::{Intent, Transaction};

use crate::model::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("gap is not a flat range")]
    GapNotFlat,

    #[error("gap content does not fit the wrapping slice")]
    GapContent,

    #[error("structure replace would overwrite content")]
    StructureReplace,

    #[error("no node at position {pos}")]
    NoNode { pos: usize },
}
