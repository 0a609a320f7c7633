/*!
 * # Editing Core
 *
 * Everything that turns user intent into transactions over the document
 * model.
 *
 * ## Flow
 *
 * ```text
 * key / button ──▶ keymap (per selection mode) ──▶ command
 *                                                    │
 *                      Transaction (steps + selection) ◀┘
 *                                                    │
 * Editor::dispatch ──▶ new EditorState ──▶ reducers ──▶ Patch
 * ```
 *
 * Commands have the shape `fn(&mut Transaction) -> Result<bool, EditError>`.
 * `Ok(false)` means the command does not apply here and the transaction is
 * untouched; `Ok(true)` means steps and a selection were added; an error
 * means a step was refused, and the editor throws the transaction away.
 *
 * ## Module Structure
 *
 * - **`selection`**: text, node and block selections
 * - **`block_selection`**: whole-block selections used by browse mode
 * - **`navigation`**: parent, sibling and covering-block lookups
 * - **`commands`**: block, collapsible, list, text and browse commands
 * - **`keymap`**: per-mode key handler tables
 * - **`editor`**: the `Editor` facade owning state, config and plugins
 * - **`patch`**: what changed after a command, for a view
 */

pub mod block_selection;
pub mod commands;
pub mod editor;
pub mod keymap;
pub mod navigation;
pub mod patch;
pub mod selection;

pub use block_selection::BlockSelection;
pub use editor::{Cmd, Editor, EditorState};
pub use keymap::{Key, KeyCode, Modifiers};
pub use navigation::BlockRef;
pub use patch::Patch;
pub use selection::{NodeSelection, Selection, SelectionError, TextSelection};

use crate::model::ModelError;
use crate::transform::StepError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}
