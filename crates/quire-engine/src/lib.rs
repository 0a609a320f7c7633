//! # quire-engine
//!
//! Editing core for block-structured rich text: a positional document
//! model, invertible steps grouped into transactions, block and text
//! commands, block-browse selection, citations, sentence completion and the
//! decorations a view draws on top of the document.
//!
//! ```
//! use quire_config::EditorConfig;
//! use quire_engine::{Cmd, Editor, Selection};
//!
//! let mut editor = Editor::from_html("<p>One</p><p>Two</p>", EditorConfig::default()).unwrap();
//! editor.apply(Cmd::SetSelection { selection: Selection::cursor(9) }).unwrap();
//! editor.apply(Cmd::Indent).unwrap();
//! assert_eq!(editor.to_html(), "<block><p>One</p><block><p>Two</p></block></block>");
//! ```

pub mod citation;
pub mod decorations;
pub mod editing;
pub mod html;
pub mod io;
pub mod model;
pub mod suggestion;
pub mod transform;

pub use citation::{Reference, ReferenceLookup, StaticReferences};
pub use decorations::DecorationSet;
pub use editing::commands::{self, Command};
pub use editing::{
    BlockSelection, Cmd, EditError, Editor, EditorState, Key, KeyCode, Modifiers, Patch, Selection,
};
pub use html::ParseError;
pub use model::{BlockKind, Mark, ModelError, Node, NodeKind};
pub use suggestion::{SuggestionError, SuggestionService, SuggestionState};
pub use transform::{StepError, Transaction};
