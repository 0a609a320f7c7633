use quire_config::EditorConfig;

use crate::citation::{self, Reference, ReferenceLookup, StaticReferences};
use crate::decorations::{self, DecorationSet};
use crate::html::{self, ParseError};
use crate::model::{BlockKind, Mark, Node};
use crate::suggestion::{SuggestionIntent, SuggestionRequest, SuggestionService, SuggestionState};
use crate::transform::{Intent, Transaction};

use super::commands::{self, text as input_rules};
use super::keymap::{self, Action, Key, KeyCode, KeyMap};
use super::{EditError, Patch, Selection};

/// The document and the selection in it.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub doc: Node,
    pub selection: Selection,
}

/// Every edit the editor can perform.
///
/// The argument-free variants map one to one onto the functions in
/// [`commands`]; the others carry what the command needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    Indent,
    Unindent,
    SplitBlock,
    JoinBackward,
    JoinForward,
    DeleteSelection,
    Backspace,
    DeleteForward,
    Enter,
    ToggleFold { pos: usize },
    SetBlockKind { kind: BlockKind },
    ToggleBulletList,
    ToggleOrderedList,
    WrapInCollapsible,
    UnwrapCollapsible,
    ToggleCollapsible,
    SplitCollapsibleBlock,
    UnsetPartiallySelectedCollapsibleBlocks,
    FillEmptyCollapsible { pos: usize },
    ToggleMark { mark: Mark },
    InsertText { text: String },
    SetSelection { selection: Selection },
    InsertReference { reference: Reference },
    EnterBlockBrowse,
    ExitBlockBrowse,
    BrowseUp,
    BrowseDown,
    BrowseExpandUp,
    BrowseExpandDown,
    BrowseLeft,
    BrowseRight,
    MoveBlocksUp,
    MoveBlocksDown,
    BrowseIndent,
    BrowseUnindent,
    BrowseDelete,
    SelectAllBlocks,
    /// Brings the drag handles back after typing hid them.
    ShowDragHandles,
}

impl Cmd {
    /// The plain command behind an argument-free variant.
    fn command(&self) -> Option<commands::Command> {
        let command: commands::Command = match self {
            Cmd::Indent => commands::indent,
            Cmd::Unindent => commands::unindent,
            Cmd::SplitBlock => commands::split_block,
            Cmd::JoinBackward => commands::join_backward,
            Cmd::JoinForward => commands::join_forward,
            Cmd::DeleteSelection => commands::delete_selection,
            Cmd::Backspace => commands::backspace,
            Cmd::DeleteForward => commands::delete_forward,
            Cmd::Enter => commands::enter,
            Cmd::ToggleBulletList => commands::toggle_bullet_list,
            Cmd::ToggleOrderedList => commands::toggle_ordered_list,
            Cmd::WrapInCollapsible => commands::wrap_in_collapsible,
            Cmd::UnwrapCollapsible => commands::unwrap_collapsible,
            Cmd::ToggleCollapsible => commands::toggle_collapsible,
            Cmd::SplitCollapsibleBlock => commands::split_collapsible_block,
            Cmd::UnsetPartiallySelectedCollapsibleBlocks => {
                commands::unset_partially_selected_collapsible_blocks
            }
            Cmd::EnterBlockBrowse => commands::enter_block_browse,
            Cmd::ExitBlockBrowse => commands::exit_block_browse,
            Cmd::BrowseUp => commands::browse_up,
            Cmd::BrowseDown => commands::browse_down,
            Cmd::BrowseExpandUp => commands::browse_expand_up,
            Cmd::BrowseExpandDown => commands::browse_expand_down,
            Cmd::BrowseLeft => commands::browse_left,
            Cmd::BrowseRight => commands::browse_right,
            Cmd::MoveBlocksUp => commands::move_blocks_up,
            Cmd::MoveBlocksDown => commands::move_blocks_down,
            Cmd::BrowseIndent => commands::browse_indent,
            Cmd::BrowseUnindent => commands::browse_unindent,
            Cmd::BrowseDelete => commands::browse_delete,
            Cmd::SelectAllBlocks => commands::select_all_blocks,
            _ => return None,
        };
        Some(command)
    }
}

/// Owns the editor state and everything derived from it.
///
/// Every change goes through [`Editor::dispatch`], which swaps in the new
/// state, runs the suggestion and drag-handle reducers, refreshes the
/// decoration cache when the document changed and bumps `version`.
pub struct Editor {
    state: EditorState,
    config: EditorConfig,
    references: Box<dyn ReferenceLookup>,
    suggestion: SuggestionState,
    hide_handles: bool,
    doc_decorations: DecorationSet,
    text_keys: KeyMap,
    browse_keys: KeyMap,
    version: u64,
    next_request: u64,
}

impl Editor {
    pub fn new(doc: Node, config: EditorConfig) -> Self {
        let selection = Selection::at_start(&doc);
        let doc_decorations = decorations::doc_decorations(&doc, false, &config);
        Self {
            state: EditorState { doc, selection },
            config,
            references: Box::new(StaticReferences::default()),
            suggestion: SuggestionState::Closed,
            hide_handles: false,
            doc_decorations,
            text_keys: keymap::text_handlers(),
            browse_keys: keymap::browse_handlers(),
            version: 0,
            next_request: 1,
        }
    }

    pub fn from_html(markup: &str, config: EditorConfig) -> Result<Self, ParseError> {
        Ok(Self::new(html::parse(markup)?, config))
    }

    pub fn with_references(mut self, references: impl ReferenceLookup + 'static) -> Self {
        self.references = Box::new(references);
        self
    }

    pub fn to_html(&self) -> String {
        html::serialize(&self.state.doc)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Node {
        &self.state.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn suggestion(&self) -> &SuggestionState {
        &self.suggestion
    }

    pub fn handles_hidden(&self) -> bool {
        self.hide_handles
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the selection is a block selection.
    pub fn is_browsing(&self) -> bool {
        self.state.selection.as_block().is_some()
    }

    /// A transaction starting from the current state.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.state.doc.clone(), self.state.selection.clone())
    }

    /// Applies `tr` and returns what changed.
    pub fn dispatch(&mut self, tr: Transaction) -> Patch {
        self.suggestion = self.suggestion.apply(&tr, &self.config.suggestion);
        let hide_handles = decorations::hide_handles(self.hide_handles, &tr);
        let refresh = tr.doc_changed() || hide_handles != self.hide_handles;
        self.hide_handles = hide_handles;

        self.version += 1;
        let patch = Patch::from_transaction(&tr, self.version);
        self.state = EditorState {
            doc: tr.doc().clone(),
            selection: tr.selection(),
        };
        if refresh {
            self.doc_decorations = decorations::doc_decorations(&self.state.doc, self.hide_handles, &self.config);
        }
        log::debug!(
            "dispatched {} step(s), version {}, changed {:?}",
            tr.steps().len(),
            self.version,
            patch.changed
        );
        patch
    }

    /// A patch describing "nothing happened".
    fn unchanged(&self) -> Patch {
        Patch {
            changed: Vec::new(),
            selection: self.state.selection.clone(),
            version: self.version,
        }
    }

    /// Runs `cmd`. When the command does not apply the state is kept and
    /// the patch carries the current version.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditError> {
        let mut tr = self.transaction();
        let applied = match &cmd {
            Cmd::InsertText { text } => return self.insert_text(text),
            Cmd::SetSelection { selection } => {
                tr.set_selection(selection.clone());
                Ok(true)
            }
            Cmd::ToggleFold { pos } => commands::toggle_fold(&mut tr, *pos),
            Cmd::SetBlockKind { kind } => commands::set_block_kind(&mut tr, *kind),
            Cmd::FillEmptyCollapsible { pos } => commands::fill_empty_collapsible(&mut tr, *pos),
            Cmd::ToggleMark { mark } => commands::toggle_mark(&mut tr, *mark),
            Cmd::InsertReference { reference } => citation::insert_reference(
                &mut tr,
                reference,
                &self.config.citation.reference_trigger,
                &self.config.citation.separator,
            ),
            Cmd::ShowDragHandles => {
                tr.set_intent(Intent::DragHandles { hidden: false });
                Ok(true)
            }
            other => match other.command() {
                Some(command) => command(&mut tr),
                None => Ok(false),
            },
        }
        .inspect_err(|err| log::debug!("{cmd:?} failed: {err}"))?;

        if !applied {
            return Ok(self.unchanged());
        }
        Ok(self.dispatch(tr))
    }

    /// Types `text` at the selection, running the input rules first.
    pub fn insert_text(&mut self, text: &str) -> Result<Patch, EditError> {
        if self.is_browsing() || text.is_empty() {
            return Ok(self.unchanged());
        }
        let mut tr = self.transaction();
        if !tr.selection().empty() {
            commands::unset_partially_selected_collapsible_blocks(&mut tr)?;
            commands::delete_selection(&mut tr)?;
        }

        let citation = &self.config.citation;
        let ruled = citation::type_after_reference(&mut tr, text, &citation.separator)?
            || (text == "[" && input_rules::citation_input_rule(&mut tr, &citation.reference_trigger)?)
            || (text == " " && input_rules::collapsible_input_rule(&mut tr)?);

        if !ruled {
            let selection = tr.selection();
            let (from, to) = (selection.from(), selection.to());
            let inline = tr
                .doc()
                .resolve(from)
                .is_ok_and(|rpos| rpos.parent().has_inline_content());
            if !inline {
                if !tr.doc_changed() {
                    return Ok(self.unchanged());
                }
                return Ok(self.dispatch(tr));
            }
            tr.insert_text(text, from, to)?;
        }
        Ok(self.dispatch(tr))
    }

    /// Routes a key press. `None` when the key is left to the host.
    pub fn handle_key(&mut self, key: Key) -> Result<Option<Patch>, EditError> {
        if matches!(self.suggestion, SuggestionState::Error { .. }) {
            self.close_suggestion();
        }
        if let Some(patch) = self.suggestion_key(&key)? {
            return Ok(Some(patch));
        }
        if Key::char('j').primary().matches(&key) {
            self.request_suggestion();
            return Ok(Some(self.unchanged()));
        }

        let browsing = self.is_browsing();
        if let KeyCode::Char(c) = key.code {
            if !browsing && !key.modifiers.primary() && !key.modifiers.alt {
                return self.insert_text(&c.to_string()).map(Some);
            }
        }

        let table = if browsing { &self.browse_keys } else { &self.text_keys };
        let Some(action) = table.lookup(&key) else {
            log::trace!("no binding for {key}");
            // Browse mode owns the keyboard.
            return Ok(browsing.then(|| self.unchanged()));
        };

        let mut tr = self.transaction();
        let applied = match action {
            Action::Run(chain) => commands::first_of(&mut tr, chain),
            Action::ToggleMark(mark) => commands::toggle_mark(&mut tr, mark),
        }
        .inspect_err(|err| log::debug!("{key} failed: {err}"))?;

        if applied {
            Ok(Some(self.dispatch(tr)))
        } else if browsing {
            Ok(Some(self.unchanged()))
        } else {
            Ok(None)
        }
    }

    /// Keys an open suggestion takes over.
    fn suggestion_key(&mut self, key: &Key) -> Result<Option<Patch>, EditError> {
        let SuggestionState::Open { pos, .. } = self.suggestion else {
            return Ok(None);
        };
        let accept = [KeyCode::Tab, KeyCode::ArrowRight, KeyCode::Enter]
            .into_iter()
            .any(|code| Key::new(code).matches(key));
        if accept {
            let choice = self.suggestion.current_choice().unwrap_or_default().to_string();
            let mut tr = self.transaction();
            tr.insert_text(&format!(" {choice}"), pos, pos)?;
            tr.set_selection(Selection::cursor(pos + 1 + choice.chars().count()));
            tr.set_intent(Intent::Suggestion(SuggestionIntent::Close));
            return Ok(Some(self.dispatch(tr)));
        }
        if Key::new(KeyCode::Escape).matches(key) {
            return Ok(Some(self.close_suggestion()));
        }
        Ok(None)
    }

    fn close_suggestion(&mut self) -> Patch {
        let mut tr = self.transaction();
        tr.set_intent(Intent::Suggestion(SuggestionIntent::Close));
        self.dispatch(tr)
    }

    /// Asks for a sentence completion at the caret, or shows the next
    /// choice when one is already open. Returns the request the host
    /// should hand to [`Editor::complete_suggestion`].
    pub fn request_suggestion(&mut self) -> Option<SuggestionRequest> {
        if !self.config.suggestion.enabled {
            return None;
        }
        let cycling = matches!(self.suggestion, SuggestionState::Open { .. });
        let pos = self.state.selection.cursor_pos()?;
        let rpos = self.state.doc.resolve(pos).ok()?;
        let depth = rpos.depth();
        if !cycling && !rpos.parent().is_textblock() {
            return None;
        }
        let request = SuggestionRequest {
            id: self.next_request,
            prompt: self.state.doc.text_between(rpos.start(depth), pos, ""),
        };
        self.next_request += 1;

        let mut tr = self.transaction();
        tr.set_intent(Intent::Suggestion(SuggestionIntent::Open {
            request: request.clone(),
        }));
        self.dispatch(tr);
        (!cycling).then_some(request)
    }

    /// Runs `request` against `service` and shows the result, unless the
    /// user moved on in the meantime.
    pub async fn complete_suggestion(
        &mut self,
        service: &dyn SuggestionService,
        request: SuggestionRequest,
    ) -> Patch {
        let result = service.complete(&request.prompt).await;
        let mut tr = self.transaction();
        tr.set_intent(Intent::Suggestion(SuggestionIntent::Populate {
            request_id: request.id,
            result,
        }));
        self.dispatch(tr)
    }

    /// References matching the `@query` before the caret, when there is one.
    pub fn reference_suggestions(&self) -> Option<Vec<Reference>> {
        let (_, query) = citation::reference_query(
            &self.state.doc,
            &self.state.selection,
            &self.config.citation.reference_trigger,
        )?;
        Some(citation::reference_suggestions(self.references.as_ref(), &query))
    }

    /// Cached document decorations merged with the selection-dependent ones.
    pub fn decorations(&self) -> DecorationSet {
        let live = decorations::selection_decorations(
            &self.state.doc,
            &self.state.selection,
            &self.suggestion,
            &self.config,
        );
        self.doc_decorations.merge(&live)
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("state", &self.state)
            .field("suggestion", &self.suggestion)
            .field("hide_handles", &self.hide_handles)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
