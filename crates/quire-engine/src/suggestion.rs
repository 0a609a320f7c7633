//! Sentence completion.
//!
//! Mod-j asks a [`SuggestionService`] to continue the sentence before the
//! caret. The request goes out asynchronously; its result comes back as a
//! separate transaction carrying a `Populate` intent. Any transaction
//! without a suggestion intent closes the suggestion, so a result that
//! arrives after the user moved on is dropped.

use async_trait::async_trait;
use quire_config::SuggestionConfig;

use crate::transform::{Intent, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuggestionError {
    #[error("suggestion service failed: {0}")]
    Service(String),

    #[error("suggestion service is unavailable")]
    Unavailable,
}

/// Text completion backend, usually a remote model.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    /// Continuations of `prompt`. An empty list means "nothing to suggest".
    async fn complete(&self, prompt: &str) -> Result<Vec<String>, SuggestionError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub id: u64,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionIntent {
    /// Ask for a suggestion, or show the next choice when one is open.
    Open { request: SuggestionRequest },
    Populate {
        request_id: u64,
        result: Result<Vec<String>, SuggestionError>,
    },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SuggestionState {
    #[default]
    Closed,
    Pending {
        pos: usize,
        request: SuggestionRequest,
    },
    Open {
        pos: usize,
        choices: Vec<String>,
        index: usize,
    },
    Error {
        pos: usize,
        message: String,
    },
}

impl SuggestionState {
    /// The state after `tr`.
    pub fn apply(&self, tr: &Transaction, config: &SuggestionConfig) -> SuggestionState {
        let intent = tr.intents().iter().rev().find_map(|intent| match intent {
            Intent::Suggestion(intent) => Some(intent),
            _ => None,
        });
        let Some(intent) = intent else {
            return SuggestionState::Closed;
        };
        match (self, intent) {
            (_, SuggestionIntent::Close) => SuggestionState::Closed,
            (SuggestionState::Open { pos, choices, index }, SuggestionIntent::Open { .. }) => {
                SuggestionState::Open {
                    pos: *pos,
                    choices: choices.clone(),
                    index: (index + 1) % choices.len().max(1),
                }
            }
            (_, SuggestionIntent::Open { request }) => SuggestionState::Pending {
                pos: tr.selection().to(),
                request: request.clone(),
            },
            (SuggestionState::Error { .. }, _) => SuggestionState::Closed,
            (SuggestionState::Pending { pos, request }, SuggestionIntent::Populate { request_id, result })
                if request.id == *request_id =>
            {
                populated(*pos, result, config)
            }
            (state, SuggestionIntent::Populate { request_id, .. }) => {
                log::warn!("dropping stale suggestion result for request {request_id}");
                state.clone()
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, SuggestionState::Closed)
    }

    pub fn pending_request(&self) -> Option<&SuggestionRequest> {
        match self {
            SuggestionState::Pending { request, .. } => Some(request),
            _ => None,
        }
    }

    /// The choice shown when the suggestion is open.
    pub fn current_choice(&self) -> Option<&str> {
        match self {
            SuggestionState::Open { choices, index, .. } => choices.get(*index).map(String::as_str),
            _ => None,
        }
    }

    /// Position and text of the inline widget.
    pub fn widget(&self, config: &SuggestionConfig) -> Option<(usize, String)> {
        match self {
            SuggestionState::Closed => None,
            SuggestionState::Pending { pos, .. } => Some((*pos, config.pending_text.clone())),
            SuggestionState::Open { pos, .. } => {
                self.current_choice().map(|choice| (*pos, format!(" {choice}")))
            }
            SuggestionState::Error { pos, message } => Some((*pos, message.clone())),
        }
    }
}

fn populated(
    pos: usize,
    result: &Result<Vec<String>, SuggestionError>,
    config: &SuggestionConfig,
) -> SuggestionState {
    match result {
        Ok(choices) if choices.is_empty() => {
            log::warn!("{}", config.no_result_text);
            SuggestionState::Error {
                pos,
                message: config.no_result_text.clone(),
            }
        }
        Ok(choices) => SuggestionState::Open {
            pos,
            choices: choices.clone(),
            index: 0,
        },
        Err(err) => {
            log::warn!("sentence completion failed: {err}");
            SuggestionState::Error {
                pos,
                message: err.to_string(),
            }
        }
    }
}
