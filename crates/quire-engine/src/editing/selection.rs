use serde::{Deserialize, Serialize};

use crate::model::{Node, Slice};
use crate::transform::{Assoc, Mapping, StepError, Transaction};

use super::block_selection::BlockSelection;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no block found around position {pos}")]
    InvalidSelection { pos: usize },
}

/// A caret or a character range between `anchor` and `head`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSelection {
    pub anchor: usize,
    pub head: usize,
}

/// A single node picked as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSelection {
    pub from: usize,
    pub to: usize,
}

/// Where the user's focus is in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Selection {
    Text(TextSelection),
    Node(NodeSelection),
    Block(BlockSelection),
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Self::text(pos, pos)
    }

    pub fn text(anchor: usize, head: usize) -> Self {
        Selection::Text(TextSelection { anchor, head })
    }

    /// Selects the node starting at `pos`.
    pub fn node(doc: &Node, pos: usize) -> Option<Self> {
        let node = doc.node_at(pos)?;
        Some(Selection::Node(NodeSelection {
            from: pos,
            to: pos + node.node_size(),
        }))
    }

    pub fn anchor(&self) -> usize {
        match self {
            Selection::Text(s) => s.anchor,
            Selection::Node(s) => s.from,
            Selection::Block(s) => s.anchor(),
        }
    }

    pub fn head(&self) -> usize {
        match self {
            Selection::Text(s) => s.head,
            Selection::Node(s) => s.to,
            Selection::Block(s) => s.head(),
        }
    }

    pub fn from(&self) -> usize {
        self.anchor().min(self.head())
    }

    pub fn to(&self) -> usize {
        self.anchor().max(self.head())
    }

    /// Node and block selections always cover something.
    pub fn empty(&self) -> bool {
        match self {
            Selection::Text(s) => s.anchor == s.head,
            Selection::Node(_) | Selection::Block(_) => false,
        }
    }

    /// The caret position of an empty text selection.
    pub fn cursor_pos(&self) -> Option<usize> {
        match self {
            Selection::Text(s) if s.anchor == s.head => Some(s.head),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&BlockSelection> {
        match self {
            Selection::Block(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Selection::Text(_))
    }

    /// This selection in `doc`, after the edits described by `mapping`.
    /// Falls back to the nearest valid caret when the old target is gone.
    pub fn map(&self, doc: &Node, mapping: &Mapping) -> Selection {
        match self {
            Selection::Text(s) => {
                let head = mapping.map(s.head, Assoc::After);
                if !has_inline_content(doc, head) {
                    return Selection::near(doc, head, Assoc::After);
                }
                let anchor = mapping.map(s.anchor, Assoc::After);
                let anchor = if has_inline_content(doc, anchor) {
                    anchor
                } else {
                    head
                };
                Selection::text(anchor, head)
            }
            Selection::Node(s) => {
                let result = mapping.map_result(s.from, Assoc::After);
                if result.deleted() {
                    return Selection::near(doc, result.pos, Assoc::After);
                }
                Selection::node(doc, result.pos)
                    .unwrap_or_else(|| Selection::near(doc, result.pos, Assoc::After))
            }
            Selection::Block(s) => {
                let anchor = mapping.map(s.anchor(), Assoc::After);
                let head = mapping.map(s.head(), Assoc::After);
                BlockSelection::new(doc, anchor, head)
                    .map(Selection::Block)
                    .unwrap_or_else(|_| Selection::near(doc, head, Assoc::After))
            }
        }
    }

    /// Maps the raw positions without validating them against a document.
    pub fn map_positions(&self, mapping: &Mapping) -> Selection {
        match self {
            Selection::Text(s) => Selection::text(
                mapping.map(s.anchor, Assoc::After),
                mapping.map(s.head, Assoc::After),
            ),
            Selection::Node(s) => Selection::Node(NodeSelection {
                from: mapping.map(s.from, Assoc::After),
                to: mapping.map(s.to, Assoc::Before),
            }),
            Selection::Block(s) => Selection::Block(BlockSelection::unchecked(
                mapping.map(s.anchor(), Assoc::After),
                mapping.map(s.head(), Assoc::After),
            )),
        }
    }

    /// The selected content.
    pub fn content(&self, doc: &Node) -> Result<Slice, StepError> {
        match self {
            Selection::Block(s) => s.content(doc),
            _ => Ok(doc.slice(self.from(), self.to())?),
        }
    }

    /// Replaces the selection with `slice` and puts a caret after the
    /// inserted content.
    pub fn replace(&self, tr: &mut Transaction, slice: Slice) -> Result<(), StepError> {
        if let Selection::Block(s) = self {
            return s.replace(tr, slice);
        }
        let steps = tr.steps().len();
        let assoc = if slice.size() == 0 {
            Assoc::Before
        } else {
            Assoc::After
        };
        tr.replace(self.from(), self.to(), slice)?;
        let mut end = self.from();
        if let Some(step) = tr.steps().get(steps) {
            step.get_map().for_each(|_, _, _, new_end| end = new_end);
        }
        let selection = Selection::near(tr.doc(), end, assoc);
        tr.set_selection(selection);
        Ok(())
    }

    /// A caret at `pos` when it is in inline content, otherwise at the
    /// nearest textblock edge, searching in the `assoc` direction first.
    pub fn near(doc: &Node, pos: usize, assoc: Assoc) -> Selection {
        let pos = pos.min(doc.content_size());
        if has_inline_content(doc, pos) {
            return Selection::cursor(pos);
        }
        let mut textblocks = Vec::new();
        doc.descendants(&mut |node, start, _, _| {
            if node.is_textblock() {
                textblocks.push((start + 1, start + node.node_size() - 1));
                return false;
            }
            !node.is_inline()
        });
        let before = || textblocks.iter().rev().find(|(_, end)| *end <= pos).map(|(_, end)| *end);
        let after = || textblocks.iter().find(|(start, _)| *start >= pos).map(|(start, _)| *start);
        let found = match assoc {
            Assoc::Before => before().or_else(after),
            Assoc::After => after().or_else(before),
        };
        Selection::cursor(found.unwrap_or(0))
    }

    pub fn at_start(doc: &Node) -> Selection {
        Selection::near(doc, 0, Assoc::After)
    }
}

/// Whether `pos` sits directly in a node holding inline content.
fn has_inline_content(doc: &Node, pos: usize) -> bool {
    doc.resolve(pos)
        .map(|rpos| rpos.parent().has_inline_content())
        .unwrap_or(false)
}
