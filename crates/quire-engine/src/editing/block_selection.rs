use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::{Mark, Node, Slice};
use crate::transform::{Assoc, StepError, Transaction};

use super::navigation::{self, enclosing_block};
use super::selection::{Selection, SelectionError};

/// Whole blocks selected from the block at `anchor` to the block at `head`.
///
/// Both ends are positions right before a block. A block selection always
/// covers at least one block, so it is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSelection {
    anchor: usize,
    head: usize,
}

impl BlockSelection {
    /// Normalizes both ends to the block around them.
    pub fn new(doc: &Node, anchor: usize, head: usize) -> Result<Self, SelectionError> {
        Ok(Self {
            anchor: block_start(doc, anchor)?,
            head: block_start(doc, head)?,
        })
    }

    pub fn single(doc: &Node, pos: usize) -> Result<Self, SelectionError> {
        Self::new(doc, pos, pos)
    }

    pub(crate) fn unchecked(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Every top-level block, with the head on the first one.
    pub fn all(doc: &Node) -> Self {
        let last = doc.last_child().map_or(0, Node::node_size);
        Self {
            anchor: doc.content_size() - last,
            head: 0,
        }
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Start of the last selected block.
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn empty(&self) -> bool {
        false
    }

    /// End of the last selected block.
    pub fn end(&self, doc: &Node) -> Result<usize, StepError> {
        let last = doc.node_at(self.to()).ok_or(StepError::NoNode { pos: self.to() })?;
        Ok(self.to() + last.node_size())
    }

    /// The selected blocks as a closed slice. When the first block is
    /// nested deeper than the last, it is lifted to the last one's level.
    pub fn content(&self, doc: &Node) -> Result<Slice, StepError> {
        let end = self.end(doc)?;
        let rfrom = doc.resolve(self.from())?;
        let rto = doc.resolve(self.to())?;
        if rfrom.depth() <= rto.depth() {
            return Ok(doc.slice(self.from(), end.max(self.block_end(doc)?))?);
        }
        let first = doc
            .node_at(self.from())
            .ok_or(StepError::NoNode { pos: self.from() })?;
        let start = rfrom.after(rto.depth() + 1);
        let rest = doc.slice(start, end)?;
        Ok(Slice::new(rest.content().add_to_start(first), 0, 0))
    }

    fn block_end(&self, doc: &Node) -> Result<usize, StepError> {
        let first = doc
            .node_at(self.from())
            .ok_or(StepError::NoNode { pos: self.from() })?;
        Ok(self.from() + first.node_size())
    }

    /// Removes the selected blocks, inserts `slice` in their place and puts
    /// a caret before it.
    pub fn replace(&self, tr: &mut Transaction, slice: Slice) -> Result<(), StepError> {
        let from = self.from();
        for range in self.ranges(tr.doc()).into_iter().rev() {
            let doc = tr.doc();
            if doc.child_count() == 1 && range == (0..doc.content_size()) {
                tr.replace_with(range.start, range.end, vec![empty_block()])?;
            } else {
                tr.delete(range.start, range.end)?;
            }
        }
        tr.replace(from, from, slice)?;
        let selection = Selection::near(tr.doc(), from, Assoc::Before);
        tr.set_selection(selection);
        Ok(())
    }

    /// Positions of every selected block, in document order. Blocks in
    /// between that sit at other depths are included.
    pub fn selected_blocks_pos(&self, doc: &Node) -> Vec<usize> {
        self.ranges(doc).into_iter().map(|r| r.start).collect()
    }

    /// The range of each selected block.
    pub fn ranges(&self, doc: &Node) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut pos = self.from();
        let size = doc.content_size();
        while pos <= self.to() && pos < size {
            match doc.node_at(pos) {
                Some(node) => {
                    let end = pos + node.node_size();
                    ranges.push(pos..end);
                    pos = end;
                }
                None => pos += 1,
            }
        }
        ranges
    }

    pub fn select_parent(&self, doc: &Node) -> Option<Self> {
        navigation::parent_block(doc, self.head).map(|b| Self::unchecked(b.pos, b.pos))
    }

    pub fn select_child(&self, doc: &Node) -> Option<Self> {
        self.child(doc).map(|pos| Self::unchecked(pos, pos))
    }

    /// The first child, or the next block in reading order.
    pub fn select_next(&self, doc: &Node) -> Option<Self> {
        self.child(doc)
            .or_else(|| self.next(doc))
            .map(|pos| Self::unchecked(pos, pos))
    }

    pub fn select_previous(&self, doc: &Node) -> Option<Self> {
        self.previous_or_parent(doc).map(|pos| Self::unchecked(pos, pos))
    }

    pub fn expand_down(&self, doc: &Node) -> Option<Self> {
        self.next(doc).map(|head| Self::unchecked(self.anchor, head))
    }

    /// Moves the head to the previous block, lifting whichever end is
    /// deeper so both denote siblings.
    pub fn expand_up(&self, doc: &Node) -> Option<Self> {
        let mut head = self.previous_or_parent(doc)?;
        let mut anchor = self.anchor;
        let rhead = doc.resolve(head).ok()?;
        let ranchor = doc.resolve(anchor).ok()?;
        if head <= anchor {
            if ranchor.depth() > rhead.depth() {
                anchor = ranchor.before(rhead.depth() + 1);
            }
        } else if rhead.depth() > ranchor.depth() {
            head = rhead.before(ranchor.depth() + 1);
        }
        Some(Self::unchecked(anchor, head))
    }

    /// Whether all selected text carries `mark`.
    pub fn is_mark_active(&self, doc: &Node, mark: Mark) -> bool {
        self.end(doc)
            .is_ok_and(|end| super::commands::text::mark_active(doc, self.from(), end, mark))
    }

    fn child(&self, doc: &Node) -> Option<usize> {
        let block = enclosing_block(doc, self.head)?;
        navigation::first_child_block(&block).map(|b| b.pos)
    }

    fn next(&self, doc: &Node) -> Option<usize> {
        navigation::following_block(doc, self.head).map(|b| b.pos)
    }

    /// The last visible descendant of the previous sibling, or the parent.
    fn previous_or_parent(&self, doc: &Node) -> Option<usize> {
        match navigation::previous_sibling(doc, self.head) {
            Some(previous) => Some(navigation::last_visible_descendant(previous).pos),
            None => navigation::parent_block(doc, self.head).map(|b| b.pos),
        }
    }
}

fn block_start(doc: &Node, pos: usize) -> Result<usize, SelectionError> {
    enclosing_block(doc, pos)
        .map(|b| b.pos)
        .ok_or(SelectionError::InvalidSelection { pos })
}

fn empty_block() -> Node {
    Node::block(Node::paragraph(vec![]), vec![])
}
