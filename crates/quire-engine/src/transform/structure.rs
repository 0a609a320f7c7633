//! Structural rewrites of the block tree expressed as single steps.
//!
//! Blocks nest by containment: a block's first child is its header and the
//! rest are nested blocks. Indenting moves a run of sibling blocks to the end
//! of the block before them; unindenting moves the trailing children of a
//! block out behind it. Both are one `ReplaceAround` that only rewrites the
//! tokens at the edges, so the moved subtrees are reused untouched.

use crate::model::{Attrs, Fragment, Node, NodeKind, Slice};

use super::{Step, StepError, Transaction};

/// An open block token, used as the wrapper of sink and lift steps.
fn block_edge() -> Slice {
    Slice::new(
        Fragment::from_node(Node::new(NodeKind::Block, &Attrs::new(), Fragment::empty())),
        1,
        0,
    )
}

impl Transaction {
    /// Moves the sibling blocks in `start..end` to the end of the block that
    /// closes at `start`.
    pub fn sink_range(&mut self, start: usize, end: usize) -> Result<&mut Self, StepError> {
        let Some(open) = start.checked_sub(1) else {
            return Err(StepError::StructureReplace);
        };
        self.step(Step::replace_around(open, end, start, end, block_edge(), 0, true))
    }

    /// Moves the blocks in `start..end` out of their parent, whose content
    /// must end at `end`. They become the parent's following siblings.
    pub fn lift_range(&mut self, start: usize, end: usize) -> Result<&mut Self, StepError> {
        self.step(Step::replace_around(start, end + 1, start, end, block_edge(), 1, true))
    }

    /// Lifts every nested block of the block at `pos` behind it.
    pub fn lift_children(&mut self, pos: usize) -> Result<&mut Self, StepError> {
        let block = self.doc().node_at(pos).ok_or(StepError::NoNode { pos })?;
        let Some(header) = block.first_child() else {
            return Ok(self);
        };
        if block.child_count() < 2 {
            return Ok(self);
        }
        let start = pos + 1 + header.node_size();
        let end = pos + block.node_size() - 1;
        self.lift_range(start, end)
    }

    /// Appends the header of the block containing `second` (a position at
    /// the start of that header's content) to the textblock ending at
    /// `first`, and puts the block's nested blocks where it stood.
    pub fn join_textblocks(&mut self, first: usize, second: usize) -> Result<&mut Self, StepError> {
        let rsecond = self.doc().resolve(second)?;
        let depth = rsecond.depth();
        if depth < 2 || !rsecond.parent().is_textblock() || first >= rsecond.before(depth - 1) {
            return Err(StepError::StructureReplace);
        }
        let header = rsecond.parent().clone();
        let before = rsecond.before(depth - 1);
        let after = rsecond.after(depth - 1);
        let children = self.doc().slice(before + 1 + header.node_size(), after - 1)?;
        self.replace(before, after, children)?;
        self.insert_fragment(first, header.content().clone())
    }
}
