//! Block-browse mode: whole blocks are selected and moved around with the
//! arrow keys. Every command here expects a block selection except
//! `enter_block_browse` and `select_all_blocks`.

use crate::editing::navigation::{next_sibling, parent_block, previous_sibling};
use crate::editing::{BlockSelection, EditError, Selection};
use crate::model::{Node, Slice};
use crate::transform::{Assoc, Transaction};

use super::blocks::unindent_run;
use super::collapsible::toggle_fold;

/// Escape in text mode: selects the blocks around the selection.
pub fn enter_block_browse(tr: &mut Transaction) -> Result<bool, EditError> {
    let selection = tr.selection();
    if selection.as_block().is_some() {
        return Ok(false);
    }
    let blocks = BlockSelection::new(tr.doc(), selection.anchor(), selection.head())?;
    tr.set_selection(Selection::Block(blocks));
    Ok(true)
}

/// Enter or Escape in browse mode: a caret at the start of the head
/// block's header.
pub fn exit_block_browse(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(blocks) = block_selection(tr) else {
        return Ok(false);
    };
    let caret = Selection::near(tr.doc(), blocks.head() + 2, Assoc::After);
    tr.set_selection(caret);
    Ok(true)
}

pub fn browse_up(tr: &mut Transaction) -> Result<bool, EditError> {
    navigate(tr, BlockSelection::select_previous)
}

pub fn browse_down(tr: &mut Transaction) -> Result<bool, EditError> {
    navigate(tr, BlockSelection::select_next)
}

pub fn browse_expand_up(tr: &mut Transaction) -> Result<bool, EditError> {
    navigate(tr, BlockSelection::expand_up)
}

pub fn browse_expand_down(tr: &mut Transaction) -> Result<bool, EditError> {
    navigate(tr, BlockSelection::expand_down)
}

/// Folds an open collapsible head, otherwise selects the parent.
pub fn browse_left(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(blocks) = block_selection(tr) else {
        return Ok(false);
    };
    let head = blocks.head();
    let open = tr
        .doc()
        .node_at(head)
        .is_some_and(|node| node.is_collapsible() && !node.is_collapsed());
    if open {
        return toggle_fold(tr, head);
    }
    navigate(tr, BlockSelection::select_parent)
}

/// Unfolds a folded head, otherwise selects its first child.
pub fn browse_right(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(blocks) = block_selection(tr) else {
        return Ok(false);
    };
    let head = blocks.head();
    if tr.doc().node_at(head).is_some_and(|node| node.is_folded()) {
        return toggle_fold(tr, head);
    }
    navigate(tr, BlockSelection::select_child)
}

/// Moves the selected blocks above the previous sibling, into it when it
/// takes children, or out in front of the parent at the top of a parent.
pub fn move_blocks_up(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(run) = sibling_run(tr) else {
        return Ok(false);
    };
    let doc = tr.doc();
    let target = match previous_sibling(doc, run.from) {
        Some(previous) if accepts_children(&previous.node) => previous.end() - 1,
        Some(previous) => previous.pos,
        None => match parent_block(doc, run.from) {
            Some(parent) => parent.pos,
            None => return Ok(false),
        },
    };
    let slice = doc.slice(run.from, run.end)?;
    tr.delete(run.from, run.end)?;
    tr.replace(target, target, slice)?;
    run.select_at(tr, target);
    log::debug!("moved blocks {}..{} up to {target}", run.from, run.end);
    Ok(true)
}

/// Moves the selected blocks below the next sibling, into it as first
/// children when it takes children, or out behind the parent at the end.
pub fn move_blocks_down(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(run) = sibling_run(tr) else {
        return Ok(false);
    };
    let doc = tr.doc();
    let target = match next_sibling(doc, run.to) {
        Some(next) if accepts_children(&next.node) => next.pos + 1 + next.node.child(0).node_size(),
        Some(next) => next.end(),
        None => match parent_block(doc, run.from) {
            Some(parent) => parent.end(),
            None => return Ok(false),
        },
    };
    let slice = doc.slice(run.from, run.end)?;
    tr.replace(target, target, slice)?;
    tr.delete(run.from, run.end)?;
    run.select_at(tr, target - (run.end - run.from));
    log::debug!("moved blocks {}..{} down to {target}", run.from, run.end);
    Ok(true)
}

/// Tab in browse mode. Indenting into a folded collapsible unfolds it.
pub fn browse_indent(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(run) = sibling_run(tr) else {
        return Ok(false);
    };
    let Some(previous) = previous_sibling(tr.doc(), run.from) else {
        return Ok(false);
    };
    if previous.node.is_folded() {
        tr.set_node_attribute(previous.pos, "collapsed", false)?;
    }
    tr.sink_range(run.from, run.end)?;
    run.select_at(tr, run.from - 1);
    Ok(true)
}

pub fn browse_unindent(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(run) = sibling_run(tr) else {
        return Ok(false);
    };
    if !unindent_run(tr, run.from, run.end)? {
        return Ok(false);
    }
    run.select_at(tr, run.from + 1);
    Ok(true)
}

/// Deletes the selected blocks and selects the block the caret lands in.
pub fn browse_delete(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(blocks) = block_selection(tr) else {
        return Ok(false);
    };
    blocks.replace(tr, Slice::empty())?;
    let landed = tr.selection().from();
    if let Ok(next) = BlockSelection::single(tr.doc(), landed) {
        tr.set_selection(Selection::Block(next));
    }
    Ok(true)
}

pub fn select_all_blocks(tr: &mut Transaction) -> Result<bool, EditError> {
    let all = BlockSelection::all(tr.doc());
    tr.set_selection(Selection::Block(all));
    Ok(true)
}

fn block_selection(tr: &Transaction) -> Option<BlockSelection> {
    tr.selection().as_block().copied()
}

fn navigate(
    tr: &mut Transaction,
    step: fn(&BlockSelection, &Node) -> Option<BlockSelection>,
) -> Result<bool, EditError> {
    let Some(blocks) = block_selection(tr) else {
        return Ok(false);
    };
    match step(&blocks, tr.doc()) {
        Some(next) => {
            tr.set_selection(Selection::Block(next));
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Blocks a move can drop into: open ones that already nest, lists and
/// collapsibles.
fn accepts_children(node: &Node) -> bool {
    !node.is_folded()
        && (node.is_collapsible()
            || node.block_kind().is_some_and(|kind| kind.is_list())
            || node.child_count() > 1)
}

/// A block selection normalized to a run of siblings.
struct SiblingRun {
    from: usize,
    /// Start of the last block.
    to: usize,
    end: usize,
    forward: bool,
}

impl SiblingRun {
    /// Selects the run again after it moved to `from`.
    fn select_at(&self, tr: &mut Transaction, from: usize) {
        let last = from + (self.to - self.from);
        let blocks = if self.forward {
            BlockSelection::unchecked(from, last)
        } else {
            BlockSelection::unchecked(last, from)
        };
        tr.set_selection(Selection::Block(blocks));
    }
}

/// Lifts whichever end of the selection is nested deeper to the ancestor
/// that is a sibling of the other end.
fn sibling_run(tr: &Transaction) -> Option<SiblingRun> {
    let blocks = block_selection(tr)?;
    let doc = tr.doc();
    let rfrom = doc.resolve(blocks.from()).ok()?;
    let rto = doc.resolve(blocks.to()).ok()?;
    let shared = rfrom.shared_depth(blocks.to()).min(rto.depth());
    let from = if rfrom.depth() > shared {
        rfrom.before(shared + 1)
    } else {
        blocks.from()
    };
    let to = if rto.depth() > shared {
        rto.before(shared + 1)
    } else {
        blocks.to()
    };
    let last = doc.node_at(to).filter(Node::is_block)?;
    Some(SiblingRun {
        from,
        to,
        end: to + last.node_size(),
        forward: blocks.anchor() <= blocks.head(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::model::BlockKind;
    use pretty_assertions::assert_eq;

    // 0 A 5 B(6 p, 9 B1, 14 B2, 19 /B) 20 C 25
    fn nested() -> Node {
        doc(vec![
            b("A", vec![]),
            b("B", vec![b("B1", vec![]), b("B2", vec![])]),
            b("C", vec![]),
        ])
    }

    fn browsing(doc: Node, anchor: usize, head: usize) -> Transaction {
        Transaction::new(doc, Selection::Block(BlockSelection::unchecked(anchor, head)))
    }

    fn single(pos: usize) -> Selection {
        Selection::Block(BlockSelection::unchecked(pos, pos))
    }

    #[test]
    fn escape_enters_and_enter_leaves() {
        let mut tr = at(nested(), 7);
        assert!(enter_block_browse(&mut tr).unwrap());
        assert_eq!(tr.selection(), single(5));
        assert!(!enter_block_browse(&mut tr).unwrap());
        assert!(exit_block_browse(&mut tr).unwrap());
        assert_eq!(tr.selection(), Selection::cursor(7));
    }

    #[test]
    fn arrows_walk_in_reading_order() {
        let mut tr = browsing(nested(), 0, 0);
        let mut seen = Vec::new();
        while browse_down(&mut tr).unwrap() {
            seen.push(tr.selection().head());
        }
        assert_eq!(seen, vec![5, 9, 14, 20]);

        assert!(browse_up(&mut tr).unwrap());
        assert_eq!(tr.selection(), single(14));
    }

    #[test]
    fn left_and_right_fold_before_moving() {
        // 0 block 1 p 2 "H" 3 /p 4 x
        let start = doc(vec![typed(BlockKind::Collapsible, false, "H", vec![b("x", vec![])])]);
        let mut tr = browsing(start, 0, 0);
        assert!(browse_left(&mut tr).unwrap());
        assert!(tr.doc().child(0).is_folded());
        assert!(!browse_left(&mut tr).unwrap());

        assert!(browse_right(&mut tr).unwrap());
        assert!(!tr.doc().child(0).is_collapsed());
        assert!(browse_right(&mut tr).unwrap());
        assert_eq!(tr.selection(), single(4));
    }

    #[test]
    fn move_up_enters_a_previous_sibling_with_children() {
        let mut tr = browsing(nested(), 20, 20);
        assert!(move_blocks_up(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A", "B", "  B1", "  B2", "  C"]);
        assert_eq!(tr.selection(), single(19));
    }

    #[test]
    fn move_up_from_first_child_leaves_the_parent() {
        let mut tr = browsing(nested(), 9, 9);
        assert!(move_blocks_up(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A", "B1", "B", "  B2", "C"]);
        assert_eq!(tr.selection(), single(5));
    }

    #[test]
    fn move_up_at_document_start_does_nothing() {
        let mut tr = browsing(nested(), 0, 0);
        assert!(!move_blocks_up(&mut tr).unwrap());
        assert!(tr.steps().is_empty());
    }

    #[test]
    fn move_down_becomes_first_child() {
        let mut tr = browsing(nested(), 0, 0);
        assert!(move_blocks_down(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["B", "  A", "  B1", "  B2", "C"]);
        assert_eq!(tr.selection(), single(4));
    }

    #[test]
    fn move_down_from_last_child_leaves_the_parent() {
        let mut tr = browsing(nested(), 14, 14);
        assert!(move_blocks_down(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A", "B", "  B1", "B2", "C"]);
        assert_eq!(tr.selection(), single(15));
    }

    #[test]
    fn move_down_swaps_with_a_plain_sibling() {
        // 0 A 5 B 10
        let mut tr = browsing(doc(vec![b("A", vec![]), b("B", vec![])]), 0, 0);
        assert!(move_blocks_down(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["B", "A"]);
        assert_eq!(tr.selection(), single(5));
    }

    #[test]
    fn indent_and_unindent_in_browse_mode() {
        let mut tr = browsing(nested(), 20, 20);
        assert!(browse_indent(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A", "B", "  B1", "  B2", "  C"]);
        assert_eq!(tr.selection(), single(19));

        assert!(browse_unindent(&mut tr).unwrap());
        assert_eq!(tr.doc(), &nested());
        assert_eq!(tr.selection(), single(20));
    }

    #[test]
    fn first_child_cannot_indent() {
        let mut tr = browsing(nested(), 9, 9);
        assert!(!browse_indent(&mut tr).unwrap());
    }

    #[test]
    fn uneven_selection_is_lifted_to_siblings() {
        let mut tr = browsing(nested(), 14, 20);
        assert!(browse_indent(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A", "  B", "    B1", "    B2", "  C"]);
        assert_eq!(tr.selection(), Selection::Block(BlockSelection::unchecked(4, 19)));
    }

    #[test]
    fn indent_into_folded_collapsible_unfolds_it() {
        // 0 block 1 p 2 "H" 3 /p 4 /block 5 "A"
        let start = doc(vec![typed(BlockKind::Collapsible, true, "H", vec![]), b("A", vec![])]);
        let mut tr = browsing(start, 5, 5);
        assert!(browse_indent(&mut tr).unwrap());
        assert_eq!(
            tr.doc(),
            &doc(vec![typed(BlockKind::Collapsible, false, "H", vec![b("A", vec![])])])
        );
    }

    #[test]
    fn delete_selects_where_the_caret_lands() {
        let mut tr = browsing(nested(), 5, 5);
        assert!(browse_delete(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A", "C"]);
        assert_eq!(tr.selection(), single(0));
    }

    #[test]
    fn select_all_covers_every_top_level_block() {
        let mut tr = at(nested(), 2);
        assert!(select_all_blocks(&mut tr).unwrap());
        assert_eq!(tr.selection(), Selection::Block(BlockSelection::unchecked(20, 0)));
    }
}
