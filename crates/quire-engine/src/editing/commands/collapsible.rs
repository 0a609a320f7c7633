//! Folding, wrapping and unwrapping collapsible blocks.
//!
//! A collapsible is a block with `type = collapsible`. Its header is the
//! summary line and its nested blocks are the content that folding hides.

use crate::editing::{BlockSelection, EditError, Selection};
use crate::model::{AttrValue, BlockKind, Fragment, Node, NodeKind};
use crate::transform::Transaction;

use super::{empty_block, header_block, header_cursor, is_empty_block};

/// Flips the `collapsed` attribute of the collapsible block starting at
/// `pos`, or of the innermost collapsible `pos` lies inside of. A fold-arrow
/// widget position works as is.
///
/// Unfolding a collapsible without content gives it an empty child block to
/// type in; folding one whose only content is an empty block drops it. A
/// selection inside content that is being hidden moves to the header.
pub fn toggle_fold(tr: &mut Transaction, pos: usize) -> Result<bool, EditError> {
    let Some((pos, block)) = collapsible_at(tr.doc(), pos) else {
        return Ok(false);
    };
    let header_size = block.child(0).node_size();
    let content_start = pos + 1 + header_size;
    let end = pos + block.node_size();

    if block.is_collapsed() {
        tr.set_node_attribute(pos, "collapsed", false)?;
        if block.child_count() == 1 {
            tr.insert(end - 1, vec![empty_block()])?;
        }
        log::debug!("unfolded block at {pos}");
        return Ok(true);
    }

    let selection = tr.selection();
    tr.set_node_attribute(pos, "collapsed", true)?;
    if selection.from() >= content_start && selection.from() < end {
        let moved = match selection {
            Selection::Block(_) => Selection::Block(BlockSelection::single(tr.doc(), pos)?),
            _ => Selection::cursor(pos + header_size),
        };
        tr.set_selection(moved);
    }
    if block.child_count() == 2 && is_empty_block(block.child(1)) {
        tr.delete(content_start, end - 1)?;
    }
    log::debug!("folded block at {pos}");
    Ok(true)
}

fn collapsible_at(doc: &Node, pos: usize) -> Option<(usize, Node)> {
    if let Some(block) = doc.node_at(pos).filter(Node::is_collapsible) {
        return Some((pos, block));
    }
    let rpos = doc.resolve(pos).ok()?;
    (1..=rpos.depth())
        .rev()
        .find(|&depth| rpos.node(depth).is_collapsible())
        .map(|depth| (rpos.before(depth), rpos.node(depth).clone()))
}

/// Turns the block around the caret into a folded collapsible.
pub fn wrap_in_collapsible(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    if rpos.parent().kind() != NodeKind::Paragraph {
        return Ok(false);
    }
    let block = header_block(&rpos);
    if block.node.is_collapsible() {
        return Ok(false);
    }
    tr.set_node_attribute(block.pos, "type", Some(BlockKind::Collapsible))?;
    tr.set_node_attribute(block.pos, "collapsed", true)?;
    Ok(true)
}

/// At the start of a collapsible's header: turns it into a plain block and
/// moves its content out behind it.
pub fn unwrap_collapsible(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    let block = header_block(&rpos);
    if rpos.parent_offset() != 0 || !block.node.is_collapsible() {
        return Ok(false);
    }
    unwrap_collapsible_at(tr, block.pos)?;
    Ok(true)
}

pub fn toggle_collapsible(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    let block = header_block(&rpos);
    if block.node.is_collapsible() {
        unwrap_collapsible_at(tr, block.pos)?;
        return Ok(true);
    }
    wrap_in_collapsible(tr)
}

pub(crate) fn unwrap_collapsible_at(tr: &mut Transaction, pos: usize) -> Result<(), EditError> {
    tr.set_node_attribute(pos, "type", AttrValue::Null)?;
    tr.set_node_attribute(pos, "collapsed", false)?;
    tr.lift_children(pos)?;
    log::debug!("unwrapped collapsible at {pos}");
    Ok(())
}

/// Splits a collapsible at the caret into two collapsibles of the same
/// state. The content stays with the first one.
pub fn split_collapsible_block(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    let block = header_block(&rpos);
    if !block.node.is_collapsible() {
        return Ok(false);
    }
    let header = rpos.parent();
    let from = rpos.pos();
    let header_end = rpos.end(rpos.depth());
    let rest = header.content().cut(rpos.parent_offset(), header.content_size());
    let second = block.node.copy(Fragment::from_node(header.copy(rest)));
    let after = block.end();

    tr.insert(after, vec![second])?;
    tr.delete(from, header_end)?;
    tr.set_selection(Selection::cursor(after - (header_end - from) + 2));
    Ok(true)
}

/// Enter inside an open collapsible: the text after the caret becomes its
/// first content block.
pub(crate) fn split_open_collapsible(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    let header = rpos.parent();
    let from = rpos.pos();
    let depth = rpos.depth();
    let header_end = rpos.end(depth);
    let first_child = rpos.after(depth);
    let rest = header.content().cut(rpos.parent_offset(), header.content_size());

    tr.insert(first_child, vec![Node::block(Node::paragraph(rest.to_vec()), vec![])])?;
    tr.delete(from, header_end)?;
    tr.set_selection(Selection::cursor(first_child - (header_end - from) + 2));
    Ok(true)
}

/// Unwraps every collapsible that starts inside the selection but ends
/// after it, so deleting the selection cannot leave half a collapsible.
pub fn unset_partially_selected_collapsible_blocks(tr: &mut Transaction) -> Result<bool, EditError> {
    Ok(unwrap_partially_selected(tr)? > 0)
}

/// Number of collapsibles unwrapped. The selection is mapped over the
/// unwrapping, so its end moves one position per unwrapped block it was in.
pub fn unwrap_partially_selected(tr: &mut Transaction) -> Result<usize, EditError> {
    let selection = tr.selection();
    if !selection.is_text() || selection.empty() {
        return Ok(0);
    }
    let (from, to) = (selection.from(), selection.to());
    let mut partial = Vec::new();
    tr.doc().nodes_between(from, to, &mut |node, pos, _, _| {
        if node.is_collapsible() && pos > from && pos + node.node_size() > to {
            partial.push(pos);
        }
        node.is_block()
    });
    for &pos in partial.iter().rev() {
        unwrap_collapsible_at(tr, pos)?;
    }
    Ok(partial.len())
}

/// Fills a collapsible that has no content with an empty block and puts
/// the caret in it.
pub fn fill_empty_collapsible(tr: &mut Transaction, pos: usize) -> Result<bool, EditError> {
    let Some(block) = tr.doc().node_at(pos).filter(Node::is_collapsible) else {
        return Ok(false);
    };
    if block.child_count() > 1 {
        return Ok(false);
    }
    let at = pos + block.node_size() - 1;
    tr.set_node_attribute(pos, "collapsed", false)?;
    tr.insert(at, vec![empty_block()])?;
    tr.set_selection(Selection::cursor(at + 2));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn collapsible(collapsed: bool, text: &str, children: Vec<Node>) -> Node {
        typed(BlockKind::Collapsible, collapsed, text, children)
    }

    // 0 block 1 p 2 "Header" 8 /p 9 L1 15 L2 21 /block 22
    fn folded() -> Node {
        doc(vec![collapsible(true, "Header", vec![b("L1", vec![]), b("L2", vec![])])])
    }

    #[rstest]
    #[case::folded_with_content(collapsible(true, "H", vec![b("x", vec![])]))]
    #[case::folded_without_content(collapsible(true, "H", vec![]))]
    #[case::open_with_content(collapsible(false, "H", vec![b("x", vec![]), b("y", vec![])]))]
    fn toggling_twice_restores_the_block(#[case] block: Node) {
        let original = doc(vec![block]);
        let mut tr = at(original.clone(), 2);
        assert!(toggle_fold(&mut tr, 0).unwrap());
        assert!(toggle_fold(&mut tr, 0).unwrap());
        assert_eq!(tr.doc(), &original);
    }

    #[test]
    fn unfolding_an_empty_collapsible_adds_a_block() {
        let mut tr = at(doc(vec![collapsible(true, "H", vec![])]), 2);
        assert!(toggle_fold(&mut tr, 0).unwrap());
        assert_eq!(tr.doc(), &doc(vec![collapsible(false, "H", vec![b("", vec![])])]));
    }

    #[test]
    fn folding_moves_caret_out_of_hidden_content() {
        let open = doc(vec![collapsible(false, "Header", vec![b("L1", vec![])])]);
        let mut tr = at(open, 11);
        assert!(toggle_fold(&mut tr, 0).unwrap());
        assert!(tr.doc().child(0).is_collapsed());
        assert_eq!(tr.selection(), Selection::cursor(8));
    }

    #[test]
    fn toggle_fold_accepts_positions_inside_the_block() {
        // outer 0..18, "Out" 2..5, inner 6..17, "In" 8..10, block x 11..16
        let nested = doc(vec![collapsible(
            false,
            "Out",
            vec![collapsible(false, "In", vec![b("x", vec![])])],
        )]);
        let set = crate::decorations::doc_decorations(&nested, false, &Default::default());
        let arrows: Vec<usize> = set.widgets.iter().map(|w| w.pos).collect();
        assert_eq!(arrows, vec![2, 8]);

        let mut tr = at(nested.clone(), 2);
        assert!(toggle_fold(&mut tr, arrows[0]).unwrap());
        assert!(tr.doc().child(0).is_collapsed());

        let mut tr = at(nested.clone(), 2);
        assert!(toggle_fold(&mut tr, arrows[1]).unwrap());
        assert!(!tr.doc().child(0).is_collapsed());
        assert!(tr.doc().child(0).child(1).is_collapsed());

        // Inside the plain block nested in "In"
        let mut tr = at(nested, 2);
        assert!(toggle_fold(&mut tr, 14).unwrap());
        assert!(tr.doc().child(0).child(1).is_collapsed());
    }

    #[test]
    fn toggle_fold_ignores_plain_blocks() {
        let mut tr = at(doc(vec![b("A", vec![])]), 2);
        assert!(!toggle_fold(&mut tr, 0).unwrap());
        assert!(!toggle_fold(&mut tr, 99).unwrap());
    }

    #[test]
    fn wrap_and_unwrap() {
        let mut tr = at(doc(vec![b("A", vec![b("child", vec![])])]), 2);
        assert!(wrap_in_collapsible(&mut tr).unwrap());
        assert!(tr.doc().child(0).is_folded());
        assert!(!wrap_in_collapsible(&mut tr).unwrap());

        assert!(unwrap_collapsible(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A", "child"]);
    }

    #[test]
    fn unwrap_needs_caret_at_header_start() {
        let mut tr = at(folded(), 4);
        assert!(!unwrap_collapsible(&mut tr).unwrap());
    }

    #[test]
    fn toggle_collapsible_both_ways() {
        let mut tr = at(doc(vec![b("A", vec![])]), 3);
        assert!(toggle_collapsible(&mut tr).unwrap());
        assert!(tr.doc().child(0).is_collapsible());
        assert!(toggle_collapsible(&mut tr).unwrap());
        assert_eq!(tr.doc(), &doc(vec![b("A", vec![])]));
    }

    #[test]
    fn split_collapsible_keeps_content_on_the_first_half() {
        let mut tr = at(folded(), 5);
        assert!(split_collapsible_block(&mut tr).unwrap());
        assert_eq!(
            tr.doc(),
            &doc(vec![
                collapsible(true, "Hea", vec![b("L1", vec![]), b("L2", vec![])]),
                collapsible(true, "der", vec![]),
            ])
        );
        // The second block starts at 19.
        assert_eq!(tr.selection(), Selection::cursor(21));
    }

    #[test]
    fn enter_in_open_collapsible_creates_first_child() {
        let open = doc(vec![collapsible(false, "Header", vec![b("L1", vec![])])]);
        let mut tr = at(open, 5);
        assert!(split_open_collapsible(&mut tr).unwrap());
        assert_eq!(
            tr.doc(),
            &doc(vec![collapsible(false, "Hea", vec![b("der", vec![]), b("L1", vec![])])])
        );
        assert_eq!(tr.selection(), Selection::cursor(8));
    }

    #[test]
    fn sanitizer_unwraps_partially_selected_collapsible() {
        let first = b("First paragraph", vec![]);
        let last = b("Last paragraph", vec![]);
        let original = doc(vec![
            first.clone(),
            collapsible(true, "Header", vec![b("Content Line 1", vec![]), b("Content Line 2", vec![])]),
            last.clone(),
        ]);
        // "Content Line 1" starts at 30.
        let mut tr = range(original, 2, 30);
        assert_eq!(unwrap_partially_selected(&mut tr).unwrap(), 1);
        let doc = tr.doc();
        assert_eq!(doc.child_count(), 5);
        assert_eq!(doc.child(0), &first);
        assert_eq!(doc.child(4), &last);
        assert_eq!(
            outline(doc),
            vec!["First paragraph", "Header", "Content Line 1", "Content Line 2", "Last paragraph"]
        );
        assert_eq!(tr.selection(), Selection::text(2, 31));
    }

    #[test]
    fn sanitizer_leaves_fully_selected_collapsibles() {
        let original = doc(vec![b("A", vec![]), collapsible(true, "H", vec![]), b("B", vec![])]);
        // The collapsible spans 5..10; the selection runs into B.
        let mut tr = range(original, 2, 12);
        assert!(!unset_partially_selected_collapsible_blocks(&mut tr).unwrap());
        assert!(tr.steps().is_empty());
    }

    #[test]
    fn fill_empty_collapsible_places_caret_in_new_block() {
        let mut tr = at(doc(vec![collapsible(true, "H", vec![])]), 2);
        assert!(fill_empty_collapsible(&mut tr, 0).unwrap());
        assert_eq!(tr.doc(), &doc(vec![collapsible(false, "H", vec![b("", vec![])])]));
        // 0 block 1 p(H) 4 block 5 p 6
        assert_eq!(tr.selection(), Selection::cursor(6));
        assert!(!fill_empty_collapsible(&mut tr, 0).unwrap());
    }
}
