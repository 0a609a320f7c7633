//! Block types: bullet lists, ordered lists and collapsibles.

use crate::editing::EditError;
use crate::editing::navigation::{BlockRef, top_level_nodes};
use crate::model::BlockKind;
use crate::transform::Transaction;

/// Sets `type = kind` on every selected top-level block, or clears it when
/// all of them already have it.
pub fn set_block_kind(tr: &mut Transaction, kind: BlockKind) -> Result<bool, EditError> {
    let blocks = selected_blocks(tr);
    if blocks.is_empty() {
        return Ok(false);
    }
    let toggled_off = blocks.iter().all(|b| b.node.block_kind() == Some(kind));
    let value = (!toggled_off).then_some(kind);
    for block in &blocks {
        tr.set_node_attribute(block.pos, "type", value)?;
        if block.node.is_collapsed() {
            tr.set_node_attribute(block.pos, "collapsed", false)?;
        }
    }
    log::debug!("set type {value:?} on {} block(s)", blocks.len());
    Ok(true)
}

pub fn toggle_bullet_list(tr: &mut Transaction) -> Result<bool, EditError> {
    set_block_kind(tr, BlockKind::BulletList)
}

pub fn toggle_ordered_list(tr: &mut Transaction) -> Result<bool, EditError> {
    set_block_kind(tr, BlockKind::OrderedList)
}

fn selected_blocks(tr: &Transaction) -> Vec<BlockRef> {
    let doc = tr.doc();
    let selection = tr.selection();
    match selection.as_block() {
        Some(blocks) => blocks
            .selected_blocks_pos(doc)
            .into_iter()
            .filter_map(|pos| doc.node_at(pos).map(|node| BlockRef { pos, node }))
            .collect(),
        None => top_level_nodes(doc, selection.from(), selection.to()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::editing::{BlockSelection, Selection};
    use crate::transform::Transaction;
    use pretty_assertions::assert_eq;

    // 0 A 5 B 10 C 15
    fn three() -> crate::model::Node {
        doc(vec![b("A", vec![]), b("B", vec![]), b("C", vec![])])
    }

    #[test]
    fn sets_kind_on_every_touched_block() {
        let mut tr = range(three(), 2, 7);
        assert!(toggle_bullet_list(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A [bulletList]", "B [bulletList]", "C"]);
    }

    #[test]
    fn toggles_off_when_all_have_the_kind() {
        let mut tr = at(three(), 2);
        assert!(toggle_ordered_list(&mut tr).unwrap());
        assert!(toggle_ordered_list(&mut tr).unwrap());
        assert_eq!(tr.doc(), &three());
    }

    #[test]
    fn mixed_selection_switches_everything_to_the_kind() {
        let start = doc(vec![
            typed(BlockKind::OrderedList, false, "A", vec![]),
            b("B", vec![]),
        ]);
        let mut tr = range(start, 2, 7);
        assert!(toggle_ordered_list(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A [orderedList]", "B [orderedList]"]);
    }

    #[test]
    fn replacing_a_folded_collapsible_clears_collapsed() {
        let start = doc(vec![typed(BlockKind::Collapsible, true, "A", vec![b("x", vec![])])]);
        let mut tr = at(start, 2);
        assert!(toggle_bullet_list(&mut tr).unwrap());
        let block = tr.doc().child(0);
        assert_eq!(block.block_kind(), Some(BlockKind::BulletList));
        assert!(!block.is_collapsed());
    }

    #[test]
    fn block_selection_uses_selected_blocks() {
        let doc = three();
        let selection = BlockSelection::new(&doc, 5, 10).unwrap();
        let mut tr = Transaction::new(doc, Selection::Block(selection));
        assert!(toggle_bullet_list(&mut tr).unwrap());
        assert_eq!(outline(tr.doc()), vec!["A", "B [bulletList]", "C [bulletList]"]);
    }
}
