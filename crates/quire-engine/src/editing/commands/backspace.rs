//! The backspace ladder. The first rung that applies wins.

use crate::citation;
use crate::editing::navigation::parent_block;
use crate::editing::{EditError, Selection};
use crate::model::{AttrValue, BlockKind};
use crate::transform::Transaction;

use super::blocks::{delete_selection, join_backward, unindent_run};
use super::collapsible::{unwrap_collapsible_at, unwrap_partially_selected};
use super::{header_block, header_cursor, is_empty_block};

/// Backspace with a text or block selection.
///
/// 1. Citation rules (blocked partial deletions, emptied citations).
/// 2. A non-empty selection is sanitized and deleted.
/// 3. At the start of a typed block's header the type goes first:
///    collapsibles unwrap, lists become plain blocks.
/// 4. The empty only child of a collapsible is removed and the parent folds.
/// 5. A nested block unindents.
/// 6. Anything else joins with the block before.
pub fn backspace(tr: &mut Transaction) -> Result<bool, EditError> {
    let selection = tr.selection();
    if matches!(selection, Selection::Node(_)) {
        return Ok(false);
    }
    if citation::backspace_guard(tr)? {
        return Ok(true);
    }
    if !selection.empty() {
        unwrap_partially_selected(tr)?;
        return delete_selection(tr);
    }

    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    if rpos.parent_offset() != 0 {
        return Ok(false);
    }
    let block = header_block(&rpos);
    match block.node.block_kind() {
        Some(BlockKind::Collapsible) => {
            unwrap_collapsible_at(tr, block.pos)?;
            return Ok(true);
        }
        Some(_) => {
            tr.set_node_attribute(block.pos, "type", AttrValue::Null)?;
            return Ok(true);
        }
        None => {}
    }

    if let Some(parent) = parent_block(tr.doc(), block.pos) {
        if parent.node.is_collapsible()
            && parent.node.child_count() == 2
            && is_empty_block(&block.node)
        {
            tr.delete(block.pos, block.end())?;
            tr.set_node_attribute(parent.pos, "collapsed", true)?;
            let header_end = parent.pos + parent.node.child(0).node_size();
            tr.set_selection(Selection::cursor(header_end));
            log::debug!("removed empty content of collapsible at {}", parent.pos);
            return Ok(true);
        }
        return unindent_run(tr, block.pos, block.end());
    }

    join_backward(tr)
}
