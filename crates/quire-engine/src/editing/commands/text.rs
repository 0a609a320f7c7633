//! Inline edits: marks, single-character deletion and input rules.

use crate::editing::{EditError, Selection};
use crate::model::{BlockKind, Mark, Node, NodeKind};
use crate::transform::Transaction;

use super::{cursor, empty_block, header_block, header_cursor};

/// Whether there is text in `from..to` and all of it carries `mark`.
pub fn mark_active(doc: &Node, from: usize, to: usize, mark: Mark) -> bool {
    let mut total = 0;
    let mut marked = 0;
    doc.nodes_between(from, to, &mut |node, pos, _, _| {
        if node.is_text() {
            let overlap = to.min(pos + node.node_size()) - from.max(pos);
            total += overlap;
            if node.marks().contains(&mark) {
                marked += overlap;
            }
        }
        true
    });
    total > 0 && marked == total
}

/// Adds `mark` to the selected text, or removes it when all of the text
/// already has it. A caret has nothing to mark.
pub fn toggle_mark(tr: &mut Transaction, mark: Mark) -> Result<bool, EditError> {
    let selection = tr.selection();
    let (from, to) = match &selection {
        Selection::Block(blocks) => (blocks.from(), blocks.end(tr.doc())?),
        _ if selection.empty() => return Ok(false),
        _ => (selection.from(), selection.to()),
    };
    if tr.doc().text_between(from, to, "").is_empty() {
        return Ok(false);
    }
    if mark_active(tr.doc(), from, to, mark) {
        tr.remove_mark(from, to, mark)?;
    } else {
        tr.add_mark(from, to, mark)?;
    }
    tr.set_selection(selection);
    log::debug!("toggled {} on {from}..{to}", mark.name());
    Ok(true)
}

/// Removes the character, reference or whole citation before the caret.
pub fn delete_char_backward(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = cursor(tr).filter(|r| r.parent().has_inline_content()) else {
        return Ok(false);
    };
    let Some(before) = rpos.node_before() else {
        return Ok(false);
    };
    let pos = rpos.pos();
    let size = if before.kind() == NodeKind::Citation {
        before.node_size()
    } else {
        1
    };
    tr.delete(pos - size, pos)?;
    Ok(true)
}

/// Removes the character, reference or whole citation after the caret.
pub fn delete_char_forward(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = cursor(tr).filter(|r| r.parent().has_inline_content()) else {
        return Ok(false);
    };
    let Some(after) = rpos.node_after() else {
        return Ok(false);
    };
    let pos = rpos.pos();
    let size = if after.kind() == NodeKind::Citation {
        after.node_size()
    } else {
        1
    };
    tr.delete(pos, pos + size)?;
    Ok(true)
}

/// Typing `[` in a header opens a citation seeded with `trigger`.
pub fn citation_input_rule(tr: &mut Transaction, trigger: &str) -> Result<bool, EditError> {
    let Some(rpos) = cursor(tr).filter(|r| r.parent().is_textblock()) else {
        return Ok(false);
    };
    let pos = rpos.pos();
    let seed = if trigger.is_empty() {
        Vec::new()
    } else {
        vec![Node::text_node(trigger)]
    };
    tr.insert(pos, vec![Node::citation(seed)])?;
    tr.set_selection(Selection::cursor(pos + 1 + trigger.chars().count()));
    Ok(true)
}

/// Typing a space after a leading `>` turns a plain block into an open
/// collapsible with the rest of the header as its summary.
pub fn collapsible_input_rule(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    let block = header_block(&rpos);
    if rpos.parent_offset() != 1
        || rpos.parent().kind() != NodeKind::Paragraph
        || block.node.block_kind().is_some()
        || !rpos.parent().text_content().starts_with('>')
    {
        return Ok(false);
    }
    let pos = rpos.pos();
    tr.delete(pos - 1, pos)?;
    tr.set_node_attribute(block.pos, "type", Some(BlockKind::Collapsible))?;
    tr.set_node_attribute(block.pos, "collapsed", false)?;
    if block.node.child_count() == 1 {
        tr.insert(block.end() - 2, vec![empty_block()])?;
    }
    tr.set_selection(Selection::cursor(block.pos + 2));
    Ok(true)
}
