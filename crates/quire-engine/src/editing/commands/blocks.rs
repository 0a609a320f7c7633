//! Indenting, splitting, joining and deleting across blocks.

use crate::citation;
use crate::editing::navigation::{self, BlockRef};
use crate::editing::{EditError, Selection};
use crate::model::{Fragment, Node, Slice};
use crate::transform::{Assoc, Transaction};

use super::collapsible::{
    split_collapsible_block, split_open_collapsible, unset_partially_selected_collapsible_blocks,
};
use super::{header_block, header_cursor, textblock_depth, textblock_starts};

/// The covered blocks that share a parent with the first one.
pub(crate) fn selected_run(tr: &Transaction) -> Vec<BlockRef> {
    let doc = tr.doc();
    let selection = tr.selection();
    let to = match &selection {
        Selection::Block(block) => match block.end(doc) {
            Ok(end) => end,
            Err(_) => return Vec::new(),
        },
        other => other.to(),
    };
    let blocks = navigation::top_level_nodes(doc, selection.from(), to);
    let parent_start = |block: &BlockRef| doc.resolve(block.pos).ok().map(|r| r.start(r.depth()));
    let Some(first) = blocks.first().map(parent_start) else {
        return Vec::new();
    };
    blocks
        .into_iter()
        .take_while(|block| parent_start(block) == first)
        .collect()
}

/// Moves the selected blocks to the end of the previous sibling.
pub fn indent(tr: &mut Transaction) -> Result<bool, EditError> {
    let run = selected_run(tr);
    let (Some(first), Some(last)) = (run.first(), run.last()) else {
        return Ok(false);
    };
    let (start, end) = (first.pos, last.end());
    if navigation::previous_sibling(tr.doc(), start).is_none() {
        return Ok(false);
    }
    tr.sink_range(start, end)?;
    log::debug!("indent: {} block(s) at {start}", run.len());
    Ok(true)
}

/// Moves the selected blocks out of their parent, right behind it.
pub fn unindent(tr: &mut Transaction) -> Result<bool, EditError> {
    let run = selected_run(tr);
    let (Some(first), Some(last)) = (run.first(), run.last()) else {
        return Ok(false);
    };
    unindent_run(tr, first.pos, last.end())
}

/// Lifts the siblings in `start..end` one level. Siblings that follow the
/// run become children of its last block, so document order is kept.
pub(crate) fn unindent_run(tr: &mut Transaction, start: usize, end: usize) -> Result<bool, EditError> {
    let rstart = tr.doc().resolve(start)?;
    let depth = rstart.depth();
    if depth == 0 || !rstart.parent().is_block() {
        return Ok(false);
    }
    let parent_end = rstart.end(depth);
    if end < parent_end {
        tr.sink_range(end, parent_end)?;
    }
    tr.lift_range(start, parent_end)?;
    log::debug!("unindent: {start}..{end}");
    Ok(true)
}

/// Splits the block around the caret in two. The text after the caret and
/// the nested blocks go to the new block.
pub fn split_block(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    let block = header_block(&rpos);
    if block.node.is_collapsible() {
        return if block.node.is_collapsed() {
            split_collapsible_block(tr)
        } else {
            split_open_collapsible(tr)
        };
    }
    let from = rpos.pos();
    let header = rpos.parent().copy(Fragment::empty());
    let slice = Slice::new(
        Fragment::from_vec(vec![
            block.node.copy(Fragment::from_node(header)),
            block.node.copy(Fragment::from_node(Node::paragraph(vec![]))),
        ]),
        2,
        2,
    );
    let size = slice.size();
    tr.replace(from, from, slice)?;
    tr.set_selection(Selection::cursor(from + size));
    log::debug!("split block at {from}");
    Ok(true)
}

/// Merges the header at the caret into the textblock shown before it.
pub fn join_backward(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    if rpos.parent_offset() != 0 {
        return Ok(false);
    }
    let block = header_block(&rpos);
    let doc = tr.doc();
    let target = match navigation::previous_sibling(doc, block.pos) {
        Some(previous) => navigation::last_visible_descendant(previous),
        None => match navigation::parent_block(doc, block.pos) {
            Some(parent) => parent,
            None => return Ok(false),
        },
    };
    let join_at = header_end(&target);
    tr.join_textblocks(join_at, rpos.pos())?;
    tr.set_selection(Selection::cursor(join_at));
    log::debug!("join backward into {}", target.pos);
    Ok(true)
}

/// Merges the textblock shown after the caret into the caret's header.
pub fn join_forward(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = header_cursor(tr) else {
        return Ok(false);
    };
    if rpos.parent_offset() != rpos.parent().content_size() {
        return Ok(false);
    }
    let block = header_block(&rpos);
    let next = navigation::first_child_block(&block)
        .or_else(|| navigation::following_block(tr.doc(), block.pos));
    let Some(next) = next else {
        return Ok(false);
    };
    let pos = rpos.pos();
    tr.join_textblocks(pos, next.pos + 2)?;
    tr.set_selection(Selection::cursor(pos));
    log::debug!("join forward from {}", next.pos);
    Ok(true)
}

/// End of the content of a block's header.
fn header_end(block: &BlockRef) -> usize {
    block.pos + block.node.child(0).node_size()
}

/// Removes the selected content. Across blocks, the blocks starting inside
/// the range are dissolved into the first header and their nested blocks
/// stay where they were.
pub fn delete_selection(tr: &mut Transaction) -> Result<bool, EditError> {
    let selection = tr.selection();
    if selection.empty() {
        return Ok(false);
    }
    match selection {
        Selection::Block(block) => {
            block.replace(tr, Slice::empty())?;
            Ok(true)
        }
        Selection::Node(node) => {
            tr.delete(node.from, node.to)?;
            let selection = Selection::near(tr.doc(), node.from, Assoc::Before);
            tr.set_selection(selection);
            Ok(true)
        }
        Selection::Text(_) => delete_text_range(tr, selection.from(), selection.to()),
    }
}

fn delete_text_range(tr: &mut Transaction, from: usize, to: usize) -> Result<bool, EditError> {
    let doc = tr.doc();
    let rfrom = doc.resolve(from)?;
    let rto = doc.resolve(to)?;
    if rfrom.depth() == rto.depth() && rfrom.start(rfrom.depth()) == rto.start(rto.depth()) {
        tr.delete(from, to)?;
        tr.set_selection(Selection::cursor(from));
        return Ok(true);
    }
    let (Some(from_depth), Some(to_depth)) = (textblock_depth(&rfrom), textblock_depth(&rto)) else {
        return Ok(false);
    };
    // An end inside a citation takes the whole citation
    let from = if rfrom.depth() > from_depth {
        rfrom.before(from_depth + 1)
    } else {
        from
    };
    let to = if rto.depth() > to_depth {
        rto.after(to_depth + 1)
    } else {
        to
    };
    if rfrom.start(from_depth) == rto.start(to_depth) {
        tr.delete(from, to)?;
        tr.set_selection(Selection::cursor(from));
        log::debug!("deleted {from}..{to} across an inline boundary");
        return Ok(true);
    }
    let first_end = rfrom.end(from_depth);
    let last_start = rto.start(to_depth);
    let joins = textblock_starts(doc)
        .into_iter()
        .filter(|&start| start > first_end && start <= last_start)
        .count();

    tr.delete(last_start, to)?;
    tr.delete(from, first_end)?;
    for i in 0..joins {
        let Some(next) = textblock_starts(tr.doc()).into_iter().find(|&s| s > from) else {
            break;
        };
        if i + 1 < joins {
            let size = tr
                .doc()
                .node_at(next - 1)
                .map_or(0, |textblock| textblock.content_size());
            tr.delete(next, next + size)?;
        }
        tr.join_textblocks(from, next)?;
    }
    tr.set_selection(Selection::cursor(from));
    log::debug!("deleted {from}..{to} across {joins} block boundaries");
    Ok(true)
}

/// The Delete key: removes the selection, or pulls the next textblock in.
pub fn delete_forward(tr: &mut Transaction) -> Result<bool, EditError> {
    if !tr.selection().empty() {
        unset_partially_selected_collapsible_blocks(tr)?;
        return delete_selection(tr);
    }
    join_forward(tr)
}

/// The Enter key in text mode.
pub fn enter(tr: &mut Transaction) -> Result<bool, EditError> {
    if citation::enter_guard(tr)? {
        return Ok(true);
    }
    let selection = tr.selection();
    if selection.is_text() && !selection.empty() {
        unset_partially_selected_collapsible_blocks(tr)?;
        delete_selection(tr)?;
    }
    split_block(tr)
}
