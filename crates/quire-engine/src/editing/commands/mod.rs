/*!
 * # Commands
 *
 * User-facing edits built from transaction steps and block lookups.
 *
 * Every command has the shape `fn(&mut Transaction) -> Result<bool, EditError>`:
 *
 * - `Ok(false)`: the command does not apply at the current selection; the
 *   transaction is left exactly as it was
 * - `Ok(true)`: steps were appended and the selection updated
 * - `Err(_)`: a step was refused, which points at a bug in the command
 *
 * Commands that need an argument (`toggle_fold`, `set_block_kind`,
 * `toggle_mark`) take it after the transaction.
 *
 * ## Module Structure
 *
 * - **`blocks`**: indent, unindent, split, join, delete, enter
 * - **`collapsible`**: folding, wrapping and unwrapping collapsible blocks
 * - **`kinds`**: list and collapsible block types
 * - **`backspace`**: the backspace ladder
 * - **`text`**: marks, character deletion and input rules
 * - **`browse`**: block-browse navigation and block moves
 */

pub mod backspace;
pub mod blocks;
pub mod browse;
pub mod collapsible;
pub mod kinds;
pub mod text;

pub use backspace::backspace;
pub use blocks::{
    delete_forward, delete_selection, enter, indent, join_backward, join_forward, split_block,
    unindent,
};
pub use browse::{
    browse_delete, browse_down, browse_expand_down, browse_expand_up, browse_indent, browse_left,
    browse_right, browse_unindent, browse_up, enter_block_browse, exit_block_browse,
    move_blocks_down, move_blocks_up, select_all_blocks,
};
pub use collapsible::{
    fill_empty_collapsible, split_collapsible_block, toggle_collapsible, toggle_fold,
    unset_partially_selected_collapsible_blocks, unwrap_collapsible, wrap_in_collapsible,
};
pub use kinds::{set_block_kind, toggle_bullet_list, toggle_ordered_list};
pub use text::{delete_char_backward, delete_char_forward, toggle_mark};

use crate::model::{Node, ResolvedPos};
use crate::transform::Transaction;

use super::EditError;
use super::navigation::BlockRef;

/// A command that needs nothing but the transaction.
pub type Command = fn(&mut Transaction) -> Result<bool, EditError>;

/// Runs `commands` in order until one applies.
pub fn first_of(tr: &mut Transaction, commands: &[Command]) -> Result<bool, EditError> {
    for command in commands {
        if command(tr)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The caret of an empty text selection, resolved.
pub(crate) fn cursor(tr: &Transaction) -> Option<ResolvedPos> {
    let pos = tr.selection().cursor_pos()?;
    tr.doc().resolve(pos).ok()
}

/// The caret, when it sits directly inside a block's header.
pub(crate) fn header_cursor(tr: &Transaction) -> Option<ResolvedPos> {
    cursor(tr).filter(|rpos| rpos.parent().is_textblock() && rpos.depth() >= 2)
}

/// The block a header position belongs to.
pub(crate) fn header_block(rpos: &ResolvedPos) -> BlockRef {
    let depth = rpos.depth() - 1;
    BlockRef {
        pos: rpos.before(depth),
        node: rpos.node(depth).clone(),
    }
}

/// Depth of the innermost textblock around `rpos`.
pub(crate) fn textblock_depth(rpos: &ResolvedPos) -> Option<usize> {
    (1..=rpos.depth()).rev().find(|&d| rpos.node(d).is_textblock())
}

/// Start of the content of every textblock, in document order.
pub(crate) fn textblock_starts(doc: &Node) -> Vec<usize> {
    let mut starts = Vec::new();
    doc.descendants(&mut |node, pos, _, _| {
        if node.is_textblock() {
            starts.push(pos + 1);
            return false;
        }
        node.is_block()
    });
    starts
}

/// A block holding nothing but an empty header.
pub(crate) fn is_empty_block(node: &Node) -> bool {
    node.is_block() && node.child_count() == 1 && node.content_size() == 2
}

pub(crate) fn empty_block() -> Node {
    Node::block(Node::paragraph(vec![]), vec![])
}

/// Shared fixtures for command tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use crate::editing::Selection;
    use crate::model::{BlockKind, Node};
    use crate::transform::Transaction;

    pub fn p(text: &str) -> Node {
        if text.is_empty() {
            return Node::paragraph(vec![]);
        }
        Node::paragraph(vec![Node::text_node(text)])
    }

    pub fn b(text: &str, children: Vec<Node>) -> Node {
        Node::block(p(text), children)
    }

    pub fn typed(kind: BlockKind, collapsed: bool, text: &str, children: Vec<Node>) -> Node {
        Node::block_with(Some(kind), collapsed, p(text), children)
    }

    pub fn doc(blocks: Vec<Node>) -> Node {
        Node::doc(blocks)
    }

    pub fn at(doc: Node, pos: usize) -> Transaction {
        Transaction::new(doc, Selection::cursor(pos))
    }

    pub fn range(doc: Node, anchor: usize, head: usize) -> Transaction {
        Transaction::new(doc, Selection::text(anchor, head))
    }

    /// Header texts with their nesting, one line per block.
    pub fn outline(doc: &Node) -> Vec<String> {
        fn walk(node: &Node, depth: usize, out: &mut Vec<String>) {
            for child in node.children().filter(|c| c.is_block()) {
                let header = child.child(0).text_content();
                let kind = child.block_kind().map(|k| format!(" [{}]", k.as_str())).unwrap_or_default();
                out.push(format!("{}{header}{kind}", "  ".repeat(depth)));
                walk(child, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(doc, 0, &mut out);
        out
    }
}
