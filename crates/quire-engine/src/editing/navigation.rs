//! Pure lookups of neighbouring blocks.
//!
//! Every function takes the position right before a block (as found by
//! [`enclosing_block`]) and answers with another block and its position.

use crate::model::Node;

/// A block and the position right before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRef {
    pub pos: usize,
    pub node: Node,
}

impl BlockRef {
    pub fn end(&self) -> usize {
        self.pos + self.node.node_size()
    }
}

/// The block starting at `pos`, or the innermost block containing it.
pub fn enclosing_block(doc: &Node, pos: usize) -> Option<BlockRef> {
    let rpos = doc.resolve(pos).ok()?;
    if let Some(node) = rpos.node_after().filter(Node::is_block) {
        return Some(BlockRef { pos, node });
    }
    (1..=rpos.depth())
        .rev()
        .find(|&d| rpos.node(d).is_block())
        .map(|d| BlockRef {
            pos: rpos.before(d),
            node: rpos.node(d).clone(),
        })
}

/// The block the block at `pos` is nested in.
pub fn parent_block(doc: &Node, pos: usize) -> Option<BlockRef> {
    let rpos = doc.resolve(pos).ok()?;
    let depth = rpos.depth();
    if depth == 0 {
        return None;
    }
    Some(BlockRef {
        pos: rpos.before(depth),
        node: rpos.node(depth).clone(),
    })
}

pub fn previous_sibling(doc: &Node, pos: usize) -> Option<BlockRef> {
    let rpos = doc.resolve(pos).ok()?;
    let parent = rpos.parent();
    let index = rpos.index(rpos.depth());
    // A block's child 0 is its header, never a sibling.
    let first = usize::from(parent.is_block());
    if index <= first {
        return None;
    }
    let node = parent.child(index - 1).clone();
    Some(BlockRef {
        pos: pos - node.node_size(),
        node,
    })
}

pub fn next_sibling(doc: &Node, pos: usize) -> Option<BlockRef> {
    let rpos = doc.resolve(pos).ok()?;
    let parent = rpos.parent();
    let index = rpos.index(rpos.depth());
    let current = parent.maybe_child(index)?;
    let node = parent.maybe_child(index + 1)?.clone();
    Some(BlockRef {
        pos: pos + current.node_size(),
        node,
    })
}

/// The first nested block, unless the block is folded.
pub fn first_child_block(block: &BlockRef) -> Option<BlockRef> {
    if block.node.is_folded() {
        return None;
    }
    let header = block.node.first_child()?;
    let node = block.node.maybe_child(1)?.clone();
    Some(BlockRef {
        pos: block.pos + 1 + header.node_size(),
        node,
    })
}

/// The next sibling of the block at `pos` or of its nearest ancestor
/// that has one.
pub fn following_block(doc: &Node, pos: usize) -> Option<BlockRef> {
    let mut pos = pos;
    loop {
        if let Some(next) = next_sibling(doc, pos) {
            return Some(next);
        }
        pos = parent_block(doc, pos)?.pos;
    }
}

/// The last block shown inside `block`, following last children down
/// until a folded or childless block.
pub fn last_visible_descendant(block: BlockRef) -> BlockRef {
    let mut block = block;
    while !block.node.is_folded() && block.node.child_count() > 1 {
        let Some(last) = block.node.last_child().cloned() else {
            break;
        };
        block = BlockRef {
            pos: block.end() - 1 - last.node_size(),
            node: last,
        };
    }
    block
}

/// Blocks touched by `from..to`, without descending into the ones taken.
/// Blocks starting before the block around `from` only contribute their
/// descendants.
pub fn top_level_nodes(doc: &Node, from: usize, to: usize) -> Vec<BlockRef> {
    let Some(first) = enclosing_block(doc, from) else {
        return Vec::new();
    };
    let mut blocks = Vec::new();
    doc.nodes_between(first.pos, to.max(first.pos + 1), &mut |node, pos, _, _| {
        if !node.is_block() {
            return false;
        }
        if pos >= first.pos {
            blocks.push(BlockRef {
                pos,
                node: node.clone(),
            });
            return false;
        }
        true
    });
    blocks
}
