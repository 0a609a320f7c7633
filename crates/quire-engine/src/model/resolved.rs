use super::{Mark, ModelError, Node};

/// A position together with the chain of ancestors it sits in.
///
/// Depth 0 is the root. `node(depth())` is the innermost node whose content
/// contains the position (the "parent"). A position inside a text node
/// resolves to that text node's parent with a non-zero `text_offset`.
///
/// Resolved positions borrow nothing: they hold cheap clones of the nodes
/// on their path and describe one snapshot of the tree only.
#[derive(Debug, Clone)]
pub struct ResolvedPos {
    pos: usize,
    path: Vec<PathEntry>,
    parent_offset: usize,
}

#[derive(Debug, Clone)]
struct PathEntry {
    node: Node,
    index: usize,
    /// Absolute position of the start of `node.child(index)`.
    offset: usize,
}

impl ResolvedPos {
    pub fn resolve(doc: &Node, pos: usize) -> Result<Self, ModelError> {
        if pos > doc.content_size() {
            return Err(ModelError::OutOfRange {
                pos,
                size: doc.content_size(),
            });
        }
        let mut path = Vec::new();
        let mut start = 0;
        let mut parent_offset = pos;
        let mut node = doc.clone();
        loop {
            let (index, offset) = node.content().find_index(parent_offset)?;
            let rem = parent_offset - offset;
            path.push(PathEntry {
                node: node.clone(),
                index,
                offset: start + offset,
            });
            if rem == 0 {
                break;
            }
            let child = node.child(index).clone();
            if child.is_text() {
                break;
            }
            parent_offset = rem - 1;
            start += offset + 1;
            node = child;
        }
        Ok(Self {
            pos,
            path,
            parent_offset,
        })
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    pub fn parent(&self) -> &Node {
        &self.path[self.depth()].node
    }

    pub fn doc(&self) -> &Node {
        &self.path[0].node
    }

    pub fn node(&self, depth: usize) -> &Node {
        &self.path[depth].node
    }

    pub fn index(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Index after the position at `depth`: past the child the position
    /// is inside of, unless it sits exactly on a boundary of the parent.
    pub fn index_after(&self, depth: usize) -> usize {
        let index = self.index(depth);
        if depth == self.depth() && self.text_offset() == 0 {
            index
        } else {
            index + 1
        }
    }

    /// Start of the content of the ancestor at `depth`.
    pub fn start(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.path[depth - 1].offset + 1
        }
    }

    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Position before the ancestor at `depth` (`depth >= 1`).
    pub fn before(&self, depth: usize) -> usize {
        if depth == self.depth() + 1 {
            self.pos
        } else {
            self.path[depth - 1].offset
        }
    }

    /// Position after the ancestor at `depth` (`depth >= 1`).
    pub fn after(&self, depth: usize) -> usize {
        if depth == self.depth() + 1 {
            self.pos
        } else {
            self.path[depth - 1].offset + self.path[depth].node.node_size()
        }
    }

    /// Offset into the text node the position points into, 0 otherwise.
    pub fn text_offset(&self) -> usize {
        self.pos - self.path[self.depth()].offset
    }

    pub fn node_after(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let child = parent.maybe_child(index)?;
        let d_off = self.text_offset();
        if d_off > 0 {
            Some(child.cut(d_off, child.node_size()))
        } else {
            Some(child.clone())
        }
    }

    pub fn node_before(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let d_off = self.text_offset();
        if d_off > 0 {
            return Some(parent.child(index).cut(0, d_off));
        }
        if index == 0 {
            None
        } else {
            parent.maybe_child(index - 1).cloned()
        }
    }

    /// Marks that text inserted here picks up: those of the text before the
    /// position, or after it at the start of the parent.
    pub fn marks(&self) -> Vec<Mark> {
        let parent = self.parent();
        let index = self.index(self.depth());
        if self.text_offset() > 0 {
            return parent.child(index).marks().to_vec();
        }
        index
            .checked_sub(1)
            .and_then(|i| parent.maybe_child(i))
            .or_else(|| parent.maybe_child(index))
            .map(|node| node.marks().to_vec())
            .unwrap_or_default()
    }

    /// Position of the child at `index` of the ancestor at `depth`.
    pub fn pos_at_index(&self, index: usize, depth: usize) -> usize {
        let node = self.node(depth);
        let mut pos = self.start(depth);
        for child in node.children().take(index) {
            pos += child.node_size();
        }
        pos
    }

    /// Deepest depth whose node contains both this position and `pos`.
    pub fn shared_depth(&self, pos: usize) -> usize {
        for depth in (1..=self.depth()).rev() {
            if self.start(depth) <= pos && self.end(depth) >= pos {
                return depth;
            }
        }
        0
    }

    /// The range of sibling nodes, at the deepest possible depth, that
    /// covers both positions.
    pub fn block_range(&self, other: &ResolvedPos) -> Option<NodeRange> {
        if other.pos < self.pos {
            return other.block_range(self);
        }
        let skip = usize::from(self.parent().has_inline_content() || self.pos == other.pos);
        let top = self.depth().checked_sub(skip)?;
        (0..=top)
            .rev()
            .find(|&d| other.pos <= self.end(d))
            .map(|depth| NodeRange {
                from: self.clone(),
                to: other.clone(),
                depth,
            })
    }
}

/// A flat run of siblings between two resolved positions at `depth`.
#[derive(Debug, Clone)]
pub struct NodeRange {
    pub from: ResolvedPos,
    pub to: ResolvedPos,
    pub depth: usize,
}

impl NodeRange {
    pub fn start(&self) -> usize {
        self.from.before(self.depth + 1)
    }

    pub fn end(&self) -> usize {
        self.to.after(self.depth + 1)
    }

    pub fn parent(&self) -> &Node {
        self.from.node(self.depth)
    }

    pub fn start_index(&self) -> usize {
        self.from.index(self.depth)
    }

    pub fn end_index(&self) -> usize {
        self.to.index_after(self.depth)
    }
}
