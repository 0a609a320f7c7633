use super::{ModelError, Node};

/// An ordered run of sibling nodes with its cached total size.
///
/// Fragments are normalized on construction: empty text nodes are dropped
/// and adjacent text nodes with equal marks are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    children: Vec<Node>,
    size: usize,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_vec(nodes: Vec<Node>) -> Self {
        let mut children = Vec::with_capacity(nodes.len());
        for node in nodes {
            push_joined(&mut children, node);
        }
        let size = children.iter().map(Node::node_size).sum();
        Self { children, size }
    }

    pub fn from_node(node: Node) -> Self {
        Self::from_vec(vec![node])
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, index: usize) -> &Node {
        &self.children[index]
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.children.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.children.iter()
    }

    pub fn to_vec(&self) -> Vec<Node> {
        self.children.clone()
    }

    /// Index of the child at `pos` and the offset where that child starts.
    /// A position on a boundary resolves to the child after it.
    pub fn find_index(&self, pos: usize) -> Result<(usize, usize), ModelError> {
        if pos == 0 {
            return Ok((0, 0));
        }
        if pos == self.size {
            return Ok((self.children.len(), pos));
        }
        if pos > self.size {
            return Err(ModelError::OutOfRange {
                pos,
                size: self.size,
            });
        }
        let mut cur = 0;
        for (i, child) in self.children.iter().enumerate() {
            let end = cur + child.node_size();
            if end >= pos {
                if end == pos {
                    return Ok((i + 1, end));
                }
                return Ok((i, cur));
            }
            cur = end;
        }
        Err(ModelError::OutOfRange {
            pos,
            size: self.size,
        })
    }

    /// Content between two offsets. Children cut by the range are cut too.
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to == self.size {
            return self.clone();
        }
        let mut result = Vec::new();
        if to > from {
            let mut pos = 0;
            for child in &self.children {
                if pos >= to {
                    break;
                }
                let end = pos + child.node_size();
                if end > from {
                    let child = if pos < from || end > to {
                        if child.is_text() {
                            child.cut(from.saturating_sub(pos), (to - pos).min(child.node_size()))
                        } else {
                            child.cut(
                                from.saturating_sub(pos + 1),
                                (to.saturating_sub(pos + 1)).min(child.content_size()),
                            )
                        }
                    } else {
                        child.clone()
                    };
                    result.push(child);
                }
                pos = end;
            }
        }
        Fragment::from_vec(result)
    }

    pub fn append(&self, other: &Fragment) -> Fragment {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut children = self.children.clone();
        for child in &other.children {
            push_joined(&mut children, child.clone());
        }
        let size = self.size + other.size;
        Fragment { children, size }
    }

    pub fn replace_child(&self, index: usize, node: Node) -> Fragment {
        let mut children = self.children.clone();
        children[index] = node;
        Fragment::from_vec(children)
    }

    pub fn add_to_start(&self, node: Node) -> Fragment {
        let mut children = Vec::with_capacity(self.children.len() + 1);
        children.push(node);
        children.extend(self.children.iter().cloned());
        Fragment::from_vec(children)
    }

    pub fn add_to_end(&self, node: Node) -> Fragment {
        let mut children = self.children.clone();
        children.push(node);
        Fragment::from_vec(children)
    }

    pub(crate) fn nodes_between<F>(
        &self,
        from: usize,
        to: usize,
        node_start: usize,
        parent: &Node,
        f: &mut F,
    ) where
        F: FnMut(&Node, usize, &Node, usize) -> bool,
    {
        let mut pos = 0;
        for (i, child) in self.children.iter().enumerate() {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, node_start + pos, parent, i) && child.content_size() > 0 {
                let start = pos + 1;
                child.content().nodes_between(
                    from.saturating_sub(start),
                    child.content_size().min(to.saturating_sub(start)),
                    node_start + start,
                    child,
                    f,
                );
            }
            pos = end;
        }
    }

    pub fn text_between(&self, from: usize, to: usize, block_separator: &str) -> String {
        let mut text = String::new();
        let mut first = true;
        self.collect_text(from, to, block_separator, &mut first, &mut text);
        text
    }

    fn collect_text(&self, from: usize, to: usize, separator: &str, first: &mut bool, out: &mut String) {
        let mut offset = 0;
        for child in &self.children {
            if offset >= to {
                break;
            }
            let end = offset + child.node_size();
            if end > from {
                if child.is_text() {
                    let start = from.saturating_sub(offset);
                    let stop = (to - offset).min(child.node_size());
                    out.push_str(super::node::char_slice(child.text(), start, stop));
                } else {
                    if child.is_textblock() && !separator.is_empty() {
                        if *first {
                            *first = false;
                        } else {
                            out.push_str(separator);
                        }
                    }
                    let start = offset + 1;
                    child.content().collect_text(
                        from.saturating_sub(start),
                        child.content_size().min(to.saturating_sub(start)),
                        separator,
                        first,
                        out,
                    );
                }
            }
            offset = end;
        }
    }
}

/// Pushes `node`, merging it into a preceding text node with equal marks.
pub(crate) fn push_joined(target: &mut Vec<Node>, node: Node) {
    if node.is_text() && node.text().is_empty() {
        return;
    }
    if let Some(last) = target.last_mut() {
        if node.is_text() && last.is_text() && last.same_markup(&node) {
            let joined = format!("{}{}", last.text(), node.text());
            *last = last.with_text(joined);
            return;
        }
    }
    target.push(node);
}

impl FromIterator<Node> for Fragment {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Fragment::from_vec(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mark;
    use pretty_assertions::assert_eq;

    #[test]
    fn adjacent_text_with_same_marks_merges() {
        let frag = Fragment::from_vec(vec![
            Node::text_node("ab"),
            Node::text_node("cd"),
            Node::marked_text("ef", vec![Mark::Bold]),
            Node::text_node(""),
        ]);
        assert_eq!(frag.child_count(), 2);
        assert_eq!(frag.child(0).text(), "abcd");
        assert_eq!(frag.size(), 6);
    }

    #[test]
    fn find_index_on_boundaries() {
        let frag = Fragment::from_vec(vec![
            Node::paragraph(vec![Node::text_node("ab")]),
            Node::paragraph(vec![]),
        ]);
        assert_eq!(frag.find_index(0).unwrap(), (0, 0));
        assert_eq!(frag.find_index(2).unwrap(), (0, 0));
        assert_eq!(frag.find_index(4).unwrap(), (1, 4));
        assert_eq!(frag.find_index(6).unwrap(), (2, 6));
        assert!(frag.find_index(7).is_err());
    }

    #[test]
    fn cut_through_text_and_nodes() {
        let frag = Fragment::from_vec(vec![
            Node::paragraph(vec![Node::text_node("abc")]),
            Node::paragraph(vec![Node::text_node("def")]),
        ]);
        let cut = frag.cut(2, 7);
        assert_eq!(
            cut,
            Fragment::from_vec(vec![
                Node::paragraph(vec![Node::text_node("bc")]),
                Node::paragraph(vec![Node::text_node("d")]),
            ])
        );
    }

    #[test]
    fn append_joins_text_at_the_seam() {
        let a = Fragment::from_node(Node::text_node("foo"));
        let b = Fragment::from_node(Node::text_node("bar"));
        let joined = a.append(&b);
        assert_eq!(joined.child_count(), 1);
        assert_eq!(joined.child(0).text(), "foobar");
    }
}
