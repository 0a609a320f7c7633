use super::{Fragment, ModelError, Node};

/// A piece of document cut out of its context.
///
/// `open_start`/`open_end` count how many levels of ancestors are cut open
/// at each edge, so that replacing can join the pieces back into the
/// surrounding structure instead of nesting whole copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slice {
    content: Fragment,
    open_start: usize,
    open_end: usize,
}

impl Slice {
    pub fn new(content: Fragment, open_start: usize, open_end: usize) -> Self {
        Self {
            content,
            open_start,
            open_end,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A closed slice holding whole nodes.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self::new(Fragment::from_vec(nodes), 0, 0)
    }

    /// The largest open slice the fragment allows: open as far as the first
    /// and last descendants are not leaves.
    pub fn max_open(content: Fragment) -> Self {
        let mut open_start = 0;
        let mut node = content.first_child().cloned();
        while let Some(n) = node.filter(|n| !n.is_leaf()) {
            open_start += 1;
            node = n.first_child().cloned();
        }
        let mut open_end = 0;
        let mut node = content.last_child().cloned();
        while let Some(n) = node.filter(|n| !n.is_leaf()) {
            open_end += 1;
            node = n.last_child().cloned();
        }
        Self::new(content, open_start, open_end)
    }

    pub fn content(&self) -> &Fragment {
        &self.content
    }

    pub fn open_start(&self) -> usize {
        self.open_start
    }

    pub fn open_end(&self) -> usize {
        self.open_end
    }

    /// Size this slice adds to a document when inserted.
    pub fn size(&self) -> usize {
        self.content.size() - self.open_start - self.open_end
    }

    /// Inserts `fragment` at `pos` (relative to the slice). Fails when a
    /// node lands in a parent that never accepts its kind.
    pub fn insert_at(&self, pos: usize, fragment: &Fragment) -> Option<Slice> {
        let content = insert_into(&self.content, pos + self.open_start, fragment, None)?;
        Some(Slice::new(content, self.open_start, self.open_end))
    }

    /// Removes the flat range `from..to` (relative to the slice).
    pub fn remove_between(&self, from: usize, to: usize) -> Result<Slice, ModelError> {
        let content = remove_range(&self.content, from + self.open_start, to + self.open_start)?;
        Ok(Slice::new(content, self.open_start, self.open_end))
    }
}

fn remove_range(content: &Fragment, from: usize, to: usize) -> Result<Fragment, ModelError> {
    let (index, offset) = content.find_index(from)?;
    let (index_to, offset_to) = content.find_index(to)?;
    let child = content.maybe_child(index);
    if offset == from || child.is_some_and(Node::is_text) {
        if offset_to != to && !content.child(index_to).is_text() {
            return Err(ModelError::NonFlatRange);
        }
        return Ok(content.cut(0, from).append(&content.cut(to, content.size())));
    }
    let Some(child) = child else {
        return Err(ModelError::NonFlatRange);
    };
    if index != index_to {
        return Err(ModelError::NonFlatRange);
    }
    let inner = remove_range(child.content(), from - offset - 1, to - offset - 1)?;
    Ok(content.replace_child(index, child.copy(inner)))
}

fn insert_into(
    content: &Fragment,
    dist: usize,
    insert: &Fragment,
    parent: Option<&Node>,
) -> Option<Fragment> {
    let (index, offset) = content.find_index(dist).ok()?;
    let child = content.maybe_child(index);
    if offset == dist || child.is_some_and(Node::is_text) {
        if let Some(parent) = parent {
            if !insert.iter().all(|n| parent.kind().allows(n.kind())) {
                return None;
            }
        }
        return Some(
            content
                .cut(0, dist)
                .append(insert)
                .append(&content.cut(dist, content.size())),
        );
    }
    let child = child?;
    let inner = insert_into(child.content(), dist - offset - 1, insert, Some(child))?;
    Some(content.replace_child(index, child.copy(inner)))
}
