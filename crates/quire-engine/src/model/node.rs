use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::json::NodeRepr;
use super::{
    AttrValue, Attrs, BlockKind, Fragment, Mark, ModelError, NodeKind, ResolvedPos, Slice,
    normalize_marks, replace,
};

/// An immutable document node.
///
/// Nodes are cheap to clone (reference counted) and never mutated in place:
/// every edit builds a new root that shares untouched subtrees with the old
/// one. Equality is structural.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "NodeRepr", try_from = "NodeRepr")]
pub struct Node(Arc<NodeData>);

#[derive(PartialEq, Eq)]
struct NodeData {
    kind: NodeKind,
    attrs: Attrs,
    content: Fragment,
    marks: Vec<Mark>,
    text: String,
    size: usize,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Node {}

impl Node {
    /// Creates a node without checking its content against the schema.
    /// Attributes are completed with the kind's defaults.
    pub fn new(kind: NodeKind, attrs: &Attrs, content: Fragment) -> Self {
        let attrs = kind.compute_attrs(attrs);
        let size = if kind.is_leaf() {
            1
        } else {
            content.size() + 2
        };
        Self(Arc::new(NodeData {
            kind,
            attrs,
            content,
            marks: Vec::new(),
            text: String::new(),
            size,
        }))
    }

    /// Like [`Node::new`] but refuses content the kind does not accept.
    pub fn checked(kind: NodeKind, attrs: &Attrs, content: Fragment) -> Result<Self, ModelError> {
        if kind == NodeKind::Text || !kind.valid_content(content.iter()) {
            return Err(ModelError::InvalidContent { kind });
        }
        Ok(Self::new(kind, attrs, content))
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        Self::marked_text(text, Vec::new())
    }

    pub fn marked_text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        let text = text.into();
        let size = text.chars().count();
        Self(Arc::new(NodeData {
            kind: NodeKind::Text,
            attrs: Attrs::new(),
            content: Fragment::empty(),
            marks: normalize_marks(marks),
            text,
            size,
        }))
    }

    pub fn doc(blocks: Vec<Node>) -> Self {
        Self::new(NodeKind::Doc, &Attrs::new(), Fragment::from_vec(blocks))
    }

    /// A plain block with a header and nested child blocks.
    pub fn block(header: Node, children: Vec<Node>) -> Self {
        Self::block_with(None, false, header, children)
    }

    pub fn block_with(
        kind: Option<BlockKind>,
        collapsed: bool,
        header: Node,
        children: Vec<Node>,
    ) -> Self {
        let attrs = Attrs::new()
            .with("type", AttrValue::from(kind))
            .with("collapsed", collapsed);
        let mut content = Vec::with_capacity(children.len() + 1);
        content.push(header);
        content.extend(children);
        Self::new(NodeKind::Block, &attrs, Fragment::from_vec(content))
    }

    pub fn paragraph(inline: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph, &Attrs::new(), Fragment::from_vec(inline))
    }

    pub fn heading(level: i64, inline: Vec<Node>) -> Self {
        Self::new(
            NodeKind::Heading,
            &Attrs::new().with("level", level),
            Fragment::from_vec(inline),
        )
    }

    pub fn citation(content: Vec<Node>) -> Self {
        Self::new(NodeKind::Citation, &Attrs::new(), Fragment::from_vec(content))
    }

    pub fn reference(id: &str, label: &str) -> Self {
        Self::new(
            NodeKind::Reference,
            &Attrs::new().with("id", id).with("label", label),
            Fragment::empty(),
        )
    }

    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.0.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.0.attrs.get(key)
    }

    pub fn content(&self) -> &Fragment {
        &self.0.content
    }

    pub fn marks(&self) -> &[Mark] {
        &self.0.marks
    }

    /// Text of a text node; empty for everything else.
    pub fn text(&self) -> &str {
        &self.0.text
    }

    /// Width of this node in the position space of its parent.
    pub fn node_size(&self) -> usize {
        self.0.size
    }

    pub fn content_size(&self) -> usize {
        self.0.content.size()
    }

    pub fn child_count(&self) -> usize {
        self.0.content.child_count()
    }

    /// Child at `index`. Callers index from positions they just resolved.
    pub fn child(&self, index: usize) -> &Node {
        self.0.content.child(index)
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.0.content.maybe_child(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.0.content.first_child()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.0.content.last_child()
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.0.content.iter()
    }

    pub fn is_text(&self) -> bool {
        self.0.kind == NodeKind::Text
    }

    pub fn is_leaf(&self) -> bool {
        self.0.kind.is_leaf()
    }

    pub fn is_atom(&self) -> bool {
        self.0.kind.is_atom()
    }

    pub fn is_textblock(&self) -> bool {
        self.0.kind.is_textblock()
    }

    pub fn is_inline(&self) -> bool {
        self.0.kind.is_inline()
    }

    pub fn is_block(&self) -> bool {
        self.0.kind == NodeKind::Block
    }

    /// Nodes whose children are inline: textblocks and citations.
    pub fn has_inline_content(&self) -> bool {
        self.is_textblock() || self.0.kind == NodeKind::Citation
    }

    /// Value of the `type` attribute of a block.
    pub fn block_kind(&self) -> Option<BlockKind> {
        if !self.is_block() {
            return None;
        }
        self.attr("type")
            .and_then(AttrValue::as_str)
            .and_then(BlockKind::parse)
    }

    pub fn is_collapsible(&self) -> bool {
        self.block_kind() == Some(BlockKind::Collapsible)
    }

    pub fn is_collapsed(&self) -> bool {
        self.attr("collapsed")
            .and_then(AttrValue::as_bool)
            .unwrap_or(false)
    }

    /// A collapsible block whose nested blocks are hidden.
    pub fn is_folded(&self) -> bool {
        self.is_collapsible() && self.is_collapsed()
    }

    /// Same kind, attributes and marks.
    pub fn same_markup(&self, other: &Node) -> bool {
        self.0.kind == other.0.kind && self.0.attrs == other.0.attrs && self.0.marks == other.0.marks
    }

    /// A copy with different content, same kind, attrs and marks.
    pub fn copy(&self, content: Fragment) -> Node {
        if self.is_text() {
            return self.clone();
        }
        let size = if self.is_leaf() {
            1
        } else {
            content.size() + 2
        };
        Node(Arc::new(NodeData {
            kind: self.0.kind,
            attrs: self.0.attrs.clone(),
            content,
            marks: self.0.marks.clone(),
            text: String::new(),
            size,
        }))
    }

    pub fn with_attrs(&self, attrs: &Attrs) -> Node {
        if self.is_text() {
            return self.clone();
        }
        Node::new(self.0.kind, attrs, self.0.content.clone())
    }

    pub fn with_attr(&self, key: &str, value: impl Into<AttrValue>) -> Node {
        self.with_attrs(&self.0.attrs.clone().with(key, value))
    }

    /// A text node with the same marks and new text.
    pub fn with_text(&self, text: impl Into<String>) -> Node {
        Node::marked_text(text, self.0.marks.clone())
    }

    pub fn with_marks(&self, marks: Vec<Mark>) -> Node {
        if self.is_text() {
            Node::marked_text(self.0.text.clone(), marks)
        } else {
            self.clone()
        }
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        if self.is_text() {
            return self.0.text.clone();
        }
        self.text_between(0, self.content_size(), "")
    }

    pub fn text_between(&self, from: usize, to: usize, block_separator: &str) -> String {
        self.0.content.text_between(from, to, block_separator)
    }

    /// Part of this node between two content offsets. For text the offsets
    /// count characters.
    pub fn cut(&self, from: usize, to: usize) -> Node {
        if self.is_text() {
            if from == 0 && to == self.0.size {
                return self.clone();
            }
            return self.with_text(char_slice(&self.0.text, from, to));
        }
        if from == 0 && to == self.content_size() {
            return self.clone();
        }
        self.copy(self.0.content.cut(from, to))
    }

    /// Content between two positions, with open depths where the range cuts
    /// through nodes.
    pub fn slice(&self, from: usize, to: usize) -> Result<Slice, ModelError> {
        if from == to {
            return Ok(Slice::empty());
        }
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        let depth = rfrom.shared_depth(to);
        let start = rfrom.start(depth);
        let node = rfrom.node(depth);
        let content = node.content().cut(from - start, to - start);
        Ok(Slice::new(content, rfrom.depth() - depth, rto.depth() - depth))
    }

    /// Replaces `from..to` with `slice`, re-closing the cut structure.
    pub fn replace(&self, from: usize, to: usize, slice: &Slice) -> Result<Node, ModelError> {
        if to < from {
            return Err(ModelError::Replace(format!("range end {to} before start {from}")));
        }
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        replace::replace(&rfrom, &rto, slice)
    }

    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, ModelError> {
        ResolvedPos::resolve(self, pos)
    }

    /// The node starting exactly at `pos`, or the text node containing it.
    pub fn node_at(&self, pos: usize) -> Option<Node> {
        let mut node = self;
        let mut pos = pos;
        loop {
            let (index, offset) = node.content().find_index(pos).ok()?;
            let child = node.maybe_child(index)?;
            if offset == pos || child.is_text() {
                return Some(child.clone());
            }
            pos -= offset + 1;
            node = child;
        }
    }

    /// Calls `f(node, pos, parent, index)` for every descendant overlapping
    /// `from..to`. Returning false skips the node's children.
    pub fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F)
    where
        F: FnMut(&Node, usize, &Node, usize) -> bool,
    {
        self.0.content.nodes_between(from, to, 0, self, f);
    }

    pub fn descendants<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, usize, &Node, usize) -> bool,
    {
        self.nodes_between(0, self.content_size(), f);
    }
}

/// Substring by character offsets.
pub(crate) fn char_slice(text: &str, from: usize, to: usize) -> &str {
    let mut indices = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
    let start = indices.nth(from).unwrap_or(text.len());
    let end = if to > from {
        indices.nth(to - from - 1).unwrap_or(text.len())
    } else {
        start
    };
    &text[start..end]
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_text() {
            for mark in self.marks() {
                write!(f, "{}(", mark.name())?;
            }
            write!(f, "{:?}", self.text())?;
            for _ in self.marks() {
                f.write_str(")")?;
            }
            return Ok(());
        }
        f.write_str(self.kind().name())?;
        let defaults = self.kind().default_attrs();
        let changed: Vec<_> = self
            .attrs()
            .iter()
            .filter(|(k, v)| defaults.get(k) != Some(v))
            .collect();
        if !changed.is_empty() {
            f.write_str("[")?;
            for (i, (key, value)) in changed.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                match value {
                    AttrValue::Null => write!(f, "{key}=null")?,
                    AttrValue::Bool(b) => write!(f, "{key}={b}")?,
                    AttrValue::Int(n) => write!(f, "{key}={n}")?,
                    AttrValue::Str(s) => write!(f, "{key}={s:?}")?,
                }
            }
            f.write_str("]")?;
        }
        if self.child_count() > 0 {
            f.write_str("(")?;
            for (i, child) in self.children().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{child:?}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(text: &str) -> Node {
        Node::paragraph(vec![Node::text_node(text)])
    }

    fn sample() -> Node {
        // 0 block 1 p 2 "One" 5 /p 6 block 7 p 8 "Two" 11 /p 12 /block 13 /block 14
        Node::doc(vec![Node::block(p("One"), vec![Node::block(p("Two"), vec![])])])
    }

    #[test]
    fn sizes_count_tokens() {
        let doc = sample();
        assert_eq!(doc.content_size(), 14);
        assert_eq!(Node::text_node("héllo").node_size(), 5);
        assert_eq!(Node::reference("r", "R").node_size(), 1);
    }

    #[test]
    fn node_at_finds_nodes_and_text() {
        let doc = sample();
        assert_eq!(doc.node_at(0).unwrap().kind(), NodeKind::Block);
        assert_eq!(doc.node_at(1).unwrap().kind(), NodeKind::Paragraph);
        assert_eq!(doc.node_at(3).unwrap().text(), "One");
        assert_eq!(doc.node_at(6).unwrap().kind(), NodeKind::Block);
        assert!(doc.node_at(14).is_none());
    }

    #[test]
    fn text_content_concatenates() {
        assert_eq!(sample().text_content(), "OneTwo");
        assert_eq!(sample().text_between(0, 14, "\n"), "One\nTwo");
    }

    #[test]
    fn cut_text_uses_characters() {
        let text = Node::text_node("añb");
        assert_eq!(text.cut(1, 2).text(), "ñ");
        assert_eq!(text.cut(2, 3).text(), "b");
    }

    #[test]
    fn slice_records_open_depths() {
        let doc = sample();
        let slice = doc.slice(3, 9).unwrap();
        assert_eq!(slice.open_start(), 1);
        assert_eq!(slice.open_end(), 2);
        assert_eq!(slice.size(), 6);
    }

    #[test]
    fn structural_equality() {
        assert_eq!(sample(), sample());
        assert_ne!(sample(), Node::doc(vec![Node::block(p("One"), vec![])]));
    }

    #[test]
    fn checked_rejects_invalid_content() {
        let result = Node::checked(
            NodeKind::Block,
            &Attrs::new(),
            Fragment::from_vec(vec![Node::text_node("loose")]),
        );
        assert_eq!(
            result,
            Err(ModelError::InvalidContent {
                kind: NodeKind::Block
            })
        );
    }

    #[test]
    fn debug_is_compact() {
        let block = Node::block_with(Some(BlockKind::Collapsible), true, p("H"), vec![]);
        assert_eq!(
            format!("{block:?}"),
            r#"block[collapsed=true, type="collapsible"](paragraph("H"))"#
        );
    }

    #[test]
    fn block_accessors() {
        let block = Node::block_with(Some(BlockKind::Collapsible), true, p("H"), vec![]);
        assert!(block.is_collapsible());
        assert!(block.is_folded());
        assert_eq!(block.block_kind(), Some(BlockKind::Collapsible));
        assert_eq!(p("x").block_kind(), None);
    }

    #[test]
    fn char_slice_clamps() {
        assert_eq!(char_slice("abc", 1, 10), "bc");
        assert_eq!(char_slice("abc", 3, 3), "");
    }
}
