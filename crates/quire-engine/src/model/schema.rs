//! The closed set of node kinds, their attributes and content rules.
//!
//! ```text
//! doc        := block+
//! block      := (paragraph | heading) block*
//! paragraph  := inline*
//! heading    := inline*
//! citation   := (text | reference)*
//! inline     := text | citation | reference
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Node;

/// Every node in a document is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Doc,
    Block,
    Paragraph,
    Heading,
    Text,
    Citation,
    Reference,
}

/// One term of a content expression: `min..=max` children whose kind is in `kinds`.
#[derive(Debug, Clone, Copy)]
pub struct ContentTerm {
    pub kinds: &'static [NodeKind],
    pub min: usize,
    pub max: Option<usize>,
}

const INLINE: &[NodeKind] = &[NodeKind::Text, NodeKind::Citation, NodeKind::Reference];

const DOC_CONTENT: &[ContentTerm] = &[ContentTerm {
    kinds: &[NodeKind::Block],
    min: 1,
    max: None,
}];

const BLOCK_CONTENT: &[ContentTerm] = &[
    ContentTerm {
        kinds: &[NodeKind::Paragraph, NodeKind::Heading],
        min: 1,
        max: Some(1),
    },
    ContentTerm {
        kinds: &[NodeKind::Block],
        min: 0,
        max: None,
    },
];

const TEXTBLOCK_CONTENT: &[ContentTerm] = &[ContentTerm {
    kinds: INLINE,
    min: 0,
    max: None,
}];

const CITATION_CONTENT: &[ContentTerm] = &[ContentTerm {
    kinds: &[NodeKind::Text, NodeKind::Reference],
    min: 0,
    max: None,
}];

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Block => "block",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::Text => "text",
            NodeKind::Citation => "citation",
            NodeKind::Reference => "reference",
        }
    }

    pub fn content_expr(self) -> &'static [ContentTerm] {
        match self {
            NodeKind::Doc => DOC_CONTENT,
            NodeKind::Block => BLOCK_CONTENT,
            NodeKind::Paragraph | NodeKind::Heading => TEXTBLOCK_CONTENT,
            NodeKind::Citation => CITATION_CONTENT,
            NodeKind::Text | NodeKind::Reference => &[],
        }
    }

    pub fn is_inline(self) -> bool {
        INLINE.contains(&self)
    }

    /// Paragraphs and headings: nodes whose content is inline.
    pub fn is_textblock(self) -> bool {
        matches!(self, NodeKind::Paragraph | NodeKind::Heading)
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::Reference)
    }

    /// Leaves that are not text: the cursor never enters them.
    pub fn is_atom(self) -> bool {
        self == NodeKind::Reference
    }

    /// Whether `child` may appear anywhere in this kind's content.
    pub fn allows(self, child: NodeKind) -> bool {
        self.content_expr().iter().any(|t| t.kinds.contains(&child))
    }

    /// Joining content of one node onto another is possible when both
    /// accept the same children.
    pub fn compatible_content(self, other: NodeKind) -> bool {
        self == other || (self.is_textblock() && other.is_textblock())
    }

    /// Greedy match of `children` against the content expression.
    pub fn valid_content<'a>(self, children: impl IntoIterator<Item = &'a Node>) -> bool {
        let mut children = children.into_iter().peekable();
        for term in self.content_expr() {
            let mut count = 0;
            while term.max.is_none_or(|max| count < max) {
                match children.peek() {
                    Some(child) if term.kinds.contains(&child.kind()) => {
                        children.next();
                        count += 1;
                    }
                    _ => break,
                }
            }
            if count < term.min {
                return false;
            }
        }
        children.next().is_none()
    }

    /// Attribute defaults. Every node carries a value for each of its keys.
    pub fn default_attrs(self) -> Attrs {
        let mut attrs = Attrs::new();
        match self {
            NodeKind::Block => {
                attrs.set("type", AttrValue::Null);
                attrs.set("collapsed", AttrValue::Bool(false));
            }
            NodeKind::Heading => attrs.set("level", AttrValue::Int(1)),
            NodeKind::Reference => {
                attrs.set("id", AttrValue::Str(String::new()));
                attrs.set("label", AttrValue::Str(String::new()));
            }
            _ => {}
        }
        attrs
    }

    /// Defaults overlaid with the given values; unknown keys are dropped.
    pub fn compute_attrs(self, given: &Attrs) -> Attrs {
        let mut attrs = self.default_attrs();
        for (key, value) in given.iter() {
            if attrs.get(key).is_some() {
                attrs.set(key, value.clone());
            }
        }
        attrs
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of the block `type` attribute other than null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Collapsible,
    BulletList,
    OrderedList,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Collapsible => "collapsible",
            BlockKind::BulletList => "bulletList",
            BlockKind::OrderedList => "orderedList",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "collapsible" => Some(BlockKind::Collapsible),
            "bulletList" => Some(BlockKind::BulletList),
            "orderedList" => Some(BlockKind::OrderedList),
            _ => None,
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, BlockKind::BulletList | BlockKind::OrderedList)
    }
}

impl From<Option<BlockKind>> for AttrValue {
    fn from(kind: Option<BlockKind>) -> Self {
        match kind {
            Some(kind) => AttrValue::Str(kind.as_str().to_string()),
            None => AttrValue::Null,
        }
    }
}

/// Inline formatting on text nodes. The derive order is the canonical
/// order marks are kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
}

impl Mark {
    pub const ALL: [Mark; 5] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Strike,
        Mark::Code,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Strike => "strike",
            Mark::Code => "code",
        }
    }
}

/// Sorted, de-duplicated mark set.
pub fn normalize_marks(mut marks: Vec<Mark>) -> Vec<Mark> {
    marks.sort();
    marks.dedup();
    marks
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

/// Kind-specific attribute map, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attrs(BTreeMap<String, AttrValue>);

impl Attrs {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<AttrValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn para() -> Node {
        Node::paragraph(vec![])
    }

    #[test]
    fn block_content_requires_leading_textblock() {
        let child = Node::block(para(), vec![]);
        assert!(NodeKind::Block.valid_content([&para(), &child]));
        assert!(!NodeKind::Block.valid_content([&child]));
        assert!(!NodeKind::Block.valid_content([&para(), &para()]));
        assert!(!NodeKind::Block.valid_content(std::iter::empty::<&Node>()));
    }

    #[test]
    fn doc_requires_at_least_one_block() {
        assert!(!NodeKind::Doc.valid_content(std::iter::empty::<&Node>()));
        assert!(NodeKind::Doc.valid_content([&Node::block(para(), vec![])]));
    }

    #[test]
    fn citation_rejects_nested_citations() {
        let inner = Node::citation(vec![]);
        assert!(!NodeKind::Citation.valid_content([&inner]));
        assert!(NodeKind::Paragraph.valid_content([&inner]));
    }

    #[test]
    fn compute_attrs_fills_defaults_and_drops_unknown_keys() {
        let given: Attrs = [("collapsed", AttrValue::Bool(true)), ("bogus", 3i64.into())]
            .into_iter()
            .collect();
        let attrs = NodeKind::Block.compute_attrs(&given);
        assert_eq!(attrs.get("collapsed"), Some(&AttrValue::Bool(true)));
        assert_eq!(attrs.get("type"), Some(&AttrValue::Null));
        assert_eq!(attrs.get("bogus"), None);
    }

    #[test]
    fn block_kind_names_roundtrip() {
        for kind in [
            BlockKind::Collapsible,
            BlockKind::BulletList,
            BlockKind::OrderedList,
        ] {
            assert_eq!(BlockKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(BlockKind::parse("table"), None);
    }

    #[test]
    fn marks_are_sorted_and_unique() {
        assert_eq!(
            normalize_marks(vec![Mark::Code, Mark::Bold, Mark::Code]),
            vec![Mark::Bold, Mark::Code]
        );
    }
}
