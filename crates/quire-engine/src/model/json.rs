//! JSON shape of a node tree.
//!
//! `Node` serializes through [`NodeRepr`], and deserializing goes back
//! through [`Node::checked`], so a tree that breaks the schema is refused.

use serde::{Deserialize, Serialize};

use super::{Attrs, Fragment, Mark, ModelError, Node, NodeKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRepr {
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<NodeRepr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    marks: Vec<Mark>,
}

impl From<Node> for NodeRepr {
    fn from(node: Node) -> Self {
        Self {
            kind: node.kind(),
            attrs: node.attrs().clone(),
            content: node.children().cloned().map(NodeRepr::from).collect(),
            text: node.is_text().then(|| node.text().to_string()),
            marks: node.marks().to_vec(),
        }
    }
}

impl TryFrom<NodeRepr> for Node {
    type Error = ModelError;

    fn try_from(repr: NodeRepr) -> Result<Self, Self::Error> {
        if repr.kind == NodeKind::Text {
            return match repr.text {
                Some(text) if !text.is_empty() && repr.content.is_empty() => {
                    Ok(Node::marked_text(text, repr.marks))
                }
                _ => Err(ModelError::InvalidContent { kind: NodeKind::Text }),
            };
        }
        if repr.text.is_some() || !repr.marks.is_empty() {
            return Err(ModelError::InvalidAttrs { kind: repr.kind });
        }
        let children = repr
            .content
            .into_iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Node::checked(repr.kind, &repr.attrs, Fragment::from_vec(children))
    }
}
