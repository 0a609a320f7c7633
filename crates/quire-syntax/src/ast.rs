//! Typed views over the untyped CST.
//!
//! Each wrapper holds a [`SyntaxNode`] of a known kind and exposes the
//! pieces a consumer cares about. Values are returned raw: attribute values
//! lose their quotes but entities are not decoded.

use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// A child of the root or of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(Element),
    Text(TextRun),
    Error(SyntaxNode),
}

impl Content {
    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::ELEMENT => Some(Content::Element(Element(node))),
            SyntaxKind::TEXT_RUN => Some(Content::Text(TextRun(node))),
            SyntaxKind::ERROR => Some(Content::Error(node)),
            _ => None,
        }
    }
}

/// Content items of the root node.
pub fn root_content(root: &SyntaxNode) -> impl Iterator<Item = Content> + '_ {
    root.children().filter_map(Content::cast)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element(SyntaxNode);

impl Element {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::ELEMENT).then_some(Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn start_tag(&self) -> Option<StartTag> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::START_TAG)
            .map(StartTag)
    }

    pub fn end_tag(&self) -> Option<EndTag> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::END_TAG)
            .map(EndTag)
    }

    /// Tag name from the start tag.
    pub fn name(&self) -> Option<String> {
        self.start_tag().and_then(|t| t.name())
    }

    pub fn is_self_closing(&self) -> bool {
        self.start_tag().is_some_and(|t| t.is_self_closing())
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.start_tag()
            .map(|t| t.attributes().collect())
            .unwrap_or_default()
    }

    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes()
            .into_iter()
            .find(|a| a.name().as_deref() == Some(name))
    }

    /// Children between the start and end tag.
    pub fn content(&self) -> impl Iterator<Item = Content> + '_ {
        self.0.children().filter_map(Content::cast)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag(SyntaxNode);

impl StartTag {
    pub fn name(&self) -> Option<String> {
        first_token(&self.0, SyntaxKind::NAME).map(|t| t.text().to_string())
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::ATTRIBUTE)
            .map(Attribute)
    }

    pub fn is_self_closing(&self) -> bool {
        first_token(&self.0, SyntaxKind::SLASH_GT).is_some()
    }

    /// False when input ended or another tag began before `>`.
    pub fn is_closed(&self) -> bool {
        self.is_self_closing() || first_token(&self.0, SyntaxKind::GT).is_some()
    }

    /// Unexpected tokens recovered inside the tag.
    pub fn has_errors(&self) -> bool {
        self.0.children().any(|n| n.kind() == SyntaxKind::ERROR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTag(SyntaxNode);

impl EndTag {
    pub fn name(&self) -> Option<String> {
        first_token(&self.0, SyntaxKind::NAME).map(|t| t.text().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute(SyntaxNode);

impl Attribute {
    pub fn name(&self) -> Option<String> {
        first_token(&self.0, SyntaxKind::NAME).map(|t| t.text().to_string())
    }

    /// The value with surrounding quotes removed. `None` for a bare
    /// attribute such as `<block collapsed>`.
    pub fn value(&self) -> Option<String> {
        let mut seen_eq = false;
        for token in self
            .0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
        {
            match token.kind() {
                SyntaxKind::EQ => seen_eq = true,
                SyntaxKind::STRING if seen_eq => {
                    let text = token.text();
                    return Some(text[1..text.len() - 1].to_string());
                }
                SyntaxKind::NAME | SyntaxKind::TEXT if seen_eq => {
                    return Some(token.text().to_string());
                }
                _ => {}
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun(SyntaxNode);

impl TextRun {
    /// Raw source text of the run.
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }

    pub fn is_whitespace(&self) -> bool {
        self.0
            .children_with_tokens()
            .all(|e| e.kind().is_trivia())
    }
}

fn first_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}
