use html_escape::decode_html_entities;
use quire_syntax::ast::{Attribute, Content, Element, root_content};

use crate::model::{Attrs, BlockKind, Fragment, Mark, Node, NodeKind};

use super::ParseError;

/// Reads a document from markup. Never panics; anything the schema does
/// not accept is an error.
pub fn parse(markup: &str) -> Result<Node, ParseError> {
    let tree = quire_syntax::parse(markup);
    let blocks = block_list(root_content(&tree), "doc")?;
    Ok(Node::checked(NodeKind::Doc, &Attrs::new(), Fragment::from_vec(blocks))?)
}

/// Name of a well-formed element, lowercased.
fn tag_name(el: &Element) -> Result<String, ParseError> {
    let raw = el.syntax().text().to_string();
    let Some(start) = el.start_tag() else {
        return Err(ParseError::Malformed(raw));
    };
    let Some(name) = start.name() else {
        return Err(ParseError::Malformed(raw));
    };
    if !start.is_closed() || start.has_errors() {
        return Err(ParseError::Malformed(raw));
    }
    let name = name.to_ascii_lowercase();
    if start.is_self_closing() {
        return Ok(name);
    }
    match el.end_tag() {
        None => Err(ParseError::Unbalanced {
            expected: name,
            found: "end of input".to_string(),
        }),
        Some(end) => {
            let found = end.name().unwrap_or_default();
            if found.eq_ignore_ascii_case(&name) {
                Ok(name)
            } else {
                Err(ParseError::Unbalanced {
                    expected: name,
                    found: format!("</{found}>"),
                })
            }
        }
    }
}

fn heading_level(name: &str) -> Option<i64> {
    let level = name.strip_prefix('h')?.parse::<i64>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn is_textblock_tag(name: &str) -> bool {
    name == "p" || heading_level(name).is_some()
}

fn mark_for(name: &str) -> Option<Mark> {
    match name {
        "strong" | "b" => Some(Mark::Bold),
        "em" | "i" => Some(Mark::Italic),
        "u" => Some(Mark::Underline),
        "s" | "strike" => Some(Mark::Strike),
        "code" => Some(Mark::Code),
        _ => None,
    }
}

/// Boolean attribute: bare means true.
fn flag(attr: &Attribute, name: &str) -> Result<bool, ParseError> {
    match attr.value().as_deref() {
        None | Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(ParseError::BadAttribute {
            name: name.to_string(),
            value: other.to_string(),
        }),
    }
}

fn block_list(items: impl Iterator<Item = Content>, parent: &str) -> Result<Vec<Node>, ParseError> {
    let mut blocks = Vec::new();
    for item in items {
        match item {
            Content::Text(run) if run.is_whitespace() => {}
            Content::Text(_) => return Err(ParseError::InvalidContent(parent.to_string())),
            Content::Error(node) => {
                return Err(ParseError::Unbalanced {
                    expected: parent.to_string(),
                    found: node.text().to_string(),
                });
            }
            Content::Element(el) => blocks.push(block_element(&el)?),
        }
    }
    Ok(blocks)
}

fn block_element(el: &Element) -> Result<Node, ParseError> {
    let name = tag_name(el)?;
    match name.as_str() {
        "block" => block(el),
        "collapsible-block" => collapsible_block(el),
        name if is_textblock_tag(name) => Ok(Node::block(textblock(el, name)?, vec![])),
        name if mark_for(name).is_some() || matches!(name, "citation" | "reference") => {
            Err(ParseError::InvalidContent("block".to_string()))
        }
        _ => Err(ParseError::UnknownTag(name)),
    }
}

fn block(el: &Element) -> Result<Node, ParseError> {
    let mut attrs = Attrs::new();
    for attr in el.attributes() {
        let name = attr.name().unwrap_or_default();
        match name.as_str() {
            "type" => {
                let value = attr.value().unwrap_or_default();
                let kind = BlockKind::parse(&value).ok_or_else(|| ParseError::BadAttribute {
                    name: name.clone(),
                    value: value.clone(),
                })?;
                attrs.set("type", Some(kind));
            }
            "collapsed" => attrs.set("collapsed", flag(&attr, &name)?),
            _ => log::warn!("ignoring attribute {name:?} on <block>"),
        }
    }

    let mut content = Vec::new();
    for item in el.content() {
        match item {
            Content::Text(run) if run.is_whitespace() => {}
            Content::Element(child) if content.is_empty() => {
                let name = tag_name(&child)?;
                if !is_textblock_tag(&name) {
                    return Err(ParseError::InvalidContent("block".to_string()));
                }
                content.push(textblock(&child, &name)?);
            }
            Content::Element(child) => content.push(block_element(&child)?),
            _ => return Err(ParseError::InvalidContent("block".to_string())),
        }
    }
    Ok(Node::checked(NodeKind::Block, &attrs, Fragment::from_vec(content))?)
}

/// Legacy markup for folded sections.
fn collapsible_block(el: &Element) -> Result<Node, ParseError> {
    let mut collapsed = true;
    for attr in el.attributes() {
        let name = attr.name().unwrap_or_default();
        match name.as_str() {
            "collapsed" | "folded" => collapsed = flag(&attr, &name)?,
            _ => log::warn!("ignoring attribute {name:?} on <collapsible-block>"),
        }
    }

    let mut header = None;
    let mut children = Vec::new();
    for item in el.content() {
        match item {
            Content::Text(run) if run.is_whitespace() => {}
            Content::Element(child) => match tag_name(&child)?.as_str() {
                "summary" => header = Some(summary(&child)?),
                "content" => children.extend(block_list(child.content(), "content")?),
                _ => return Err(ParseError::InvalidContent("collapsible-block".to_string())),
            },
            _ => return Err(ParseError::InvalidContent("collapsible-block".to_string())),
        }
    }
    let header = header.unwrap_or_else(|| Node::paragraph(vec![]));
    Ok(Node::block_with(Some(BlockKind::Collapsible), collapsed, header, children))
}

/// A `<summary>` holds either one textblock or bare inline content.
fn summary(el: &Element) -> Result<Node, ParseError> {
    let items: Vec<Content> = el.content().collect();
    let textblocks: Vec<&Element> = items
        .iter()
        .filter_map(|item| match item {
            Content::Element(child) => Some(child),
            _ => None,
        })
        .filter(|child| child.name().is_some_and(|name| is_textblock_tag(&name.to_ascii_lowercase())))
        .collect();
    if let [only] = textblocks.as_slice() {
        let name = tag_name(only)?;
        return textblock(only, &name);
    }
    let mut inline = Vec::new();
    inline_content(items.into_iter(), &[], false, "summary", &mut inline)?;
    Ok(Node::checked(NodeKind::Paragraph, &Attrs::new(), Fragment::from_vec(inline))?)
}

fn textblock(el: &Element, name: &str) -> Result<Node, ParseError> {
    let mut inline = Vec::new();
    inline_content(el.content(), &[], false, name, &mut inline)?;
    let content = Fragment::from_vec(inline);
    match heading_level(name) {
        Some(level) => Ok(Node::checked(NodeKind::Heading, &Attrs::new().with("level", level), content)?),
        None => Ok(Node::checked(NodeKind::Paragraph, &Attrs::new(), content)?),
    }
}

fn inline_content(
    items: impl Iterator<Item = Content>,
    marks: &[Mark],
    in_citation: bool,
    parent: &str,
    out: &mut Vec<Node>,
) -> Result<(), ParseError> {
    for item in items {
        match item {
            Content::Text(run) => {
                let text = run.text();
                out.push(Node::marked_text(decode_html_entities(&text).into_owned(), marks.to_vec()));
            }
            Content::Error(node) => return Err(ParseError::Malformed(node.text().to_string())),
            Content::Element(el) => {
                let name = tag_name(&el)?;
                if let Some(mark) = mark_for(&name) {
                    let mut inner = marks.to_vec();
                    inner.push(mark);
                    inline_content(el.content(), &inner, in_citation, parent, out)?;
                    continue;
                }
                match name.as_str() {
                    "citation" if !in_citation => {
                        let mut inner = Vec::new();
                        inline_content(el.content(), marks, true, "citation", &mut inner)?;
                        out.push(Node::checked(NodeKind::Citation, &Attrs::new(), Fragment::from_vec(inner))?);
                    }
                    "reference" => {
                        if el.content().next().is_some() {
                            return Err(ParseError::InvalidContent("reference".to_string()));
                        }
                        let attr = |key: &str| {
                            el.attribute(key)
                                .and_then(|a| a.value())
                                .map(|v| decode_html_entities(&v).into_owned())
                                .unwrap_or_default()
                        };
                        out.push(Node::reference(&attr("id"), &attr("label")));
                    }
                    "citation" | "block" | "collapsible-block" | "summary" | "content" => {
                        return Err(ParseError::InvalidContent(parent.to_string()));
                    }
                    name if is_textblock_tag(name) => {
                        return Err(ParseError::InvalidContent(parent.to_string()));
                    }
                    _ => return Err(ParseError::UnknownTag(name)),
                }
            }
        }
    }
    Ok(())
}
