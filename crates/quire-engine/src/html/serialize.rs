use html_escape::{encode_double_quoted_attribute, encode_quoted_attribute};

use crate::model::{Mark, Node, NodeKind};

/// The canonical markup of `doc`.
pub fn serialize(doc: &Node) -> String {
    let mut out = String::new();
    if doc.kind() == NodeKind::Doc {
        for child in doc.children() {
            write_node(child, &mut out);
        }
    } else {
        write_node(doc, &mut out);
    }
    out
}

fn mark_tag(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "strong",
        Mark::Italic => "em",
        Mark::Underline => "u",
        Mark::Strike => "s",
        Mark::Code => "code",
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node.kind() {
        NodeKind::Doc => node.children().for_each(|child| write_node(child, out)),
        NodeKind::Block => {
            out.push_str("<block");
            if let Some(kind) = node.block_kind() {
                out.push_str(&format!(" type=\"{}\"", kind.as_str()));
            }
            if node.is_collapsed() {
                out.push_str(" collapsed=\"true\"");
            }
            out.push('>');
            node.children().for_each(|child| write_node(child, out));
            out.push_str("</block>");
        }
        NodeKind::Paragraph => wrap("p", node, out),
        NodeKind::Heading => {
            let level = node
                .attr("level")
                .and_then(|level| level.as_int())
                .unwrap_or(1)
                .clamp(1, 6);
            wrap(&format!("h{level}"), node, out);
        }
        NodeKind::Citation => wrap("citation", node, out),
        NodeKind::Reference => {
            let attr = |key: &str| node.attr(key).and_then(|v| v.as_str()).unwrap_or_default();
            out.push_str(&format!(
                "<reference id=\"{}\" label=\"{}\"/>",
                encode_double_quoted_attribute(attr("id")),
                encode_double_quoted_attribute(attr("label")),
            ));
        }
        NodeKind::Text => {
            for mark in node.marks() {
                out.push_str(&format!("<{}>", mark_tag(*mark)));
            }
            // Quotes are escaped too, so text never reads as an attribute value
            out.push_str(&encode_quoted_attribute(node.text()));
            for mark in node.marks().iter().rev() {
                out.push_str(&format!("</{}>", mark_tag(*mark)));
            }
        }
    }
}

fn wrap(tag: &str, node: &Node, out: &mut String) {
    out.push_str(&format!("<{tag}>"));
    node.children().for_each(|child| write_node(child, out));
    out.push_str(&format!("</{tag}>"));
}
