#![allow(dead_code)]

use quire_engine::html;
use quire_engine::{Node, Selection, Transaction};

const MARKER: char = '\u{2038}';

/// Parses markup where `|` marks the caret, or both ends of a text
/// selection when it appears twice.
pub fn fixture(markup: &str) -> (Node, Selection) {
    let marked = html::parse(&markup.replace('|', &MARKER.to_string())).unwrap();
    let mut found = Vec::new();
    marked.descendants(&mut |node, pos, _, _| {
        if node.is_text() {
            for (offset, ch) in node.text().chars().enumerate() {
                if ch == MARKER {
                    found.push(pos + offset);
                }
            }
        }
        true
    });
    let positions: Vec<usize> = found.iter().enumerate().map(|(i, pos)| pos - i).collect();
    let doc = html::parse(&markup.replace('|', "")).unwrap();
    let selection = match positions.as_slice() {
        [pos] => Selection::cursor(*pos),
        [anchor, head] => Selection::text(*anchor, *head),
        _ => panic!("expected one or two markers in {markup:?}"),
    };
    (doc, selection)
}

/// Canonical markup of `doc` with `|` at the ends of a text selection.
pub fn render(doc: &Node, selection: &Selection) -> String {
    let mut positions = vec![selection.from()];
    if !selection.empty() {
        positions.push(selection.to());
    }
    let mut tr = Transaction::new(doc.clone(), selection.clone());
    for pos in positions.into_iter().rev() {
        tr.insert_text(&MARKER.to_string(), pos, pos).unwrap();
    }
    html::serialize(tr.doc()).replace(MARKER, "|")
}

/// Header texts in document order, ignoring nesting.
pub fn headers(doc: &Node) -> Vec<String> {
    let mut out = Vec::new();
    doc.descendants(&mut |node, _, _, _| {
        if node.is_textblock() {
            out.push(node.text_content());
            return false;
        }
        true
    });
    out
}
