/*!
 * # Citations
 *
 * A citation is an inline group of references, typed by opening a bracket.
 * Inside it the user types a trigger (`@` by default) and a query, picks a
 * reference from the fuzzy-ranked list, and the `@query` text is replaced
 * by a reference node.
 *
 * Between two references the view shows a separator (`"; "`) that is not
 * part of the document. It only becomes text when the user types after the
 * last reference, and it is dropped again when that text turns into a
 * reference.
 *
 * The key rules here run before the generic block commands:
 *
 * - ArrowRight / ArrowLeft at the inner edge leave the citation, adding a
 *   guard space when there is nothing outside to land on
 * - Enter does nothing inside a citation
 * - Backspace refuses selections that cross a citation edge and turns a
 *   citation about to become empty back into a literal `[`
 */

use nucleo::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo::{Config, Matcher};
use serde::{Deserialize, Serialize};

use crate::editing::{EditError, Selection};
use crate::model::{Node, NodeKind, ResolvedPos};
use crate::transform::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub label: String,
}

impl Reference {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn to_node(&self) -> Node {
        Node::reference(&self.id, &self.label)
    }
}

impl AsRef<str> for Reference {
    fn as_ref(&self) -> &str {
        &self.label
    }
}

impl From<quire_config::ReferenceEntry> for Reference {
    fn from(entry: quire_config::ReferenceEntry) -> Self {
        Self::new(entry.id, entry.label)
    }
}

/// Where citation autocomplete gets its references from.
pub trait ReferenceLookup: Send + Sync {
    fn references(&self) -> Vec<Reference>;
}

/// A fixed list of references.
#[derive(Debug, Clone, Default)]
pub struct StaticReferences {
    references: Vec<Reference>,
}

impl StaticReferences {
    pub fn new(references: Vec<Reference>) -> Self {
        Self { references }
    }
}

impl ReferenceLookup for StaticReferences {
    fn references(&self) -> Vec<Reference> {
        self.references.clone()
    }
}

/// References whose label fuzzily matches `query`, best first. An empty
/// query lists every reference in lookup order.
pub fn reference_suggestions(lookup: &dyn ReferenceLookup, query: &str) -> Vec<Reference> {
    let references = lookup.references();
    if query.trim().is_empty() {
        return references;
    }
    let mut matcher = Matcher::default();
    matcher.config = Config::DEFAULT;
    let pattern = Atom::new(
        query,
        CaseMatching::Smart,
        Normalization::Smart,
        AtomKind::Fuzzy,
        false,
    );
    pattern
        .match_list(references, &mut matcher)
        .into_iter()
        .map(|(reference, _score)| reference)
        .collect()
}

/// The caret, when it sits directly inside a citation.
fn citation_cursor(doc: &Node, selection: &Selection) -> Option<ResolvedPos> {
    let pos = selection.cursor_pos()?;
    doc.resolve(pos)
        .ok()
        .filter(|rpos| rpos.parent().kind() == NodeKind::Citation)
}

/// Start of the `trigger` typed before the caret in a citation, and the
/// query that follows it.
pub fn reference_query(doc: &Node, selection: &Selection, trigger: &str) -> Option<(usize, String)> {
    if trigger.is_empty() {
        return None;
    }
    let rpos = citation_cursor(doc, selection)?;
    let before = rpos.node_before().filter(Node::is_text)?;
    let text = before.text();
    let index = text.rfind(trigger)?;
    let tail = &text[index..];
    let start = rpos.pos() - tail.chars().count();
    Some((start, tail[trigger.len()..].to_string()))
}

/// Replaces the `@query` before the caret with `reference`. A separator
/// typed right after a previous reference goes too.
pub fn insert_reference(
    tr: &mut Transaction,
    reference: &Reference,
    trigger: &str,
    separator: &str,
) -> Result<bool, EditError> {
    let Some((start, query)) = reference_query(tr.doc(), &tr.selection(), trigger) else {
        return Ok(false);
    };
    let pos = tr.selection().from();
    let mut from = start;
    let sep_len = separator.chars().count();
    if sep_len > 0 && start >= sep_len {
        let sep_start = start - sep_len;
        let doc = tr.doc();
        let same_parent = doc
            .resolve(sep_start)
            .is_ok_and(|r| r.parent().kind() == NodeKind::Citation && r.start(r.depth()) <= sep_start);
        let after_reference = doc
            .resolve(sep_start)
            .ok()
            .and_then(|r| r.node_before())
            .is_some_and(|node| node.kind() == NodeKind::Reference);
        if same_parent && after_reference && doc.text_between(sep_start, start, "") == separator {
            from = sep_start;
        }
    }
    tr.replace_with(from, pos, vec![reference.to_node()])?;
    tr.set_selection(Selection::cursor(from + 1));
    log::debug!("inserted reference {} for query {query:?}", reference.id);
    Ok(true)
}

/// Where the separator widget goes: the caret at the end of a citation
/// whose last child is a reference.
pub fn separator_anchor(doc: &Node, selection: &Selection) -> Option<usize> {
    let pos = selection.cursor_pos()?;
    let rpos = doc.resolve(pos).ok()?;
    let parent = rpos.parent();
    if parent.kind() != NodeKind::Citation || pos != rpos.end(rpos.depth()) {
        return None;
    }
    parent
        .last_child()
        .filter(|last| last.kind() == NodeKind::Reference)
        .map(|_| pos)
}

/// Typing right after the last reference of a citation stores the
/// separator in front of the text.
pub fn type_after_reference(tr: &mut Transaction, text: &str, separator: &str) -> Result<bool, EditError> {
    let selection = tr.selection();
    let Some(pos) = separator_anchor(tr.doc(), &selection) else {
        return Ok(false);
    };
    tr.insert_text(&format!("{separator}{text}"), pos, pos)?;
    Ok(true)
}

/// ArrowRight at the end of a citation moves out of it.
pub fn arrow_right(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = citation_cursor(tr.doc(), &tr.selection()) else {
        return Ok(false);
    };
    let depth = rpos.depth();
    if rpos.pos() != rpos.end(depth) {
        return Ok(false);
    }
    let after = rpos.after(depth);
    let landing = tr.doc().resolve(after)?.node_after();
    if landing.is_none() {
        tr.insert(after, vec![Node::text_node(" ")])?;
        tr.set_selection(Selection::cursor(after + 1));
    } else {
        tr.set_selection(Selection::cursor(after));
    }
    Ok(true)
}

/// ArrowLeft at the start of a citation moves out of it.
pub fn arrow_left(tr: &mut Transaction) -> Result<bool, EditError> {
    let Some(rpos) = citation_cursor(tr.doc(), &tr.selection()) else {
        return Ok(false);
    };
    let depth = rpos.depth();
    if rpos.parent_offset() != 0 {
        return Ok(false);
    }
    let before = rpos.before(depth);
    if tr.doc().resolve(before)?.node_before().is_none() {
        tr.insert(before, vec![Node::text_node(" ")])?;
    }
    tr.set_selection(Selection::cursor(before));
    Ok(true)
}

/// Enter does nothing while either end of the selection is in a citation.
pub fn enter_guard(tr: &mut Transaction) -> Result<bool, EditError> {
    let selection = tr.selection();
    if !selection.is_text() {
        return Ok(false);
    }
    let doc = tr.doc();
    let in_citation = |pos| {
        doc.resolve(pos)
            .is_ok_and(|r| r.parent().kind() == NodeKind::Citation)
    };
    Ok(in_citation(selection.from()) || in_citation(selection.to()))
}

/// Backspace rules for citations.
///
/// A selection with one end in a citation and the other elsewhere is
/// refused. When the deletion would empty the citation, the citation is
/// replaced by the `[` that opened it.
pub fn backspace_guard(tr: &mut Transaction) -> Result<bool, EditError> {
    let selection = tr.selection();
    if !selection.is_text() {
        return Ok(false);
    }
    let doc = tr.doc();
    let rfrom = doc.resolve(selection.from())?;
    let rto = doc.resolve(selection.to())?;
    let from_in = rfrom.parent().kind() == NodeKind::Citation;
    let to_in = rto.parent().kind() == NodeKind::Citation;
    if !from_in && !to_in {
        return Ok(false);
    }
    let depth = rfrom.depth();
    if depth != rto.depth() || rfrom.start(depth) != rto.start(depth) {
        log::debug!("backspace blocked across a citation edge");
        return Ok(true);
    }
    let removing = if selection.empty() {
        1
    } else {
        selection.to() - selection.from()
    };
    if rfrom.parent().content_size() != removing {
        return Ok(false);
    }
    let start = rfrom.before(depth);
    let end = start + rfrom.parent().node_size();
    tr.insert_text("[", start, end)?;
    tr.set_selection(Selection::cursor(start + 1));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::commands::fixtures::*;
    use pretty_assertions::assert_eq;

    fn with_inline(inline: Vec<Node>) -> Node {
        doc(vec![Node::block(Node::paragraph(inline), vec![])])
    }

    fn library() -> StaticReferences {
        StaticReferences::new(vec![
            Reference::new("knuth", "Knuth 1984, Literate Programming"),
            Reference::new("dijkstra", "Dijkstra 1968, Go To Statement"),
            Reference::new("hoare", "Hoare 1978, Communicating Sequential Processes"),
        ])
    }

    #[test]
    fn empty_query_lists_everything_in_order() {
        let ids: Vec<_> = reference_suggestions(&library(), "")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["knuth", "dijkstra", "hoare"]);
    }

    #[test]
    fn query_ranks_fuzzy_matches() {
        let found = reference_suggestions(&library(), "dijk");
        assert_eq!(found.first().map(|r| r.id.as_str()), Some("dijkstra"));
        assert!(found.iter().all(|r| r.id != "knuth"));
        assert!(reference_suggestions(&library(), "zzzz").is_empty());
    }

    #[test]
    fn backspace_turns_emptied_citation_into_bracket() {
        // 0 block 1 p 2 citation 3 "C" 4 /citation
        let start = with_inline(vec![Node::citation(vec![Node::text_node("C")])]);
        let mut tr = at(start, 4);
        assert!(backspace_guard(&mut tr).unwrap());
        assert_eq!(tr.doc(), &with_inline(vec![Node::text_node("[")]));
        assert_eq!(tr.selection(), Selection::cursor(3));
    }

    #[test]
    fn backspace_inside_longer_citation_is_left_alone() {
        let start = with_inline(vec![Node::citation(vec![Node::text_node("Cd")])]);
        let mut tr = at(start, 4);
        assert!(!backspace_guard(&mut tr).unwrap());
        assert!(tr.steps().is_empty());
    }

    #[test]
    fn backspace_across_citation_edge_is_blocked() {
        // 0 block 1 p 2 "ab" 4 citation 5 "C" 6 /citation
        let start = with_inline(vec![
            Node::text_node("ab"),
            Node::citation(vec![Node::text_node("C")]),
        ]);
        let mut tr = range(start, 3, 6);
        assert!(backspace_guard(&mut tr).unwrap());
        assert!(tr.steps().is_empty());
    }

    #[test]
    fn enter_is_swallowed_in_citations() {
        let start = with_inline(vec![Node::citation(vec![Node::text_node("C")])]);
        assert!(enter_guard(&mut at(start.clone(), 3)).unwrap());
        assert!(!enter_guard(&mut at(start, 2)).unwrap());
    }

    #[test]
    fn arrows_leave_with_a_guard_space() {
        let start = with_inline(vec![Node::citation(vec![Node::text_node("C")])]);
        let mut tr = at(start.clone(), 4);
        assert!(arrow_right(&mut tr).unwrap());
        assert_eq!(
            tr.doc(),
            &with_inline(vec![Node::citation(vec![Node::text_node("C")]), Node::text_node(" ")])
        );
        assert_eq!(tr.selection(), Selection::cursor(6));

        let mut tr = at(start, 3);
        assert!(arrow_left(&mut tr).unwrap());
        assert_eq!(
            tr.doc(),
            &with_inline(vec![Node::text_node(" "), Node::citation(vec![Node::text_node("C")])])
        );
        assert_eq!(tr.selection(), Selection::cursor(2));
    }

    #[test]
    fn arrow_right_only_at_the_end() {
        let start = with_inline(vec![Node::citation(vec![Node::text_node("Cd")])]);
        assert!(!arrow_right(&mut at(start, 4)).unwrap());
    }

    #[test]
    fn picking_a_reference_replaces_the_query() {
        // 0 block 1 p 2 citation 3 "@dij" 7
        let start = with_inline(vec![Node::citation(vec![Node::text_node("@dij")])]);
        let mut tr = at(start, 7);
        assert_eq!(
            reference_query(tr.doc(), &tr.selection(), "@"),
            Some((3, "dij".to_string()))
        );
        let reference = Reference::new("dijkstra", "Dijkstra 1968");
        assert!(insert_reference(&mut tr, &reference, "@", "; ").unwrap());
        assert_eq!(
            tr.doc(),
            &with_inline(vec![Node::citation(vec![reference.to_node()])])
        );
        assert_eq!(tr.selection(), Selection::cursor(4));
    }

    #[test]
    fn separator_is_typed_then_dropped_again() {
        let first = Reference::new("knuth", "Knuth");
        let second = Reference::new("hoare", "Hoare");
        // 0 block 1 p 2 citation 3 ref 4 /citation
        let start = with_inline(vec![Node::citation(vec![first.to_node()])]);
        let mut tr = at(start, 4);
        assert_eq!(separator_anchor(tr.doc(), &tr.selection()), Some(4));

        assert!(type_after_reference(&mut tr, "@ho", "; ").unwrap());
        assert_eq!(
            tr.doc(),
            &with_inline(vec![Node::citation(vec![first.to_node(), Node::text_node("; @ho")])])
        );
        assert_eq!(tr.selection(), Selection::cursor(9));
        assert_eq!(separator_anchor(tr.doc(), &tr.selection()), None);

        assert!(insert_reference(&mut tr, &second, "@", "; ").unwrap());
        assert_eq!(
            tr.doc(),
            &with_inline(vec![Node::citation(vec![first.to_node(), second.to_node()])])
        );
        assert_eq!(tr.selection(), Selection::cursor(5));
    }
}
