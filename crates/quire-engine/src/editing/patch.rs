use std::ops::Range;

use crate::editing::Selection;
use crate::transform::{Assoc, Step, Transaction};

/// Result of dispatching a transaction, for a view to redraw from.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Ranges of the new document touched by the edit, sorted and merged.
    pub changed: Vec<Range<usize>>,
    pub selection: Selection,
    pub version: u64,
}

impl Patch {
    pub fn from_transaction(tr: &Transaction, version: u64) -> Self {
        Self {
            changed: changed_ranges(tr),
            selection: tr.selection(),
            version,
        }
    }

    pub fn doc_changed(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Every step's touched range, carried through the maps of the steps
/// after it.
fn changed_ranges(tr: &Transaction) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    for (index, step) in tr.steps().iter().enumerate() {
        let later = tr.mapping().slice(index + 1);
        let mut local = Vec::new();
        match step {
            Step::Attr { pos, .. } => {
                let size = tr.docs().get(index + 1).unwrap_or(tr.doc()).node_at(*pos).map_or(1, |node| node.node_size());
                local.push(*pos..pos + size);
            }
            Step::Selection(_) => {}
            _ => step.get_map().for_each(|_, _, new_start, new_end| local.push(new_start..new_end)),
        }
        for range in local {
            let start = later.map(range.start, Assoc::Before);
            let end = later.map(range.end, Assoc::After).max(start);
            ranges.push(start..end);
        }
    }
    merge(ranges)
}

fn merge(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<Range<usize>> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::commands::fixtures::*;
    use crate::model::BlockKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_insert_reports_inserted_range() {
        let mut tr = at(doc(vec![b("ab", vec![]), b("cd", vec![])]), 3);
        tr.insert_text("xyz", 3, 3).unwrap();
        let patch = Patch::from_transaction(&tr, 4);
        assert_eq!(patch.changed, vec![3..6]);
        assert_eq!(patch.version, 4);
        assert!(patch.doc_changed());
    }

    #[test]
    fn later_steps_shift_earlier_ranges() {
        let mut tr = at(doc(vec![b("ab", vec![]), b("cd", vec![])]), 2);
        tr.insert_text("cc", 8, 8).unwrap();
        tr.insert_text("a", 2, 2).unwrap();
        let patch = Patch::from_transaction(&tr, 1);
        assert_eq!(patch.changed, vec![2..3, 9..11]);
    }

    #[test]
    fn attribute_changes_cover_the_node() {
        let mut tr = at(doc(vec![b("ab", vec![])]), 2);
        tr.set_node_attribute(0, "type", Some(BlockKind::BulletList)).unwrap();
        let patch = Patch::from_transaction(&tr, 1);
        assert_eq!(patch.changed, vec![0..6]);
    }

    #[test]
    fn selection_only_changes_nothing() {
        let mut tr = at(doc(vec![b("ab", vec![])]), 2);
        tr.set_selection(Selection::cursor(3));
        let patch = Patch::from_transaction(&tr, 1);
        assert!(!patch.doc_changed());
        assert_eq!(patch.selection, Selection::cursor(3));
    }
}
