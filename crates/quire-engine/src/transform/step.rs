use crate::editing::Selection;
use crate::model::{AttrValue, Fragment, Node, Slice};

use super::{Assoc, Mapping, StepError, StepMap};

/// One reversible edit of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Replaces `from..to` with `slice`. With `structure` set the step
    /// refuses to delete anything but node boundaries.
    Replace {
        from: usize,
        to: usize,
        slice: Slice,
        structure: bool,
    },
    /// Replaces `from..to` with `slice`, keeping the content between
    /// `gap_from` and `gap_to` and placing it at `insert` inside the slice.
    ReplaceAround {
        from: usize,
        to: usize,
        gap_from: usize,
        gap_to: usize,
        slice: Slice,
        insert: usize,
        structure: bool,
    },
    /// Sets one attribute of the node at `pos`.
    Attr {
        pos: usize,
        key: String,
        value: AttrValue,
    },
    /// Attaches a selection without touching the document.
    Selection(Selection),
}

impl Step {
    pub fn replace(from: usize, to: usize, slice: Slice) -> Self {
        Step::Replace {
            from,
            to,
            slice,
            structure: false,
        }
    }

    pub fn replace_around(
        from: usize,
        to: usize,
        gap_from: usize,
        gap_to: usize,
        slice: Slice,
        insert: usize,
        structure: bool,
    ) -> Self {
        Step::ReplaceAround {
            from,
            to,
            gap_from,
            gap_to,
            slice,
            insert,
            structure,
        }
    }

    pub fn attr(pos: usize, key: &str, value: impl Into<AttrValue>) -> Self {
        Step::Attr {
            pos,
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn apply(&self, doc: &Node) -> Result<Node, StepError> {
        match self {
            Step::Replace {
                from,
                to,
                slice,
                structure,
            } => {
                if *structure && content_between(doc, *from, *to)? {
                    return Err(StepError::StructureReplace);
                }
                Ok(doc.replace(*from, *to, slice)?)
            }
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                slice,
                insert,
                structure,
            } => {
                if *structure
                    && (content_between(doc, *from, *gap_from)? || content_between(doc, *gap_to, *to)?)
                {
                    return Err(StepError::StructureReplace);
                }
                let gap = doc.slice(*gap_from, *gap_to)?;
                if gap.open_start() > 0 || gap.open_end() > 0 {
                    return Err(StepError::GapNotFlat);
                }
                let inserted = slice
                    .insert_at(*insert, gap.content())
                    .ok_or(StepError::GapContent)?;
                Ok(doc.replace(*from, *to, &inserted)?)
            }
            Step::Attr { pos, key, value } => {
                let node = doc.node_at(*pos).ok_or(StepError::NoNode { pos: *pos })?;
                let updated = Node::new(node.kind(), &node.attrs().clone().with(key, value.clone()), Fragment::empty());
                let open_end = usize::from(!node.is_leaf());
                Ok(doc.replace(*pos, pos + 1, &Slice::new(Fragment::from_node(updated), 0, open_end))?)
            }
            Step::Selection(_) => Ok(doc.clone()),
        }
    }

    pub fn get_map(&self) -> StepMap {
        match self {
            Step::Replace { from, to, slice, .. } => StepMap::new(vec![[*from, to - from, slice.size()]]),
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                slice,
                insert,
                ..
            } => StepMap::new(vec![
                [*from, gap_from - from, *insert],
                [*gap_to, to - gap_to, slice.size() - insert],
            ]),
            Step::Attr { .. } | Step::Selection(_) => StepMap::empty(),
        }
    }

    /// The step that undoes this one, given the document it was applied to.
    pub fn invert(&self, doc: &Node) -> Result<Step, StepError> {
        Ok(match self {
            Step::Replace { from, to, slice, .. } => {
                Step::replace(*from, from + slice.size(), doc.slice(*from, *to)?)
            }
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                slice,
                insert,
                structure,
            } => {
                let gap = gap_to - gap_from;
                Step::ReplaceAround {
                    from: *from,
                    to: from + slice.size() + gap,
                    gap_from: from + insert,
                    gap_to: from + insert + gap,
                    slice: doc
                        .slice(*from, *to)?
                        .remove_between(gap_from - from, gap_to - from)?,
                    insert: gap_from - from,
                    structure: *structure,
                }
            }
            Step::Attr { pos, key, .. } => {
                let node = doc.node_at(*pos).ok_or(StepError::NoNode { pos: *pos })?;
                let previous = node.attr(key).cloned().unwrap_or(AttrValue::Null);
                Step::attr(*pos, key, previous)
            }
            Step::Selection(selection) => Step::Selection(selection.clone()),
        })
    }

    /// This step rebased over `mapping`, or `None` when the content it
    /// applied to has been deleted.
    pub fn map(&self, mapping: &Mapping) -> Option<Step> {
        match self {
            Step::Replace {
                from,
                to,
                slice,
                structure,
            } => {
                let from = mapping.map_result(*from, Assoc::After);
                let to = mapping.map_result(*to, Assoc::Before);
                if from.deleted_across() && to.deleted_across() {
                    return None;
                }
                Some(Step::Replace {
                    from: from.pos,
                    to: from.pos.max(to.pos),
                    slice: slice.clone(),
                    structure: *structure,
                })
            }
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                slice,
                insert,
                structure,
            } => {
                let from = mapping.map_result(*from, Assoc::After);
                let to = mapping.map_result(*to, Assoc::Before);
                let gap_from = mapping.map(*gap_from, Assoc::Before);
                let gap_to = mapping.map(*gap_to, Assoc::After);
                if (from.deleted_across() && to.deleted_across()) || from.pos > gap_from || gap_to > to.pos {
                    return None;
                }
                Some(Step::ReplaceAround {
                    from: from.pos,
                    to: to.pos,
                    gap_from,
                    gap_to,
                    slice: slice.clone(),
                    insert: *insert,
                    structure: *structure,
                })
            }
            Step::Attr { pos, key, value } => {
                let pos = mapping.map_result(*pos, Assoc::After);
                if pos.deleted_after() {
                    return None;
                }
                Some(Step::Attr {
                    pos: pos.pos,
                    key: key.clone(),
                    value: value.clone(),
                })
            }
            Step::Selection(selection) => Some(Step::Selection(selection.map_positions(mapping))),
        }
    }

    pub fn changes_doc(&self) -> bool {
        !matches!(self, Step::Selection(_))
    }
}

/// Whether `from..to` covers anything besides closing and opening tokens.
fn content_between(doc: &Node, from: usize, to: usize) -> Result<bool, StepError> {
    let rfrom = doc.resolve(from)?;
    let mut dist = to.saturating_sub(from);
    let mut depth = rfrom.depth();
    while dist > 0 && depth > 0 && rfrom.index_after(depth) == rfrom.node(depth).child_count() {
        depth -= 1;
        dist -= 1;
    }
    if dist > 0 {
        let mut next = rfrom.node(depth).maybe_child(rfrom.index_after(depth)).cloned();
        while dist > 0 {
            match next {
                Some(node) if !node.is_leaf() => {
                    next = node.first_child().cloned();
                    dist -= 1;
                }
                _ => return Ok(true),
            }
        }
    }
    Ok(false)
}
