use crate::editing::Selection;
use crate::model::{AttrValue, Attrs, Fragment, Mark, Node, NodeKind, Slice, char_slice};
use crate::suggestion::SuggestionIntent;

use super::{Mapping, Step, StepError};

/// Typed payload a transaction carries for the derived editor state.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Suggestion(SuggestionIntent),
    /// Show or hide the drag handles of top-level blocks.
    DragHandles { hidden: bool },
}

/// An ordered list of steps built up by a command, plus the selection that
/// should hold after it.
///
/// Positions passed to a transaction always refer to its current document
/// (`doc()`), that is, after every step added so far.
#[derive(Debug, Clone)]
pub struct Transaction {
    before: Node,
    doc: Node,
    steps: Vec<Step>,
    docs: Vec<Node>,
    mapping: Mapping,
    selection: Selection,
    selection_for: usize,
    selection_set: bool,
    intents: Vec<Intent>,
}

impl Transaction {
    pub fn new(doc: Node, selection: Selection) -> Self {
        Self {
            before: doc.clone(),
            doc,
            steps: Vec::new(),
            docs: Vec::new(),
            mapping: Mapping::new(),
            selection,
            selection_for: 0,
            selection_set: false,
            intents: Vec::new(),
        }
    }

    /// The document the transaction started from.
    pub fn before(&self) -> &Node {
        &self.before
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The document each step was applied to.
    pub fn docs(&self) -> &[Node] {
        &self.docs
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        self.steps.iter().any(Step::changes_doc)
    }

    pub fn selection_set(&self) -> bool {
        self.selection_set
    }

    /// The selection, mapped through every step added since it was last set.
    pub fn selection(&self) -> Selection {
        if self.selection_for == self.steps.len() {
            return self.selection.clone();
        }
        self.selection
            .map(&self.doc, &self.mapping.slice(self.selection_for))
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = selection;
        self.selection_for = self.steps.len();
        self.selection_set = true;
        self
    }

    pub fn set_intent(&mut self, intent: Intent) -> &mut Self {
        self.intents.push(intent);
        self
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn step(&mut self, step: Step) -> Result<&mut Self, StepError> {
        let doc = step.apply(&self.doc).inspect_err(|err| {
            log::debug!("step rejected: {err}");
        })?;
        if let Step::Selection(selection) = &step {
            self.selection = selection.clone();
            self.selection_for = self.steps.len() + 1;
            self.selection_set = true;
        }
        self.mapping.append_map(step.get_map());
        self.docs.push(std::mem::replace(&mut self.doc, doc));
        self.steps.push(step);
        Ok(self)
    }

    pub fn replace(&mut self, from: usize, to: usize, slice: Slice) -> Result<&mut Self, StepError> {
        if from == to && slice.size() == 0 {
            return Ok(self);
        }
        self.step(Step::replace(from, to, slice))
    }

    pub fn replace_with(&mut self, from: usize, to: usize, nodes: Vec<Node>) -> Result<&mut Self, StepError> {
        self.replace(from, to, Slice::from_nodes(nodes))
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, StepError> {
        self.replace(from, to, Slice::empty())
    }

    pub fn insert(&mut self, pos: usize, nodes: Vec<Node>) -> Result<&mut Self, StepError> {
        self.replace_with(pos, pos, nodes)
    }

    pub fn insert_fragment(&mut self, pos: usize, fragment: Fragment) -> Result<&mut Self, StepError> {
        self.replace(pos, pos, Slice::new(fragment, 0, 0))
    }

    /// Replaces `from..to` with text carrying the marks found at `from`.
    pub fn insert_text(&mut self, text: &str, from: usize, to: usize) -> Result<&mut Self, StepError> {
        if text.is_empty() {
            return self.delete(from, to);
        }
        let marks = self.doc.resolve(from)?.marks();
        self.replace_with(from, to, vec![Node::marked_text(text, marks)])
    }

    pub fn set_node_attribute(
        &mut self,
        pos: usize,
        key: &str,
        value: impl Into<AttrValue>,
    ) -> Result<&mut Self, StepError> {
        self.step(Step::attr(pos, key, value))
    }

    /// Changes the kind and attributes of the node at `pos`, keeping its
    /// content.
    pub fn set_node_markup(&mut self, pos: usize, kind: NodeKind, attrs: &Attrs) -> Result<&mut Self, StepError> {
        let node = self.doc.node_at(pos).ok_or(StepError::NoNode { pos })?;
        if node.is_leaf() {
            return self.replace_with(pos, pos + 1, vec![Node::new(kind, attrs, Fragment::empty())]);
        }
        let end = pos + node.node_size();
        self.step(Step::replace_around(
            pos,
            end,
            pos + 1,
            end - 1,
            Slice::from_nodes(vec![Node::new(kind, attrs, Fragment::empty())]),
            1,
            true,
        ))
    }

    pub fn add_mark(&mut self, from: usize, to: usize, mark: Mark) -> Result<&mut Self, StepError> {
        self.remark(from, to, |marks| {
            if marks.contains(&mark) {
                None
            } else {
                let mut marks = marks.to_vec();
                marks.push(mark);
                Some(marks)
            }
        })
    }

    pub fn remove_mark(&mut self, from: usize, to: usize, mark: Mark) -> Result<&mut Self, StepError> {
        self.remark(from, to, |marks| {
            marks
                .contains(&mark)
                .then(|| marks.iter().copied().filter(|m| *m != mark).collect())
        })
    }

    /// Rewrites the marks of the text between `from` and `to`. Each change
    /// keeps the size of the text, so positions stay valid.
    fn remark<F>(&mut self, from: usize, to: usize, change: F) -> Result<&mut Self, StepError>
    where
        F: Fn(&[Mark]) -> Option<Vec<Mark>>,
    {
        let mut edits = Vec::new();
        self.doc.nodes_between(from, to, &mut |node, pos, _, _| {
            if node.is_text() {
                if let Some(marks) = change(node.marks()) {
                    let start = from.max(pos);
                    let end = to.min(pos + node.node_size());
                    let text = char_slice(node.text(), start - pos, end - pos).to_string();
                    edits.push((start, end, Node::marked_text(text, marks)));
                }
            }
            true
        });
        for (start, end, text) in edits {
            self.replace_with(start, end, vec![text])?;
        }
        Ok(self)
    }

    /// Steps that undo this transaction, in the order they must be applied.
    pub fn invert(&self) -> Result<Vec<Step>, StepError> {
        self.steps
            .iter()
            .zip(&self.docs)
            .rev()
            .map(|(step, doc)| step.invert(doc))
            .collect()
    }
}
