/*!
 * # Decorations
 *
 * View affordances derived from the editor state. Nothing here changes the
 * document; a view renders the returned [`DecorationSet`] next to it.
 *
 * Two sets are kept apart because they change at different rates:
 *
 * - the document set (fold arrows, empty-collapsible placeholders, list
 *   counters and bullets, hidden drag handles) only changes with the
 *   document and is cached by the editor
 * - the selection set (empty-paragraph placeholder, selected blocks, the
 *   citation separator, the reference query, the suggestion widget) is
 *   recomputed after every transaction
 */

use quire_config::EditorConfig;

use crate::citation;
use crate::editing::Selection;
use crate::model::{BlockKind, Node};
use crate::suggestion::SuggestionState;
use crate::transform::{Intent, Transaction};

const COUNTER_STYLES: [&str; 3] = ["decimal", "lower-alpha", "lower-roman"];
const BULLET_STYLES: [&str; 3] = ["disc", "circle", "square"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    /// At the start of a collapsible's header. `empty` when it has no
    /// nested blocks.
    FoldArrow { collapsed: bool, empty: bool },
    EmptyCollapsible { text: String },
    EmptyParagraph { text: String },
    CitationSeparator { text: String },
    Suggestion { text: String, error: bool },
}

/// Something drawn at a position without being part of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub pos: usize,
    pub kind: WidgetKind,
}

/// A class (and optional marker label) on the node spanning `from..to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDeco {
    pub from: usize,
    pub to: usize,
    pub class: String,
    pub label: Option<String>,
}

/// A class on the inline content in `from..to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineDeco {
    pub from: usize,
    pub to: usize,
    pub class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    pub widgets: Vec<Widget>,
    pub nodes: Vec<NodeDeco>,
    pub inlines: Vec<InlineDeco>,
}

impl DecorationSet {
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty() && self.nodes.is_empty() && self.inlines.is_empty()
    }

    /// Both sets together, widgets ordered by position.
    pub fn merge(&self, other: &DecorationSet) -> DecorationSet {
        let mut merged = self.clone();
        merged.widgets.extend(other.widgets.iter().cloned());
        merged.nodes.extend(other.nodes.iter().cloned());
        merged.inlines.extend(other.inlines.iter().cloned());
        merged.widgets.sort_by_key(|w| w.pos);
        merged
    }

    fn node(&mut self, from: usize, to: usize, class: impl Into<String>, label: Option<String>) {
        self.nodes.push(NodeDeco {
            from,
            to,
            class: class.into(),
            label,
        });
    }
}

/// Decorations that only depend on the document and the drag-handle flag.
pub fn doc_decorations(doc: &Node, hide_handles: bool, config: &EditorConfig) -> DecorationSet {
    let mut set = DecorationSet::default();
    walk_blocks(doc, 0, Nesting::default(), config, &mut set);
    if hide_handles {
        let mut pos = 0;
        for block in doc.children() {
            set.node(pos, pos + block.node_size(), "hidden-drag-handle", None);
            pos += block.node_size();
        }
    }
    set
}

/// Decorations that follow the selection and the suggestion state.
pub fn selection_decorations(
    doc: &Node,
    selection: &Selection,
    suggestion: &SuggestionState,
    config: &EditorConfig,
) -> DecorationSet {
    let mut set = DecorationSet::default();

    if let Some(pos) = selection.cursor_pos() {
        let empty_textblock = doc
            .resolve(pos)
            .is_ok_and(|r| r.parent().is_textblock() && r.parent().content_size() == 0);
        if empty_textblock {
            set.widgets.push(Widget {
                pos,
                kind: WidgetKind::EmptyParagraph {
                    text: config.placeholders.empty_paragraph.clone(),
                },
            });
        }
    }

    if let Some(blocks) = selection.as_block() {
        for range in blocks.ranges(doc) {
            set.node(range.start, range.end, "selected", None);
        }
    }

    if let Some(pos) = citation::separator_anchor(doc, selection) {
        set.widgets.push(Widget {
            pos,
            kind: WidgetKind::CitationSeparator {
                text: config.citation.separator.clone(),
            },
        });
    }
    if let Some((start, _)) = citation::reference_query(doc, selection, &config.citation.reference_trigger) {
        set.inlines.push(InlineDeco {
            from: start,
            to: selection.from(),
            class: "reference-query".to_string(),
        });
    }

    if let Some((pos, text)) = suggestion.widget(&config.suggestion) {
        let error = matches!(suggestion, SuggestionState::Error { .. });
        set.widgets.push(Widget {
            pos,
            kind: WidgetKind::Suggestion { text, error },
        });
    }
    set
}

/// Drag handles hide while the user edits and come back on request.
pub fn hide_handles(prior: bool, tr: &Transaction) -> bool {
    let requested = tr.intents().iter().rev().find_map(|intent| match intent {
        Intent::DragHandles { hidden } => Some(*hidden),
        _ => None,
    });
    requested.unwrap_or(prior || tr.doc_changed())
}

/// List nesting of the blocks being walked.
#[derive(Debug, Clone, Copy, Default)]
struct Nesting {
    ordered: usize,
    bullets: usize,
}

fn walk_blocks(parent: &Node, content_start: usize, nesting: Nesting, config: &EditorConfig, set: &mut DecorationSet) {
    let mut pos = content_start;
    let mut run = 0;
    for child in parent.children() {
        let start = pos;
        pos += child.node_size();
        if !child.is_block() {
            continue;
        }
        let kind = child.block_kind();
        let header_size = child.first_child().map_or(0, Node::node_size);
        let empty = child.child_count() == 1;

        if kind == Some(BlockKind::Collapsible) {
            set.widgets.push(Widget {
                pos: start + 2,
                kind: WidgetKind::FoldArrow {
                    collapsed: child.is_collapsed(),
                    empty,
                },
            });
            if empty && !child.is_collapsed() {
                set.widgets.push(Widget {
                    pos: start + 1 + header_size,
                    kind: WidgetKind::EmptyCollapsible {
                        text: config.placeholders.empty_collapsible.clone(),
                    },
                });
            }
        }

        let mut inner = nesting;
        match kind {
            Some(BlockKind::OrderedList) => {
                run += 1;
                let style = COUNTER_STYLES[nesting.ordered % COUNTER_STYLES.len()];
                set.node(start, pos, format!("ordered-list {style}"), Some(run.to_string()));
                inner.ordered += 1;
            }
            Some(BlockKind::BulletList) => {
                run = 0;
                let style = BULLET_STYLES[nesting.bullets % BULLET_STYLES.len()];
                set.node(start, pos, format!("bullet-list {style}"), None);
                inner.bullets += 1;
            }
            _ => run = 0,
        }

        if !child.is_folded() {
            walk_blocks(child, start + 1, inner, config, set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::BlockSelection;
    use crate::editing::commands::fixtures::*;
    use crate::suggestion::SuggestionRequest;
    use pretty_assertions::assert_eq;

    fn labels(set: &DecorationSet) -> Vec<(String, Option<String>)> {
        set.nodes
            .iter()
            .map(|n| (n.class.clone(), n.label.clone()))
            .collect()
    }

    fn ordered(text: &str, children: Vec<Node>) -> Node {
        typed(BlockKind::OrderedList, false, text, children)
    }

    #[test]
    fn fold_arrows_and_empty_collapsible_placeholder() {
        let config = EditorConfig::default();
        // 0 block 1 p 2 "A" 3 /p 4 /block 5 block 6 p 7 "B" 8 /p 9 x 14 /block 15
        let doc = doc(vec![
            typed(BlockKind::Collapsible, false, "A", vec![]),
            typed(BlockKind::Collapsible, true, "B", vec![b("x", vec![])]),
        ]);
        let set = doc_decorations(&doc, false, &config);
        assert_eq!(
            set.widgets,
            vec![
                Widget {
                    pos: 2,
                    kind: WidgetKind::FoldArrow {
                        collapsed: false,
                        empty: true
                    }
                },
                Widget {
                    pos: 4,
                    kind: WidgetKind::EmptyCollapsible {
                        text: config.placeholders.empty_collapsible.clone()
                    }
                },
                Widget {
                    pos: 7,
                    kind: WidgetKind::FoldArrow {
                        collapsed: true,
                        empty: false
                    }
                },
            ]
        );
    }

    #[test]
    fn ordered_counters_restart_after_other_blocks_and_nest_styles() {
        let doc = doc(vec![
            ordered("one", vec![ordered("nested", vec![])]),
            ordered("two", vec![]),
            b("plain", vec![]),
            ordered("again", vec![]),
        ]);
        let set = doc_decorations(&doc, false, &EditorConfig::default());
        assert_eq!(
            labels(&set),
            vec![
                ("ordered-list decimal".to_string(), Some("1".to_string())),
                ("ordered-list lower-alpha".to_string(), Some("1".to_string())),
                ("ordered-list decimal".to_string(), Some("2".to_string())),
                ("ordered-list decimal".to_string(), Some("1".to_string())),
            ]
        );
    }

    #[test]
    fn bullet_styles_cycle_with_depth() {
        let bullet = |text: &str, children| typed(BlockKind::BulletList, false, text, children);
        let doc = doc(vec![bullet(
            "a",
            vec![bullet("b", vec![bullet("c", vec![bullet("d", vec![])])])],
        )]);
        let classes: Vec<_> = doc_decorations(&doc, false, &EditorConfig::default())
            .nodes
            .into_iter()
            .map(|n| n.class)
            .collect();
        assert_eq!(
            classes,
            vec!["bullet-list disc", "bullet-list circle", "bullet-list square", "bullet-list disc"]
        );
    }

    #[test]
    fn hidden_handles_mark_top_level_blocks() {
        let doc = doc(vec![b("A", vec![b("x", vec![])]), b("B", vec![])]);
        let set = doc_decorations(&doc, true, &EditorConfig::default());
        let spans: Vec<_> = set.nodes.iter().map(|n| (n.from, n.to, n.class.as_str())).collect();
        assert_eq!(
            spans,
            vec![(0, 10, "hidden-drag-handle"), (10, 15, "hidden-drag-handle")]
        );
    }

    #[test]
    fn handles_hide_on_edits_until_shown_again() {
        let mut typing = at(doc(vec![b("A", vec![])]), 3);
        typing.insert_text("b", 3, 3).unwrap();
        assert!(hide_handles(false, &typing));

        let moving = at(doc(vec![b("A", vec![])]), 2);
        assert!(hide_handles(true, &moving));
        assert!(!hide_handles(false, &moving));

        let mut shown = at(doc(vec![b("A", vec![])]), 2);
        shown.set_intent(Intent::DragHandles { hidden: false });
        assert!(!hide_handles(true, &shown));
    }

    #[test]
    fn placeholder_follows_the_caret_into_empty_paragraphs() {
        let config = EditorConfig::default();
        let doc = doc(vec![b("A", vec![]), b("", vec![])]);
        let empty = selection_decorations(&doc, &Selection::cursor(7), &SuggestionState::Closed, &config);
        assert_eq!(
            empty.widgets,
            vec![Widget {
                pos: 7,
                kind: WidgetKind::EmptyParagraph {
                    text: config.placeholders.empty_paragraph.clone()
                }
            }]
        );
        let filled = selection_decorations(&doc, &Selection::cursor(2), &SuggestionState::Closed, &config);
        assert!(filled.is_empty());
    }

    #[test]
    fn selected_blocks_and_suggestion_widget() {
        let config = EditorConfig::default();
        let doc = doc(vec![b("A", vec![]), b("B", vec![]), b("C", vec![])]);
        let blocks = Selection::Block(BlockSelection::unchecked(0, 5));
        let pending = SuggestionState::Pending {
            pos: 3,
            request: SuggestionRequest {
                id: 1,
                prompt: "A".to_string(),
            },
        };
        let set = selection_decorations(&doc, &blocks, &pending, &config);
        let spans: Vec<_> = set.nodes.iter().map(|n| (n.from, n.to)).collect();
        assert_eq!(spans, vec![(0, 5), (5, 10)]);
        assert_eq!(
            set.widgets,
            vec![Widget {
                pos: 3,
                kind: WidgetKind::Suggestion {
                    text: " ...".to_string(),
                    error: false
                }
            }]
        );
    }

    #[test]
    fn citation_separator_and_query() {
        let config = EditorConfig::default();
        // 0 block 1 p 2 citation 3 ref 4 "; @kn" 9
        let with_ref = doc(vec![Node::block(
            Node::paragraph(vec![Node::citation(vec![Node::reference("a", "A")])]),
            vec![],
        )]);
        let set = selection_decorations(&with_ref, &Selection::cursor(4), &SuggestionState::Closed, &config);
        assert_eq!(
            set.widgets,
            vec![Widget {
                pos: 4,
                kind: WidgetKind::CitationSeparator { text: "; ".to_string() }
            }]
        );

        let typing = doc(vec![Node::block(
            Node::paragraph(vec![Node::citation(vec![
                Node::reference("a", "A"),
                Node::text_node("; @kn"),
            ])]),
            vec![],
        )]);
        let set = selection_decorations(&typing, &Selection::cursor(9), &SuggestionState::Closed, &config);
        assert_eq!(
            set.inlines,
            vec![InlineDeco {
                from: 6,
                to: 9,
                class: "reference-query".to_string()
            }]
        );
        assert!(set.widgets.is_empty());
    }
}
