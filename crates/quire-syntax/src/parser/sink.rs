//! Replays parse events into a rowan green tree.

use rowan::GreenNodeBuilder;

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

pub struct Sink<'t, 'input> {
    builder: GreenNodeBuilder<'static>,
    tokens: std::slice::Iter<'t, Token<'input>>,
    events: Vec<Event>,
}

impl<'t, 'input> Sink<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>], events: Vec<Event>) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            tokens: tokens.iter(),
            events,
        }
    }

    pub fn finish(mut self) -> SyntaxNode {
        for i in 0..self.events.len() {
            match std::mem::replace(&mut self.events[i], Event::Tombstone) {
                Event::Open { kind, wrapper } => {
                    let mut kinds = vec![kind];
                    kinds.extend(self.take_wrappers(wrapper));
                    for kind in kinds.into_iter().rev() {
                        self.builder.start_node(kind.into());
                    }
                }
                Event::Token(kind) => {
                    if let Some(token) = self.tokens.next() {
                        self.builder.token(kind.into(), token.text);
                    }
                }
                Event::Close => self.builder.finish_node(),
                Event::Tombstone => {}
            }
        }
        SyntaxNode::new_root(self.builder.finish())
    }

    /// Kinds of the wrapper chain starting at `next`, innermost first. Each
    /// wrapper's own event is consumed so it is not opened twice.
    fn take_wrappers(&mut self, mut next: Option<usize>) -> Vec<SyntaxKind> {
        let mut kinds = Vec::new();
        while let Some(idx) = next {
            next = match std::mem::replace(&mut self.events[idx], Event::Tombstone) {
                Event::Open { kind, wrapper } => {
                    kinds.push(kind);
                    wrapper
                }
                _ => None,
            };
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use pretty_assertions::assert_eq;

    #[test]
    fn replays_nested_nodes() {
        let tokens = lex("hello");
        let events = vec![
            Event::open(SyntaxKind::ROOT),
            Event::open(SyntaxKind::TEXT_RUN),
            Event::Token(SyntaxKind::NAME),
            Event::Close,
            Event::Close,
        ];
        let tree = Sink::new(&tokens, events).finish();
        assert_eq!(tree.kind(), SyntaxKind::ROOT);
        assert_eq!(tree.first_child().map(|n| n.kind()), Some(SyntaxKind::TEXT_RUN));
    }

    #[test]
    fn wrapper_opens_around_an_earlier_node() {
        let input = "</p>";
        let tokens = lex(input);
        let events = vec![
            Event::open(SyntaxKind::ROOT),
            Event::Open {
                kind: SyntaxKind::END_TAG,
                wrapper: Some(6),
            },
            Event::Token(SyntaxKind::LT_SLASH),
            Event::Token(SyntaxKind::NAME),
            Event::Token(SyntaxKind::GT),
            Event::Close,
            Event::open(SyntaxKind::ERROR),
            Event::Close,
            Event::Close,
        ];
        let tree = Sink::new(&tokens, events).finish();
        let error = tree.first_child().unwrap();
        assert_eq!(error.kind(), SyntaxKind::ERROR);
        assert_eq!(error.first_child().map(|n| n.kind()), Some(SyntaxKind::END_TAG));
        assert_eq!(tree.text().to_string(), input);
    }
}
