//! # Parser
//!
//! Grammar functions walk the token slice and record [`Event`]s; the
//! [`Sink`] replays them into a rowan tree once parsing is done.
//!
//! The parser has no failure path. Half-typed markup still yields a tree
//! that holds every input byte, with `ERROR` nodes where the grammar gave
//! up. Deciding whether the tree is an acceptable document is the caller's
//! job.
//!
//! A node is built by taking a [`Marker`] with [`Parser::start`], consuming
//! tokens, then calling [`Marker::complete`] (or [`Marker::abandon`]). A
//! marker that is simply dropped panics. [`CompletedMarker::precede`] wraps
//! a finished node after the fact, which is how stray end tags end up
//! inside `ERROR`.
//!
//! ```
//! use quire_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("<p>Hello</p>");
//! assert_eq!(tree.kind(), SyntaxKind::ROOT);
//! ```

pub mod event;
pub mod sink;

mod grammar;

use crate::lexer::{Token, lex};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    pos: usize,
    events: Vec<Event>,
}

impl<'t, 'input> Parser<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
        }
    }

    pub fn parse(mut self) -> SyntaxNode {
        grammar::root(&mut self);
        Sink::new(self.tokens, self.events).finish()
    }

    pub fn start(&mut self) -> Marker {
        self.events.push(Event::Tombstone);
        Marker {
            slot: self.events.len() - 1,
            done: false,
        }
    }

    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Kind `n` tokens ahead; `EOF` past the end.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map_or(SyntaxKind::EOF, |token| token.kind)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        let matched = self.at(kind);
        if matched {
            self.bump();
        }
        matched
    }

    pub fn bump(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.events.push(Event::Token(token.kind));
            self.pos += 1;
        }
    }

    /// `<` directly followed by a tag name.
    pub fn at_tag_start(&self) -> bool {
        self.at(SyntaxKind::LT) && self.nth(1) == SyntaxKind::NAME
    }

    pub fn eat_trivia(&mut self) {
        while self.current().is_trivia() {
            self.bump();
        }
    }
}

/// A node under construction. Must be completed or abandoned.
#[must_use = "a marker has to be completed or abandoned"]
pub struct Marker {
    slot: usize,
    done: bool,
}

impl Marker {
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.done = true;
        debug_assert!(matches!(p.events[self.slot], Event::Tombstone));
        p.events[self.slot] = Event::open(kind);
        p.events.push(Event::Close);
        CompletedMarker { slot: self.slot }
    }

    /// Drops the node. The slot is removed when nothing was recorded after
    /// it and left as a tombstone otherwise.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.done = true;
        if self.slot + 1 == p.events.len() {
            p.events.pop();
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.done && !std::thread::panicking() {
            panic!("marker at event {} was neither completed nor abandoned", self.slot);
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    slot: usize,
}

impl CompletedMarker {
    /// Starts a node that will enclose this one.
    pub fn precede(self, p: &mut Parser<'_, '_>) -> Marker {
        let outer = p.start();
        if let Event::Open { wrapper, .. } = &mut p.events[self.slot] {
            *wrapper = Some(outer.slot);
        }
        outer
    }
}

/// Parses markup into a lossless syntax tree.
pub fn parse(source: &str) -> SyntaxNode {
    let tokens = lex(source);
    Parser::new(&tokens).parse()
}
