//! Elements, tags, attributes and character data.

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// One item of element content. Always consumes at least one token.
pub(super) fn content(p: &mut Parser<'_, '_>) {
    if p.at_tag_start() {
        element(p);
    } else if p.at(SyntaxKind::LT_SLASH) {
        let tag = end_tag(p);
        let m = tag.precede(p);
        m.complete(p, SyntaxKind::ERROR);
    } else {
        text_run(p);
    }
}

fn element(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let self_closing = start_tag(p);

    if !self_closing {
        while !p.at_end() {
            if p.at(SyntaxKind::LT_SLASH) {
                end_tag(p);
                break;
            }
            content(p);
        }
    }

    m.complete(p, SyntaxKind::ELEMENT);
}

/// Returns true for `<name/>`.
fn start_tag(p: &mut Parser<'_, '_>) -> bool {
    let m = p.start();
    p.bump(); // '<'
    p.bump(); // NAME

    let mut self_closing = false;
    loop {
        p.eat_trivia();
        match p.current() {
            SyntaxKind::NAME => attribute(p),
            SyntaxKind::GT => {
                p.bump();
                break;
            }
            SyntaxKind::SLASH_GT => {
                p.bump();
                self_closing = true;
                break;
            }
            // Next tag begins before this one closed
            SyntaxKind::LT | SyntaxKind::LT_SLASH | SyntaxKind::EOF => break,
            _ => {
                let err = p.start();
                p.bump();
                err.complete(p, SyntaxKind::ERROR);
            }
        }
    }

    m.complete(p, SyntaxKind::START_TAG);
    self_closing
}

fn attribute(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // NAME

    if p.nth(0) == SyntaxKind::EQ
        || (p.current().is_trivia() && p.nth(1) == SyntaxKind::EQ)
    {
        p.eat_trivia();
        p.bump(); // '='
        p.eat_trivia();
        if matches!(
            p.current(),
            SyntaxKind::STRING | SyntaxKind::NAME | SyntaxKind::TEXT
        ) {
            p.bump();
        }
    }

    m.complete(p, SyntaxKind::ATTRIBUTE);
}

fn end_tag(p: &mut Parser<'_, '_>) -> crate::parser::CompletedMarker {
    let m = p.start();
    p.bump(); // '</'
    p.eat_trivia();
    p.eat(SyntaxKind::NAME);
    p.eat_trivia();
    p.eat(SyntaxKind::GT);
    m.complete(p, SyntaxKind::END_TAG)
}

fn text_run(p: &mut Parser<'_, '_>) {
    let m = p.start();
    // The first token is always taken so a lone '<' cannot stall the loop
    p.bump();
    while !p.at_end() && !p.at_tag_start() && !p.at(SyntaxKind::LT_SLASH) {
        p.bump();
    }
    m.complete(p, SyntaxKind::TEXT_RUN);
}
