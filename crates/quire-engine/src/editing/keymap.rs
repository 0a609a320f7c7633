//! Key handler tables, one per selection mode.
//!
//! Text mode (text and node selections) and block-browse mode (block
//! selections) have separate tables. `Mod` stands for Ctrl or Cmd.

use std::fmt;
use std::str::FromStr;

use crate::citation;
use crate::model::Mark;

use super::commands::{self, Command};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Ctrl or Cmd.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press, or a binding when it comes from a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl Key {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers {
                shift: false,
                ctrl: false,
                meta: false,
                alt: false,
            },
        }
    }

    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    pub const fn shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    /// Adds `Mod`, matched by Ctrl or Cmd.
    pub const fn primary(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    /// Whether the pressed key `other` triggers this binding.
    pub fn matches(&self, other: &Key) -> bool {
        let same_code = match (self.code, other.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        };
        same_code
            && self.modifiers.shift == other.modifiers.shift
            && self.modifiers.alt == other.modifiers.alt
            && self.modifiers.primary() == other.modifiers.primary()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseKeyError {
    #[error("empty key literal")]
    Empty,

    #[error("unknown modifier '{0}'")]
    Modifier(String),

    #[error("unknown key '{0}'")]
    Key(String),
}

/// Parses bindings written like `Mod-Shift-ArrowUp`, `Shift-Tab` or `b`.
impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseKeyError::Empty);
        }
        let mut tokens: Vec<&str> = trimmed.split('-').collect();
        let key_token = match tokens.pop() {
            // "Mod--" binds the minus key.
            Some("") if trimmed.ends_with("--") || trimmed == "-" => {
                tokens.pop();
                "-"
            }
            Some(token) => token,
            None => return Err(ParseKeyError::Empty),
        };

        let mut modifiers = Modifiers::default();
        for token in tokens.into_iter().filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "mod" | "ctrl" | "control" => modifiers.ctrl = true,
                "cmd" | "meta" => modifiers.meta = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                _ => return Err(ParseKeyError::Modifier(token.to_string())),
            }
        }
        Ok(Key {
            code: parse_code(key_token)?,
            modifiers,
        })
    }
}

fn parse_code(token: &str) -> Result<KeyCode, ParseKeyError> {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }
    match token.to_ascii_lowercase().as_str() {
        "enter" => Ok(KeyCode::Enter),
        "escape" | "esc" => Ok(KeyCode::Escape),
        "backspace" => Ok(KeyCode::Backspace),
        "delete" => Ok(KeyCode::Delete),
        "tab" => Ok(KeyCode::Tab),
        "space" => Ok(KeyCode::Char(' ')),
        "arrowup" | "up" => Ok(KeyCode::ArrowUp),
        "arrowdown" | "down" => Ok(KeyCode::ArrowDown),
        "arrowleft" | "left" => Ok(KeyCode::ArrowLeft),
        "arrowright" | "right" => Ok(KeyCode::ArrowRight),
        _ => Err(ParseKeyError::Key(token.to_string())),
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.primary() {
            f.write_str("Mod-")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt-")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift-")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// What a bound key does.
#[derive(Clone, Copy)]
pub enum Action {
    /// The first command that applies.
    Run(&'static [Command]),
    ToggleMark(Mark),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Run(chain) => write!(f, "Run({} command(s))", chain.len()),
            Action::ToggleMark(mark) => write!(f, "ToggleMark({})", mark.name()),
        }
    }
}

/// Bindings of one mode, checked in order.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: Vec<(Key, Action)>,
}

impl KeyMap {
    pub fn bind(&mut self, key: Key, action: Action) -> &mut Self {
        self.bindings.push((key, action));
        self
    }

    pub fn lookup(&self, pressed: &Key) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(key, _)| key.matches(pressed))
            .map(|(_, action)| *action)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

const INDENT: &[Command] = &[commands::indent];
const UNINDENT: &[Command] = &[commands::unindent];
const ENTER: &[Command] = &[commands::enter];
const BACKSPACE: &[Command] = &[commands::backspace, commands::delete_char_backward];
const DELETE: &[Command] = &[commands::delete_forward, commands::delete_char_forward];
const ESCAPE: &[Command] = &[commands::enter_block_browse];
const ARROW_RIGHT: &[Command] = &[citation::arrow_right];
const ARROW_LEFT: &[Command] = &[citation::arrow_left];
const SELECT_ALL: &[Command] = &[commands::select_all_blocks];

const EXIT_BROWSE: &[Command] = &[commands::exit_block_browse];
const BROWSE_UP: &[Command] = &[commands::browse_up];
const BROWSE_DOWN: &[Command] = &[commands::browse_down];
const EXPAND_UP: &[Command] = &[commands::browse_expand_up];
const EXPAND_DOWN: &[Command] = &[commands::browse_expand_down];
const BROWSE_LEFT: &[Command] = &[commands::browse_left];
const BROWSE_RIGHT: &[Command] = &[commands::browse_right];
const MOVE_UP: &[Command] = &[commands::move_blocks_up];
const MOVE_DOWN: &[Command] = &[commands::move_blocks_down];
const BROWSE_INDENT: &[Command] = &[commands::browse_indent];
const BROWSE_UNINDENT: &[Command] = &[commands::browse_unindent];
const BROWSE_DELETE: &[Command] = &[commands::browse_delete];

/// Bindings while editing text.
pub fn text_handlers() -> KeyMap {
    let mut map = KeyMap::default();
    map.bind(Key::new(KeyCode::Tab), Action::Run(INDENT))
        .bind(Key::new(KeyCode::Tab).shift(), Action::Run(UNINDENT))
        .bind(Key::new(KeyCode::Enter), Action::Run(ENTER))
        .bind(Key::new(KeyCode::Backspace), Action::Run(BACKSPACE))
        .bind(Key::new(KeyCode::Delete), Action::Run(DELETE))
        .bind(Key::new(KeyCode::Escape), Action::Run(ESCAPE))
        .bind(Key::new(KeyCode::ArrowRight), Action::Run(ARROW_RIGHT))
        .bind(Key::new(KeyCode::ArrowLeft), Action::Run(ARROW_LEFT))
        .bind(Key::char('b').primary(), Action::ToggleMark(Mark::Bold))
        .bind(Key::char('i').primary(), Action::ToggleMark(Mark::Italic))
        .bind(Key::char('u').primary(), Action::ToggleMark(Mark::Underline))
        .bind(Key::char('a').primary(), Action::Run(SELECT_ALL));
    map
}

/// Bindings while browsing blocks. Keys not listed here are swallowed.
pub fn browse_handlers() -> KeyMap {
    let mut map = KeyMap::default();
    map.bind(Key::new(KeyCode::Enter), Action::Run(EXIT_BROWSE))
        .bind(Key::new(KeyCode::Escape), Action::Run(EXIT_BROWSE))
        .bind(Key::new(KeyCode::ArrowUp).primary().shift(), Action::Run(MOVE_UP))
        .bind(Key::new(KeyCode::ArrowDown).primary().shift(), Action::Run(MOVE_DOWN))
        .bind(Key::new(KeyCode::ArrowUp).shift(), Action::Run(EXPAND_UP))
        .bind(Key::new(KeyCode::ArrowDown).shift(), Action::Run(EXPAND_DOWN))
        .bind(Key::new(KeyCode::ArrowUp), Action::Run(BROWSE_UP))
        .bind(Key::new(KeyCode::ArrowDown), Action::Run(BROWSE_DOWN))
        .bind(Key::new(KeyCode::ArrowLeft), Action::Run(BROWSE_LEFT))
        .bind(Key::new(KeyCode::ArrowRight), Action::Run(BROWSE_RIGHT))
        .bind(Key::new(KeyCode::Tab), Action::Run(BROWSE_INDENT))
        .bind(Key::new(KeyCode::Tab).shift(), Action::Run(BROWSE_UNINDENT))
        .bind(Key::new(KeyCode::Backspace), Action::Run(BROWSE_DELETE))
        .bind(Key::new(KeyCode::Delete), Action::Run(BROWSE_DELETE))
        .bind(Key::char('a').primary(), Action::Run(SELECT_ALL));
    map
}
