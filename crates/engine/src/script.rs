//! Move scripts - one move per line
//!
//! ```text
//! # comments and blank lines are ignored
//! swap 3,3 3,4
//! tap 5,1
//! ```

use std::fmt;

use crate::types::{Move, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptErrorKind {
    UnknownCommand,
    WrongArity,
    BadPosition,
    NotAdjacent,
}

/// Parse failure with its 1-based line number (0 for a single parsed line)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub line: usize,
    pub kind: ScriptErrorKind,
    pub text: String,
}

impl ScriptError {
    fn new(kind: ScriptErrorKind, text: &str) -> Self {
        Self {
            line: 0,
            kind,
            text: text.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ScriptErrorKind::UnknownCommand => "unknown_command",
            ScriptErrorKind::WrongArity => "wrong_arity",
            ScriptErrorKind::BadPosition => "bad_position",
            ScriptErrorKind::NotAdjacent => "not_adjacent",
        }
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            ScriptErrorKind::UnknownCommand => "expected `swap` or `tap`",
            ScriptErrorKind::WrongArity => "swap takes two positions, tap takes one",
            ScriptErrorKind::BadPosition => "positions are written ROW,COL",
            ScriptErrorKind::NotAdjacent => "swap positions must be 4-adjacent",
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {} ({:?})", self.line, self.code(), self.message(), self.text)
    }
}

impl std::error::Error for ScriptError {}

/// Parse one move line
pub fn parse_move(line: &str) -> Result<Move, ScriptError> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match (command.to_lowercase().as_str(), args.as_slice()) {
        ("swap", [a, b]) => {
            let (a, b) = (parse_pos(a)?, parse_pos(b)?);
            if !a.is_adjacent(b) {
                return Err(ScriptError::new(ScriptErrorKind::NotAdjacent, line));
            }
            Ok(Move::Swap(a, b))
        }
        ("tap", [pos]) => Ok(Move::Activate(parse_pos(pos)?)),
        ("swap" | "tap", _) => Err(ScriptError::new(ScriptErrorKind::WrongArity, line)),
        _ => Err(ScriptError::new(ScriptErrorKind::UnknownCommand, line)),
    }
}

fn parse_pos(text: &str) -> Result<Pos, ScriptError> {
    let bad = || ScriptError::new(ScriptErrorKind::BadPosition, text);
    let (row, col) = text.split_once(',').ok_or_else(bad)?;
    let row = row.trim().parse().map_err(|_| bad())?;
    let col = col.trim().parse().map_err(|_| bad())?;
    Ok(Pos::new(row, col))
}

/// Parse a whole script, stopping at the first bad line
pub fn parse_script(text: &str) -> Result<Vec<Move>, ScriptError> {
    let mut moves = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let mv = parse_move(line).map_err(|mut e| {
            e.line = idx + 1;
            e
        })?;
        moves.push(mv);
    }
    Ok(moves)
}
