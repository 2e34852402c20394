//! Shared builders for integration tests.
//!
//! Boards are written as ascii rows and turned into level descriptors, so every test goes
//! through the same JSON path a real level does:
//!
//! - lowercase letter: the element kind starting with that letter
//! - uppercase letter: the same kind under ice of strength 1
//! - `1` / `2`: a `"box"` of that strength
//! - `-` row clear, `|` column clear, `*` color bomb, `=` row clear under ice
//! - `#` hole, `?` random element tile

#![allow(dead_code)]

use serde_json::{json, Value};

use tile_cascade::core::{Board, EngineConfig, Game, LevelDescriptor, SimpleRng};
use tile_cascade::types::{BoardEvent, Pos, RemovalCause};

pub const KINDS: [&str; 5] = ["energy", "leaf", "water", "gem", "smartphone"];

pub fn cell(ch: char, kinds: &[&str]) -> Value {
    let kind = |c: char| {
        kinds
            .iter()
            .find(|k| k.starts_with(c))
            .unwrap_or_else(|| panic!("no kind for {c:?}"))
            .to_string()
    };
    match ch {
        '#' => json!(false),
        '?' => Value::Null,
        '1' | '2' => json!({"type": "box", "strength": ch.to_digit(10)}),
        '-' => json!({"type": "row_clear"}),
        '|' => json!({"type": "column_clear"}),
        '*' => json!({"type": "color_bomb"}),
        '=' => json!({"type": "ice", "strength": 1, "content": {"type": "row_clear"}}),
        c if c.is_ascii_uppercase() => json!({
            "type": "ice",
            "strength": 1,
            "content": {"type": kind(c.to_ascii_lowercase())}
        }),
        c => json!({"type": kind(c)}),
    }
}

pub fn level_json(rows: &[&str], kinds: &[&str], goals: &[(&str, u32)], moves: u32) -> Value {
    let grid: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| row.chars().map(|ch| cell(ch, kinds)).collect())
        .collect();
    let goals: Vec<Value> = goals
        .iter()
        .map(|(goal, target)| json!({"type": goal, "target": target}))
        .collect();
    json!({
        "moves": moves,
        "elementKinds": kinds,
        "rows": rows.len(),
        "cols": rows.first().map_or(0, |r| r.len()),
        "goals": goals,
        "initialGrid": grid,
    })
}

pub fn level(rows: &[&str], kinds: &[&str], goals: &[(&str, u32)], moves: u32) -> LevelDescriptor {
    serde_json::from_value(level_json(rows, kinds, goals, moves)).expect("valid level json")
}

/// Game over `rows` with the default kinds, seed 7
pub fn game(rows: &[&str], goals: &[(&str, u32)], moves: u32) -> Game {
    let level = level(rows, &KINDS, goals, moves);
    Game::from_level(&level, EngineConfig::default().with_seed(7)).expect("level builds")
}

/// Bare board over single-letter kinds `a`-`e`
pub fn board(rows: &[&str]) -> Board {
    let level = level(rows, &["a", "b", "c", "d", "e"], &[("a", 1)], 1);
    level.build(&mut SimpleRng::new(1), true).expect("level builds").board
}

/// Ascii view: kind initial, uppercase under ice, box strength, helper glyph, `#`, `.`
pub fn ascii(board: &Board) -> Vec<String> {
    use tile_cascade::types::{Cell, HelperKind, TileBody};

    (0..board.rows())
        .map(|r| {
            (0..board.cols())
                .map(|c| match board.get(Pos::new(r as i8, c as i8)) {
                    Some(Cell::Hole) => '#',
                    Some(Cell::Tile(tile)) => match &tile.body {
                        TileBody::Basic { kind } => {
                            let ch = kind.as_str().chars().next().unwrap_or('?');
                            if tile.is_iced() {
                                ch.to_ascii_uppercase()
                            } else {
                                ch
                            }
                        }
                        TileBody::Box { strength, .. } => char::from(b'0' + strength),
                        TileBody::Helper { helper } => match helper {
                            HelperKind::RowClear => '-',
                            HelperKind::ColumnClear => '|',
                            HelperKind::ColorBomb => '*',
                        },
                    },
                    _ => '.',
                })
                .collect()
        })
        .collect()
}

pub fn p(row: i8, col: i8) -> Pos {
    Pos::new(row, col)
}

pub fn removed(events: &[BoardEvent]) -> Vec<(Pos, RemovalCause)> {
    events
        .iter()
        .filter_map(|e| match e {
            BoardEvent::TileRemoved { pos, cause, .. } => Some((*pos, *cause)),
            _ => None,
        })
        .collect()
}

pub fn removed_by(events: &[BoardEvent], cause: RemovalCause) -> usize {
    removed(events).iter().filter(|(_, c)| *c == cause).count()
}

pub fn count_where(events: &[BoardEvent], pred: impl Fn(&BoardEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

pub fn goal_count(game: &Game, goal: &str) -> u32 {
    game.goals().iter().find(|g| g.goal == goal).map_or(0, |g| g.count)
}

pub fn tile_count(board: &Board) -> usize {
    board.tile_positions().count()
}
