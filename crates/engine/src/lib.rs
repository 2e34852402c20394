//! Engine services built on top of the core rules: move hints and move scripts.

pub use tile_cascade_core as core;
pub use tile_cascade_types as types;

pub mod hint;
pub mod script;

pub use hint::{best_swap, helper_tap, suggest_move};
pub use script::{parse_move, parse_script, ScriptError, ScriptErrorKind};

#[cfg(test)]
mod test_support {
    use crate::core::{Board, EngineConfig, Game, Goal};
    use crate::types::{HelperKind, Kind, Pos, TileBody};

    /// Game over an ascii board: `a`-`z` elements, `A`-`Z` iced, `1`/`2` boxes,
    /// `-` `|` `*` helpers, `#` hole, `.` empty
    pub fn game(rows: &[&str]) -> Game {
        let height = rows.len() as u8;
        let width = rows.first().map_or(0, |r| r.len()) as u8;
        let cells = || {
            rows.iter().enumerate().flat_map(|(r, line)| {
                line.chars()
                    .enumerate()
                    .map(move |(c, ch)| (Pos::new(r as i8, c as i8), ch))
            })
        };

        let holes = cells().filter(|&(_, ch)| ch == '#').map(|(p, _)| p);
        let mut board = Board::with_holes(height, width, holes);
        for (pos, ch) in cells() {
            let (body, ice) = match ch {
                '#' | '.' => continue,
                '-' => (TileBody::Helper { helper: HelperKind::RowClear }, 0),
                '|' => (TileBody::Helper { helper: HelperKind::ColumnClear }, 0),
                '*' => (TileBody::Helper { helper: HelperKind::ColorBomb }, 0),
                '1' | '2' => (
                    TileBody::Box {
                        kind: Kind::new("box"),
                        strength: if ch == '1' { 1 } else { 2 },
                    },
                    0,
                ),
                c => (
                    TileBody::Basic {
                        kind: Kind::new(c.to_ascii_lowercase().to_string()),
                    },
                    u8::from(c.is_ascii_uppercase()),
                ),
            };
            let tile = board.spawn(body, ice);
            board.place(pos, tile);
        }

        let kinds = ["a", "b", "c", "d", "e"].into_iter().map(Kind::new).collect();
        Game::from_parts(board, kinds, vec![Goal::new("a", 10)], 10, EngineConfig::default())
            .unwrap()
    }
}
