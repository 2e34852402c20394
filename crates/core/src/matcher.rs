//! Match detection - runs of three or more identical matchable tiles
//!
//! Rows are scanned left to right first, then columns top to bottom. A cell is matchable
//! when it holds an ice-free Basic tile; holes, empty cells, helpers, boxes and iced tiles
//! all break a streak. Runs are axis-pure: a tile may sit in one horizontal and one vertical
//! run at once, and callers dedupe removal by position.

use crate::board::Board;
use crate::types::{
    Axis, HelperKind, Kind, Pos, COLOR_BOMB_RUN_LEN, LINE_HELPER_RUN_LEN, MIN_RUN_LEN,
};

/// A contiguous same-kind sequence along one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub axis: Axis,
    pub kind: Kind,
    /// Cells in scan order (left to right, or top to bottom)
    pub cells: Vec<Pos>,
}

impl Run {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    /// Middle tile, the default helper spawn cell
    pub fn middle(&self) -> Option<Pos> {
        self.cells.get(self.cells.len() / 2).copied()
    }

    /// Helper this run spawns when removed, if any
    pub fn helper(&self) -> Option<HelperKind> {
        match self.len() {
            n if n >= COLOR_BOMB_RUN_LEN => Some(HelperKind::ColorBomb),
            LINE_HELPER_RUN_LEN => Some(self.axis.line_helper()),
            _ => None,
        }
    }
}

/// Find every run on the board (rows first, then columns)
pub fn find_matches(board: &Board) -> Vec<Run> {
    let mut runs = Vec::new();
    for row in 0..board.rows() {
        let line = (0..board.cols()).map(|c| Pos::new(row as i8, c as i8));
        scan_line(board, line, Axis::Horizontal, &mut runs);
    }
    for col in 0..board.cols() {
        let line = (0..board.rows()).map(|r| Pos::new(r as i8, col as i8));
        scan_line(board, line, Axis::Vertical, &mut runs);
    }
    runs
}

fn scan_line(board: &Board, line: impl Iterator<Item = Pos>, axis: Axis, out: &mut Vec<Run>) {
    let mut streak: Vec<Pos> = Vec::new();
    let mut streak_kind: Option<&Kind> = None;

    for pos in line {
        let kind = board.tile(pos).and_then(|t| t.matchable_kind());
        if kind.is_some() && kind == streak_kind {
            streak.push(pos);
            continue;
        }
        flush(&mut streak, streak_kind, axis, out);
        streak_kind = kind;
        if kind.is_some() {
            streak.push(pos);
        }
    }
    flush(&mut streak, streak_kind, axis, out);
}

fn flush(streak: &mut Vec<Pos>, kind: Option<&Kind>, axis: Axis, out: &mut Vec<Run>) {
    if let Some(kind) = kind {
        if streak.len() >= MIN_RUN_LEN {
            out.push(Run {
                axis,
                kind: kind.clone(),
                cells: std::mem::take(streak),
            });
        }
    }
    streak.clear();
}

/// Whether the tile at `pos` is part of a run in either axis
pub fn has_run_through(board: &Board, pos: Pos) -> bool {
    let Some(kind) = board.tile(pos).and_then(|t| t.matchable_kind()) else {
        return false;
    };

    let same = |p: Pos| board.tile(p).and_then(|t| t.matchable_kind()) == Some(kind);
    let reach = |dr: i8, dc: i8| {
        let mut n = 0;
        let mut p = pos.offset(dr, dc);
        while same(p) {
            n += 1;
            p = p.offset(dr, dc);
        }
        n
    };

    1 + reach(0, -1) + reach(0, 1) >= MIN_RUN_LEN || 1 + reach(-1, 0) + reach(1, 0) >= MIN_RUN_LEN
}

/// Adjacent pairs (right and down neighbors) that could be swapped
pub fn swap_candidates(board: &Board) -> impl Iterator<Item = (Pos, Pos)> + '_ {
    board.positions().flat_map(move |a| {
        [a.offset(0, 1), a.offset(1, 0)]
            .into_iter()
            .filter(move |&b| board.can_swap(a, b))
            .map(move |b| (a, b))
    })
}

/// First adjacent swap that produces a run, by speculative swapping on a scratch board
pub fn find_matching_swap(board: &Board) -> Option<(Pos, Pos)> {
    let mut scratch = board.clone();
    for (a, b) in swap_candidates(board) {
        if !scratch.swap(a, b) {
            continue;
        }
        let hit = has_run_through(&scratch, a) || has_run_through(&scratch, b);
        scratch.swap(a, b);
        if hit {
            return Some((a, b));
        }
    }
    None
}

/// Whether the player has any move-consuming move.
///
/// An untouched helper can always be swapped or tapped; otherwise some swap must produce
/// a run. The board itself is never mutated.
pub fn has_available_moves(board: &Board) -> bool {
    let has_helper = board
        .tile_positions()
        .any(|p| board.tile(p).and_then(|t| t.free_helper()).is_some());
    has_helper || find_matching_swap(board).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(runs: &[Run]) -> Vec<Vec<(i8, i8)>> {
        runs.iter()
            .map(|r| r.cells.iter().map(|p| (p.row, p.col)).collect())
            .collect()
    }

    #[test]
    fn test_horizontal_and_vertical_runs() {
        let board = Board::from_ascii(&[
            "aaab", //
            "cdeb", //
            "cdfb", //
        ]);
        let runs = find_matches(&board);
        assert_eq!(cells(&runs), vec![vec![(0, 0), (0, 1), (0, 2)], vec![(0, 3), (1, 3), (2, 3)]]);
        assert_eq!(runs[0].axis, Axis::Horizontal);
        assert_eq!(runs[1].axis, Axis::Vertical);
    }

    #[test]
    fn test_breaks_on_hole_ice_helper_and_box() {
        for row in ["aa#aa", "aaAaa", "aa-aa", "aa1aa", "aa.aa"] {
            let board = Board::from_ascii(&[row]);
            assert!(find_matches(&board).is_empty(), "row {row} should not match");
        }
    }

    #[test]
    fn test_streak_restarts_after_break() {
        let board = Board::from_ascii(&["abbbba"]);
        let runs = find_matches(&board);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len(), 4);
        assert_eq!(runs[0].kind, Kind::new("b"));
    }

    #[test]
    fn test_intersecting_runs_are_not_merged() {
        let board = Board::from_ascii(&[
            "bab", //
            "aaa", //
            "bab", //
        ]);
        let runs = find_matches(&board);
        assert_eq!(runs.len(), 2);
        assert!(runs.iter().all(|r| r.contains(Pos::new(1, 1))));
    }

    #[test]
    fn test_run_classification() {
        let board = Board::from_ascii(&["aaabb", "bbbbc", "ccccc"]);
        let runs = find_matches(&board);
        assert_eq!(runs[0].helper(), None);
        assert_eq!(runs[1].helper(), Some(HelperKind::ColumnClear));
        assert_eq!(runs[2].helper(), Some(HelperKind::ColorBomb));

        let vertical = Board::from_ascii(&["a", "a", "a", "a"]);
        assert_eq!(find_matches(&vertical)[0].helper(), Some(HelperKind::RowClear));
    }

    #[test]
    fn test_middle() {
        let board = Board::from_ascii(&["aaaa"]);
        let runs = find_matches(&board);
        assert_eq!(runs[0].middle(), Some(Pos::new(0, 2)));
    }

    #[test]
    fn test_has_run_through() {
        let board = Board::from_ascii(&["aaba", "cacc", "dadd"]);
        assert!(has_run_through(&board, Pos::new(1, 1)));
        assert!(has_run_through(&board, Pos::new(0, 1)));
        assert!(!has_run_through(&board, Pos::new(0, 2)));
        assert!(!has_run_through(&board, Pos::new(1, 0)));
    }

    #[test]
    fn test_find_matching_swap() {
        let board = Board::from_ascii(&["aab", "bca", "cbc"]);
        let found = find_matching_swap(&board);
        assert!(found.is_some());

        let mut after = board.clone();
        let (a, b) = found.unwrap();
        assert!(after.swap(a, b));
        assert!(!find_matches(&after).is_empty());
    }

    #[test]
    fn test_no_available_moves_and_no_mutation() {
        let board = Board::from_ascii(&["abc", "def", "ghi"]);
        let before = board.clone();
        assert!(!has_available_moves(&board));
        assert_eq!(board, before);
    }

    #[test]
    fn test_free_helper_counts_as_available() {
        let board = Board::from_ascii(&["abc", "d-f", "ghi"]);
        assert!(has_available_moves(&board));

        let iced_only = Board::from_ascii(&["abc", "def", "GhI"]);
        assert!(!has_available_moves(&iced_only));
    }

    #[test]
    fn test_locked_pairs_are_skipped() {
        // Swapping the iced `A` down would make a column of a's, but iced tiles can't move.
        let board = Board::from_ascii(&["bAb", "cac", "bab"]);
        assert_eq!(find_matching_swap(&board), None);
    }
}
