use log::debug;

use crate::core::matcher::{find_matches, swap_candidates};
use crate::core::{Board, Game, Phase};
use crate::types::{HelperKind, Move, Pos, Tile};

/// Suggest a move for the current board.
///
/// Prefers the plain swap producing the most run tiles, then a helper tap (color bombs
/// first). `None` while a move is resolving, once the game is over, or on a dead board.
pub fn suggest_move(game: &Game) -> Option<Move> {
    if game.phase() != Phase::Idle || game.status().is_terminal() {
        return None;
    }
    let board = game.board();
    if let Some((a, b)) = best_swap(board) {
        return Some(Move::Swap(a, b));
    }
    helper_tap(board).map(Move::Activate)
}

/// Plain (helper-free) swap with the largest total run length, first found on ties
pub fn best_swap(board: &Board) -> Option<(Pos, Pos)> {
    let is_helper = |p: Pos| board.tile(p).and_then(Tile::free_helper).is_some();
    let mut scratch = board.clone();
    let mut best: Option<((Pos, Pos), usize)> = None;

    for (a, b) in swap_candidates(board) {
        if is_helper(a) || is_helper(b) || !scratch.swap(a, b) {
            continue;
        }
        let score: usize = find_matches(&scratch).iter().map(|r| r.len()).sum();
        scratch.swap(a, b);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some(((a, b), score));
        }
    }

    if let Some(((a, b), score)) = best {
        debug!("[Hint] swap {} <-> {} scores {}", a, b, score);
    }
    best.map(|(swap, _)| swap)
}

/// First free helper in row-major order, color bombs before line helpers
pub fn helper_tap(board: &Board) -> Option<Pos> {
    let helpers: Vec<(Pos, HelperKind)> = board
        .tile_positions()
        .filter_map(|p| board.tile(p).and_then(Tile::free_helper).map(|h| (p, h)))
        .collect();
    helpers
        .iter()
        .find(|(_, h)| *h == HelperKind::ColorBomb)
        .or_else(|| helpers.first())
        .map(|&(p, _)| p)
}
