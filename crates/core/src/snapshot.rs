use serde::Serialize;

use crate::cascade::{Game, Phase};
use crate::goals::Goal;
use crate::types::{Cell, GameStatus};

/// Full render state of a game, row-major
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub rows: u8,
    pub cols: u8,
    pub cells: Vec<Vec<Cell>>,
    pub goals: Vec<Goal>,
    pub moves_remaining: u32,
    pub status: GameStatus,
    pub phase: Phase,
}

impl BoardSnapshot {
    pub fn capture(game: &Game) -> Self {
        let board = game.board();
        let cells = board
            .cells()
            .chunks(board.cols().max(1) as usize)
            .map(<[Cell]>::to_vec)
            .collect();
        Self {
            rows: board.rows(),
            cols: board.cols(),
            cells,
            goals: game.goals().to_vec(),
            moves_remaining: game.moves_remaining(),
            status: game.status(),
            phase: game.phase(),
        }
    }

    /// Accepting moves right now
    pub fn playable(&self) -> bool {
        self.status == GameStatus::Playing && self.phase == Phase::Idle
    }

    pub fn tile_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.tile().is_some()).count()
    }
}
