//! Obstacle model - ice and box degradation shared by every removal path
//!
//! An obstacle takes at most one point of damage per pass, no matter how many removal
//! events touch it (a run hitting it from two sides, two sweeps crossing on it). A pass is
//! one removal step of the stabilization loop, or one complete helper activation.

use std::collections::HashSet;

use crate::board::Board;
use crate::types::{Pos, Tile, TileBody, TileId};

/// Result of damaging a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Damage {
    /// No obstacle here, or it was already damaged this pass
    None,
    /// Ice lost one strength; at `remaining == 0` the overlay is gone and the inner tile
    /// is playable, but stays on the board for this pass
    Ice { id: TileId, remaining: u8 },
    /// Box lost one strength and still stands
    Box { id: TileId, remaining: u8 },
    /// Box destroyed; its cell is now empty
    BoxCleared(Tile),
}

impl Damage {
    pub fn is_none(&self) -> bool {
        matches!(self, Damage::None)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObstacleModel {
    damaged: HashSet<Pos>,
}

impl ObstacleModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass; every obstacle may take damage again
    pub fn begin_pass(&mut self) {
        self.damaged.clear();
    }

    /// Whether `pos` holds ice or a box
    pub fn is_obstacle(board: &Board, pos: Pos) -> bool {
        board.tile(pos).is_some_and(Tile::is_locked)
    }

    /// Apply one point of damage to the obstacle at `pos`
    pub fn damage(&mut self, board: &mut Board, pos: Pos) -> Damage {
        if !Self::is_obstacle(board, pos) || self.damaged.contains(&pos) {
            return Damage::None;
        }
        self.damaged.insert(pos);

        let Some(tile) = board.tile_mut(pos) else {
            return Damage::None;
        };

        // Ice sits on top, so it absorbs the hit before anything under it.
        if tile.ice > 0 {
            tile.ice -= 1;
            return Damage::Ice {
                id: tile.id,
                remaining: tile.ice,
            };
        }

        let id = tile.id;
        match &mut tile.body {
            TileBody::Box { strength, .. } if *strength > 1 => {
                *strength -= 1;
                return Damage::Box {
                    id,
                    remaining: *strength,
                };
            }
            TileBody::Box { .. } => {}
            _ => return Damage::None,
        }

        match board.take(pos) {
            Some(tile) => Damage::BoxCleared(tile),
            None => Damage::None,
        }
    }
}
