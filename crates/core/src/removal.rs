//! Removal context - the single path through which tiles leave a live board
//!
//! Matches, helper sweeps, color-bomb picks and board clears all remove tiles through
//! [`RemovalContext`], so obstacle damage, goal counting, win detection and delta events
//! behave the same no matter what caused the removal.

use log::debug;

use crate::board::Board;
use crate::goals::GoalTracker;
use crate::obstacle::{Damage, ObstacleModel};
use crate::rng::SimpleRng;
use crate::types::{BoardEvent, ObstacleKind, Pos, RemovalCause, Tile, TileBody};

/// Goal type a removed tile counts toward, if any
pub fn goal_type(tile: &Tile) -> Option<String> {
    match &tile.body {
        TileBody::Basic { kind } => Some(kind.as_str().to_string()),
        TileBody::Box { kind, .. } => Some(kind.full_goal()),
        TileBody::Helper { .. } => None,
    }
}

/// What a direct hit did to a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// Hole, empty cell, or an obstacle already damaged this pass
    Nothing,
    /// An obstacle absorbed the hit (possibly destroyed, never counted as a plain removal)
    Absorbed,
    Removed(Tile),
}

/// Mutable view over everything a removal touches
pub struct RemovalContext<'a> {
    pub board: &'a mut Board,
    pub obstacles: &'a mut ObstacleModel,
    pub goals: &'a mut GoalTracker,
    pub events: &'a mut Vec<BoardEvent>,
    pub rng: &'a mut SimpleRng,
}

impl RemovalContext<'_> {
    pub fn emit(&mut self, event: BoardEvent) {
        self.events.push(event);
    }

    /// Take the tile at `pos` off the board, emit its removal and count it
    pub fn remove(&mut self, pos: Pos, cause: RemovalCause) -> Option<Tile> {
        let tile = self.board.take(pos)?;
        self.emit(BoardEvent::TileRemoved {
            id: tile.id,
            pos,
            cause,
        });
        if cause != RemovalCause::Reshuffle {
            if let Some(goal) = goal_type(&tile) {
                self.count(&goal);
            }
        }
        Some(tile)
    }

    /// One point of obstacle damage at `pos` (no-op for plain cells)
    pub fn damage(&mut self, pos: Pos) -> Damage {
        let damage = self.obstacles.damage(self.board, pos);
        match &damage {
            Damage::None => {}
            Damage::Ice { id, remaining } => {
                self.emit(BoardEvent::ObstacleDamaged {
                    id: *id,
                    pos,
                    obstacle: ObstacleKind::Ice,
                    remaining: *remaining,
                });
            }
            Damage::Box { id, remaining } => {
                self.emit(BoardEvent::ObstacleDamaged {
                    id: *id,
                    pos,
                    obstacle: ObstacleKind::Box,
                    remaining: *remaining,
                });
            }
            Damage::BoxCleared(tile) => {
                debug!("[Obstacle] box {:?} cleared at {}", tile.id, pos);
                self.emit(BoardEvent::ObstacleDamaged {
                    id: tile.id,
                    pos,
                    obstacle: ObstacleKind::Box,
                    remaining: 0,
                });
                self.emit(BoardEvent::TileRemoved {
                    id: tile.id,
                    pos,
                    cause: RemovalCause::BoxCleared,
                });
                if let Some(goal) = goal_type(tile) {
                    self.count(&goal);
                }
            }
        }
        damage
    }

    /// Direct hit (sweep, color-bomb pick): obstacles absorb it, plain tiles are removed
    pub fn hit(&mut self, pos: Pos, cause: RemovalCause) -> Hit {
        if ObstacleModel::is_obstacle(self.board, pos) {
            return if self.damage(pos).is_none() {
                Hit::Nothing
            } else {
                Hit::Absorbed
            };
        }
        match self.remove(pos, cause) {
            Some(tile) => Hit::Removed(tile),
            None => Hit::Nothing,
        }
    }

    /// Increment goals of `goal_type` and latch a win as soon as it happens
    pub fn count(&mut self, goal_type: &str) {
        for goal in self.goals.record(goal_type) {
            self.events.push(BoardEvent::GoalProgress {
                goal: goal.goal,
                count: goal.count,
                target: goal.target,
            });
        }
        if let Some(status) = self.goals.check_win() {
            self.events.push(BoardEvent::GameOver { status });
        }
    }
}
