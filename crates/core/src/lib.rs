//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains every rule of the tile resolution engine. It has **zero
//! dependencies** on rendering, input or I/O, making it:
//!
//! - **Deterministic**: Same seed and move sequence produce identical games
//! - **Testable**: Unit tests next to every rule
//! - **Portable**: Any presentation layer can drive it from [`BoardEvent`](types::BoardEvent)s
//!
//! # Module Structure
//!
//! - [`board`]: grid storage, hole mask, swap/take/drop/refill primitives
//! - [`matcher`]: run detection and the speculative-swap move finder
//! - [`obstacle`]: ice and box degradation, one hit per pass
//! - [`removal`]: the shared removal path (events, goal counting, win latch)
//! - [`helpers`]: row/column clears, color bombs and breadth-first chains
//! - [`goals`]: goal counters, move budget, win/lose
//! - [`cascade`]: [`Game`], the phased stabilization loop and reshuffle
//! - [`level`]: JSON level descriptors and board construction
//! - [`config`], [`rng`], [`snapshot`]
//!
//! # Rules
//!
//! - **Runs**: 3+ identical ice-free element tiles in a row or column are removed
//! - **Helpers**: a run of 4 leaves a line clear (perpendicular to the run), 5+ a color bomb
//! - **Obstacles**: removals damage adjacent ice and boxes; each takes one hit per pass
//! - **Cascades**: survivors fall, empty cells refill, and detection repeats until stable
//! - **Reshuffle**: a board with no move left is re-randomized, obstacles untouched
//!
//! # Example
//!
//! ```
//! use tile_cascade_core::{EngineConfig, Game, LevelDescriptor};
//! use tile_cascade_core::types::{GameStatus, Move, Pos};
//!
//! let level = LevelDescriptor::from_json(r#"{
//!     "moves": 5,
//!     "elementKinds": ["a", "b", "c"],
//!     "rows": 6, "cols": 6,
//!     "goals": [{"type": "a", "target": 30}]
//! }"#).unwrap();
//!
//! let mut game = Game::from_level(&level, EngineConfig::default().with_seed(42)).unwrap();
//! assert!(game.has_available_moves());
//!
//! // Out-of-range moves are rejected without touching the board
//! assert!(game.resolve_move(Move::Activate(Pos::new(9, 9))).is_err());
//! assert_eq!(game.moves_remaining(), 5);
//! assert_eq!(game.status(), GameStatus::Playing);
//! ```

pub mod board;
pub mod cascade;
pub mod config;
pub mod goals;
pub mod helpers;
pub mod level;
pub mod matcher;
pub mod obstacle;
pub mod removal;
pub mod rng;
pub mod snapshot;

pub use tile_cascade_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, TileMove};
pub use cascade::{Game, MoveError, MoveOutcome, MoveReport, Phase};
pub use config::EngineConfig;
pub use goals::{Goal, GoalTracker};
pub use helpers::{HelperEngine, HelperState};
pub use level::{CellSpec, GoalSpec, LevelDescriptor, LevelError, LevelSetup, TileSpec};
pub use matcher::{find_matches, find_matching_swap, has_available_moves, Run};
pub use obstacle::{Damage, ObstacleModel};
pub use rng::SimpleRng;
pub use snapshot::BoardSnapshot;
