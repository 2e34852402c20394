//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data (serde-serializable, no behavior beyond small helpers),
//! making them usable in any context (core rules, presentation, tooling).
//!
//! # Coordinates
//!
//! Boards are `rows x cols` grids addressed by [`Pos`]:
//!
//! - **row**: 0 is the top row, increasing downward
//! - **col**: 0 is the left column, increasing rightward
//!
//! # Rule Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_RUN_LEN` | 3 | Shortest run that is removed |
//! | `LINE_HELPER_RUN_LEN` | 4 | Run length that spawns a row/column helper |
//! | `COLOR_BOMB_RUN_LEN` | 5 | Run length (and above) that spawns a color bomb |
//! | `MAX_OBSTACLE_STRENGTH` | 2 | Highest ice/box strength a level may author |
//! | `MAX_BOARD_DIM` | 32 | Largest accepted row/column count |
//! | `MIN_ELEMENT_KINDS` | 2 | Fewest element kinds a level may configure |
//!
//! # Examples
//!
//! ```
//! use tile_cascade_types::{Axis, HelperKind, Kind, Move, Pos};
//!
//! // Positions and adjacency
//! let a = Pos::new(3, 3);
//! let b = Pos::new(3, 4);
//! assert!(a.is_adjacent(b));
//! assert!(Move::Swap(a, b).is_well_formed());
//!
//! // A horizontal run of four clears the perpendicular line
//! assert_eq!(Axis::Horizontal.line_helper(), HelperKind::ColumnClear);
//!
//! // Box goals use the "<kind>_full" form
//! assert_eq!(Kind::new("box").full_goal(), "box_full");
//!
//! // Parse helper names
//! assert_eq!(HelperKind::from_str("color_bomb"), Some(HelperKind::ColorBomb));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shortest run that is removed
pub const MIN_RUN_LEN: usize = 3;

/// Run length that spawns a row/column helper
pub const LINE_HELPER_RUN_LEN: usize = 4;

/// Run length (and above) that spawns a color bomb
pub const COLOR_BOMB_RUN_LEN: usize = 5;

/// Highest ice/box strength accepted at level load
pub const MAX_OBSTACLE_STRENGTH: u8 = 2;

/// Largest accepted row/column count
pub const MAX_BOARD_DIM: u8 = 32;

/// Fewest element kinds a level may configure (refill needs a real choice)
pub const MIN_ELEMENT_KINDS: usize = 2;

/// Default cap on reshuffle attempts before giving up
pub const DEFAULT_RESHUFFLE_LIMIT: u32 = 1000;

/// Suffix appended to a box kind to form its goal type
pub const FULL_GOAL_SUFFIX: &str = "_full";

/// A grid position, `row` 0 at the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: i8,
    pub col: i8,
}

impl Pos {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Position shifted by `(dr, dc)`; may be out of bounds
    pub fn offset(self, dr: i8, dc: i8) -> Self {
        Self {
            row: self.row.saturating_add(dr),
            col: self.col.saturating_add(dc),
        }
    }

    /// True when `other` is one step away horizontally or vertically
    pub fn is_adjacent(self, other: Pos) -> bool {
        let dr = (self.row as i16 - other.row as i16).abs();
        let dc = (self.col as i16 - other.col as i16).abs();
        dr + dc == 1
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Scan axis of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Line helper spawned by a run of four along this axis.
    ///
    /// The orientation is the opposite of the run, so the helper clears the
    /// perpendicular line through the spawn cell.
    pub fn line_helper(self) -> HelperKind {
        match self {
            Axis::Horizontal => HelperKind::ColumnClear,
            Axis::Vertical => HelperKind::RowClear,
        }
    }
}

/// Element identifier configured by a level ("energy", "smartphone", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(String);

impl Kind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Goal type counted when a box of this kind is fully cleared
    pub fn full_goal(&self) -> String {
        format!("{}{}", self.0, FULL_GOAL_SUFFIX)
    }
}

impl From<&str> for Kind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Special tiles produced by long runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelperKind {
    /// Clears its whole row when triggered
    RowClear,
    /// Clears its whole column when triggered
    ColumnClear,
    /// Clears every tile of one kind when triggered
    ColorBomb,
}

impl HelperKind {
    /// Parse helper name (case-insensitive, snake_case)
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_cascade_types::HelperKind;
    ///
    /// assert_eq!(HelperKind::from_str("row_clear"), Some(HelperKind::RowClear));
    /// assert_eq!(HelperKind::from_str("COLUMN_CLEAR"), Some(HelperKind::ColumnClear));
    /// assert_eq!(HelperKind::from_str("rocket"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "row_clear" => Some(HelperKind::RowClear),
            "column_clear" => Some(HelperKind::ColumnClear),
            "color_bomb" => Some(HelperKind::ColorBomb),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HelperKind::RowClear => "row_clear",
            HelperKind::ColumnClear => "column_clear",
            HelperKind::ColorBomb => "color_bomb",
        }
    }
}

/// Stable identity of a tile for presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u32);

/// What a tile is, independent of any ice overlay
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TileBody {
    /// Matchable element tile
    Basic { kind: Kind },
    /// Row/column clear or color bomb
    Helper { helper: HelperKind },
    /// Obstacle; degrades when removals happen next to it
    Box { kind: Kind, strength: u8 },
}

/// A tile occupying a cell.
///
/// `ice > 0` is an ice overlay of that strength bound to the body. Iced tiles
/// cannot be swapped, never match and are only damaged (not removed) by
/// removal events until the overlay is gone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub body: TileBody,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ice: u8,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

impl Tile {
    pub fn new(id: TileId, body: TileBody) -> Self {
        Self { id, body, ice: 0 }
    }

    pub fn with_ice(mut self, strength: u8) -> Self {
        self.ice = strength;
        self
    }

    pub fn is_iced(&self) -> bool {
        self.ice > 0
    }

    pub fn is_box(&self) -> bool {
        matches!(self.body, TileBody::Box { .. })
    }

    /// Locked tiles (boxes, anything under ice) cannot be the subject of a swap
    pub fn is_locked(&self) -> bool {
        self.is_iced() || self.is_box()
    }

    /// Kind used by run detection; `None` for helpers, boxes and iced tiles
    pub fn matchable_kind(&self) -> Option<&Kind> {
        if self.is_iced() {
            return None;
        }
        match &self.body {
            TileBody::Basic { kind } => Some(kind),
            _ => None,
        }
    }

    /// Helper variant of an untouched (ice-free) helper tile
    pub fn free_helper(&self) -> Option<HelperKind> {
        if self.is_iced() {
            return None;
        }
        match self.body {
            TileBody::Helper { helper } => Some(helper),
            _ => None,
        }
    }

    /// Element kind of a Basic body, iced or not
    pub fn basic_kind(&self) -> Option<&Kind> {
        match &self.body {
            TileBody::Basic { kind } => Some(kind),
            _ => None,
        }
    }
}

/// One grid position's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "cell", content = "tile", rename_all = "snake_case")]
pub enum Cell {
    /// Permanently unplayable; never matched, dropped into, or filled
    Hole,
    /// Transient gap between removal and refill
    Empty,
    Tile(Tile),
}

impl Cell {
    pub fn tile(&self) -> Option<&Tile> {
        match self {
            Cell::Tile(tile) => Some(tile),
            _ => None,
        }
    }

    pub fn is_hole(&self) -> bool {
        matches!(self, Cell::Hole)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// A move request from any source (pointer, AI, replay)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    /// Swap two 4-adjacent cells
    Swap(Pos, Pos),
    /// Tap a standalone helper
    Activate(Pos),
}

impl Move {
    /// Shape check only (adjacency); board-dependent checks happen in the resolver
    pub fn is_well_formed(&self) -> bool {
        match *self {
            Move::Swap(a, b) => a.is_adjacent(b),
            Move::Activate(_) => true,
        }
    }
}

/// Why a tile left the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalCause {
    /// Part of a run
    Match,
    /// Hit by a row/column helper sweep
    Sweep,
    /// Picked by a color bomb
    ColorBomb,
    /// Two color bombs swapped together
    BoardClear,
    /// The helper itself, consumed when it fires
    HelperFired,
    /// Box whose strength reached zero
    BoxCleared,
    /// Replaced by a reshuffle (never counted toward goals)
    Reshuffle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Ice,
    Box,
}

/// Game lifecycle: `Playing -> Won | Lost`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Playing)
    }
}

/// Board delta emitted for presentation layers.
///
/// Sufficient to animate a game without reimplementing its rules: every tile
/// is identified by its [`TileId`], and events are emitted in the order the
/// engine commits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    TileCreated {
        pos: Pos,
        tile: Tile,
    },
    TileMoved {
        id: TileId,
        from: Pos,
        to: Pos,
    },
    TileRemoved {
        id: TileId,
        pos: Pos,
        cause: RemovalCause,
    },
    ObstacleDamaged {
        id: TileId,
        pos: Pos,
        obstacle: ObstacleKind,
        remaining: u8,
    },
    /// Tile kept its id but its body changed (reshuffled under ice)
    TileTransformed {
        pos: Pos,
        tile: Tile,
    },
    HelperSpawned {
        pos: Pos,
        tile: Tile,
        /// Run tile that turned into the helper (not counted as removed)
        replaced: TileId,
    },
    HelperTriggered {
        id: TileId,
        pos: Pos,
        helper: HelperKind,
    },
    SwapReverted {
        a: Pos,
        b: Pos,
    },
    Reshuffled {
        attempts: u32,
    },
    MovesChanged {
        remaining: u32,
    },
    GoalProgress {
        goal: String,
        count: u32,
        target: u32,
    },
    GameOver {
        status: GameStatus,
    },
}
