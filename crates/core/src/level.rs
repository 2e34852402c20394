//! Level descriptor - the JSON shape a level is authored in, and board construction
//!
//! ```json
//! {
//!   "moves": 20,
//!   "elementKinds": ["energy", "smartphone", "leaf"],
//!   "rows": 3, "cols": 3,
//!   "goals": [{"type": "energy", "target": 10}, {"type": "box_full", "target": 1}],
//!   "initialGrid": [
//!     [false, null, {"type": "box", "strength": 2}],
//!     [true, {"type": "energy"}, {"type": "ice", "strength": 1}],
//!     [null, {"type": "row_clear"}, {"type": "ice", "strength": 2, "content": {"type": "leaf"}}]
//!   ]
//! }
//! ```
//!
//! Cells: `false` is a hole, `true`/`null` a random element tile, an object a specific tile.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::goals::Goal;
use crate::rng::SimpleRng;
use crate::types::{
    HelperKind, Kind, Pos, TileBody, FULL_GOAL_SUFFIX, MAX_BOARD_DIM, MAX_OBSTACLE_STRENGTH,
    MIN_ELEMENT_KINDS, MIN_RUN_LEN,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    #[serde(alias = "moveBudget")]
    pub moves: u32,
    pub element_kinds: Vec<Kind>,
    pub rows: u8,
    pub cols: u8,
    pub goals: Vec<GoalSpec>,
    /// Row-major cells; omitted means every cell is random
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_grid: Option<Vec<Vec<CellSpec>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSpec {
    #[serde(rename = "type")]
    pub goal: String,
    pub target: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSpec {
    /// `false` = hole, `true` = random tile
    Flag(bool),
    Tile(TileSpec),
    /// `null`
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<u8>,
    /// Tile under an ice overlay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Box<TileSpec>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    InvalidDimensions { rows: u8, cols: u8 },
    TooFewKinds(usize),
    /// `row: None` when the row count is wrong, else the first row with the wrong width
    GridShape { row: Option<usize>, found: usize, expected: usize },
    UnknownTileType(String),
    InvalidStrength(u8),
    IcedObstacle(Pos),
    InvalidGoal(String),
    Parse(String),
}

impl LevelError {
    pub fn code(&self) -> &'static str {
        match self {
            LevelError::InvalidDimensions { .. } => "invalid_dimensions",
            LevelError::TooFewKinds(_) => "too_few_kinds",
            LevelError::GridShape { .. } => "grid_shape",
            LevelError::UnknownTileType(_) => "unknown_tile_type",
            LevelError::InvalidStrength(_) => "invalid_strength",
            LevelError::IcedObstacle(_) => "iced_obstacle",
            LevelError::InvalidGoal(_) => "invalid_goal",
            LevelError::Parse(_) => "parse",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LevelError::InvalidDimensions { .. } => "rows and cols must be between 1 and 32",
            LevelError::TooFewKinds(_) => "a level needs at least two element kinds",
            LevelError::GridShape { .. } => "initial grid does not match rows x cols",
            LevelError::UnknownTileType(_) => "tile type is not a kind, helper, ice or box",
            LevelError::InvalidStrength(_) => "obstacle strength must be 1 or 2",
            LevelError::IcedObstacle(_) => "ice may only cover an element or a helper",
            LevelError::InvalidGoal(_) => "goals must be non-empty with positive targets",
            LevelError::Parse(_) => "level descriptor is not valid JSON",
        }
    }
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())?;
        match self {
            LevelError::InvalidDimensions { rows, cols } => write!(f, " (got {rows}x{cols})"),
            LevelError::TooFewKinds(n) => write!(f, " (got {n})"),
            LevelError::GridShape { row: None, found, expected } => {
                write!(f, " ({found} rows, expected {expected})")
            }
            LevelError::GridShape { row: Some(row), found, expected } => {
                write!(f, " (row {row}: {found} cells, expected {expected})")
            }
            LevelError::UnknownTileType(t) => write!(f, " ({t:?})"),
            LevelError::InvalidStrength(s) => write!(f, " (got {s})"),
            LevelError::IcedObstacle(pos) => write!(f, " (at {pos})"),
            LevelError::InvalidGoal(g) => write!(f, " ({g:?})"),
            LevelError::Parse(e) => write!(f, " ({e})"),
        }
    }
}

impl std::error::Error for LevelError {}

/// Everything a [`crate::Game`] is assembled from
#[derive(Debug, Clone)]
pub struct LevelSetup {
    pub board: Board,
    pub elements: Vec<Kind>,
    pub goals: Vec<Goal>,
    pub moves: u32,
}

impl LevelDescriptor {
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        serde_json::from_str(text).map_err(|e| LevelError::Parse(e.to_string()))
    }

    /// Validate and build the board. `avoid_runs` keeps random cells from completing a run
    /// with the two tiles to their left or above.
    pub fn build(&self, rng: &mut SimpleRng, avoid_runs: bool) -> Result<LevelSetup, LevelError> {
        if self.rows == 0
            || self.cols == 0
            || self.rows > MAX_BOARD_DIM
            || self.cols > MAX_BOARD_DIM
        {
            return Err(LevelError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let mut elements: Vec<Kind> = Vec::with_capacity(self.element_kinds.len());
        for kind in &self.element_kinds {
            if !elements.contains(kind) {
                elements.push(kind.clone());
            }
        }
        if elements.len() < MIN_ELEMENT_KINDS {
            return Err(LevelError::TooFewKinds(elements.len()));
        }

        let goals = self.goals(&elements)?;
        let grid = self.grid()?;

        let holes = self
            .positions()
            .filter(|&(_, r, c)| {
                matches!(
                    grid.get(r).and_then(|row| row.get(c)),
                    Some(CellSpec::Flag(false))
                )
            })
            .map(|(pos, _, _)| pos)
            .collect::<Vec<_>>();
        let mut board = Board::with_holes(self.rows, self.cols, holes);

        for (pos, r, c) in self.positions() {
            let (body, ice) = match grid.get(r).and_then(|row| row.get(c)) {
                Some(CellSpec::Flag(false)) => continue,
                None | Some(CellSpec::Flag(true)) | Some(CellSpec::Random) => {
                    let kind = pick_fill_kind(&board, pos, &elements, rng, avoid_runs);
                    (TileBody::Basic { kind }, 0)
                }
                Some(CellSpec::Tile(tile)) => self.resolve(tile, &elements, rng, pos)?,
            };
            let tile = board.spawn(body, ice);
            board.place(pos, tile);
        }

        debug!("[Level] built {}x{} board with {} goals", self.rows, self.cols, goals.len());
        Ok(LevelSetup {
            board,
            elements,
            goals,
            moves: self.moves,
        })
    }

    fn positions(&self) -> impl Iterator<Item = (Pos, usize, usize)> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |r| {
            (0..cols).map(move |c| (Pos::new(r as i8, c as i8), r as usize, c as usize))
        })
    }

    fn grid(&self) -> Result<&[Vec<CellSpec>], LevelError> {
        let Some(grid) = &self.initial_grid else {
            return Ok(&[]);
        };
        if grid.len() != self.rows as usize {
            return Err(LevelError::GridShape {
                row: None,
                found: grid.len(),
                expected: self.rows as usize,
            });
        }
        for (row, cells) in grid.iter().enumerate() {
            if cells.len() != self.cols as usize {
                return Err(LevelError::GridShape {
                    row: Some(row),
                    found: cells.len(),
                    expected: self.cols as usize,
                });
            }
        }
        Ok(grid)
    }

    fn goals(&self, elements: &[Kind]) -> Result<Vec<Goal>, LevelError> {
        if self.goals.is_empty() {
            return Err(LevelError::InvalidGoal(String::new()));
        }
        self.goals
            .iter()
            .map(|g| {
                let known = elements.iter().any(|k| k.as_str() == g.goal)
                    || (g.goal.len() > FULL_GOAL_SUFFIX.len()
                        && g.goal.ends_with(FULL_GOAL_SUFFIX));
                if g.target == 0 || !known {
                    return Err(LevelError::InvalidGoal(g.goal.clone()));
                }
                Ok(Goal::new(g.goal.clone(), g.target))
            })
            .collect()
    }

    fn resolve(
        &self,
        spec: &TileSpec,
        elements: &[Kind],
        rng: &mut SimpleRng,
        pos: Pos,
    ) -> Result<(TileBody, u8), LevelError> {
        let name = spec.kind.as_str();

        if name == "ice" {
            let strength = check_strength(spec.strength)?;
            let (body, inner_ice) = match &spec.content {
                Some(inner) => self.resolve(inner, elements, rng, pos)?,
                None => {
                    let kind = rng.pick(elements).cloned().unwrap_or_else(|| Kind::new(name));
                    (TileBody::Basic { kind }, 0)
                }
            };
            if inner_ice > 0 || matches!(body, TileBody::Box { .. }) {
                return Err(LevelError::IcedObstacle(pos));
            }
            return Ok((body, strength));
        }

        if let Some(helper) = HelperKind::from_str(name) {
            return Ok((TileBody::Helper { helper }, 0));
        }

        if elements.iter().any(|k| k.as_str() == name) {
            return Ok((TileBody::Basic { kind: Kind::new(name) }, 0));
        }

        if name == "box" || spec.strength.is_some() {
            let strength = check_strength(spec.strength.or(Some(1)))?;
            return Ok((
                TileBody::Box {
                    kind: Kind::new(name),
                    strength,
                },
                0,
            ));
        }

        Err(LevelError::UnknownTileType(name.to_string()))
    }
}

fn check_strength(strength: Option<u8>) -> Result<u8, LevelError> {
    match strength {
        Some(s) if (1..=MAX_OBSTACLE_STRENGTH).contains(&s) => Ok(s),
        other => Err(LevelError::InvalidStrength(other.unwrap_or(0))),
    }
}

/// Random kind for a fill cell, avoiding kinds that would finish a run with the two tiles
/// to the left or the two above. Falls back to any kind when every kind is excluded.
pub(crate) fn pick_fill_kind(
    board: &Board,
    pos: Pos,
    elements: &[Kind],
    rng: &mut SimpleRng,
    avoid_runs: bool,
) -> Kind {
    let fallback = || elements.first().cloned().unwrap_or_else(|| Kind::new(""));
    if !avoid_runs {
        return rng.pick(elements).cloned().unwrap_or_else(fallback);
    }

    let kind_at = |p: Pos| board.tile(p).and_then(|t| t.matchable_kind());
    let mut banned = Vec::new();
    for (dr, dc) in [(0, -1), (-1, 0)] {
        let streak: Vec<_> = (1..MIN_RUN_LEN as i8)
            .map(|d| kind_at(pos.offset(dr * d, dc * d)))
            .collect();
        if let Some(Some(first)) = streak.first() {
            if streak.iter().all(|k| *k == Some(*first)) {
                banned.push(*first);
            }
        }
    }

    let allowed: Vec<Kind> = elements.iter().filter(|k| !banned.contains(k)).cloned().collect();
    let pool = if allowed.is_empty() { elements } else { &allowed[..] };
    rng.pick(pool).cloned().unwrap_or_else(fallback)
}
