//! Board module - owns the grid
//!
//! The board is a `rows x cols` grid where each cell is a hole, empty, or holds one tile.
//! Uses a flat vector (row-major) for cache locality; the hole mask is fixed at construction.
//! Coordinates: `(row, col)` where row 0 is the top row and col 0 the left column.
//!
//! Everything here is a raw primitive with no game rules attached: no events, no goals, no
//! obstacle damage. The resolver layers rules on top and is the only caller that mutates a
//! live game board.

use arrayvec::ArrayVec;

use crate::rng::SimpleRng;
use crate::types::{Cell, Kind, Pos, Tile, TileBody, TileId};

/// A tile that moved during a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMove {
    pub id: TileId,
    pub from: Pos,
    pub to: Pos,
}

/// The game board
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: u8,
    cols: u8,
    /// Flat array of cells, row-major order (row * cols + col)
    cells: Vec<Cell>,
    /// Next tile id to hand out
    next_id: u32,
}

impl Board {
    /// Create an empty board with no holes
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows as usize * cols as usize],
            next_id: 1,
        }
    }

    /// Create an empty board with the given hole mask (out-of-bounds holes are ignored)
    pub fn with_holes(rows: u8, cols: u8, holes: impl IntoIterator<Item = Pos>) -> Self {
        let mut board = Self::new(rows, cols);
        for pos in holes {
            if let Some(idx) = board.index(pos) {
                board.cells[idx] = Cell::Hole;
            }
        }
        board
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Pos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(pos.row as usize * self.cols as usize + pos.col as usize)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as u8) < self.rows && (pos.col as u8) < self.cols
    }

    /// Get cell at position; `None` if out of bounds
    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    /// Tile at position, if any
    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        self.get(pos).and_then(Cell::tile)
    }

    pub fn tile_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        let idx = self.index(pos)?;
        match &mut self.cells[idx] {
            Cell::Tile(tile) => Some(tile),
            _ => None,
        }
    }

    pub fn is_hole(&self, pos: Pos) -> bool {
        matches!(self.get(pos), Some(Cell::Hole))
    }

    /// In bounds, not a hole, and holding no tile
    pub fn is_vacant(&self, pos: Pos) -> bool {
        matches!(self.get(pos), Some(Cell::Empty))
    }

    /// All positions in row-major order (holes included)
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |r| (0..cols).map(move |c| Pos::new(r as i8, c as i8)))
    }

    /// Positions holding a tile, in row-major order
    pub fn tile_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(|&p| self.tile(p).is_some())
    }

    /// In-bounds, non-hole 4-neighborhood of `pos`
    pub fn neighbors(&self, pos: Pos) -> ArrayVec<Pos, 4> {
        let mut out = ArrayVec::new();
        for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let n = pos.offset(dr, dc);
            if self.in_bounds(n) && !self.is_hole(n) {
                out.push(n);
            }
        }
        out
    }

    /// Allocate a fresh tile id
    pub fn alloc_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Create a tile with a fresh id (not yet placed)
    pub fn spawn(&mut self, body: TileBody, ice: u8) -> Tile {
        Tile::new(self.alloc_id(), body).with_ice(ice)
    }

    /// Put a tile into a non-hole cell, replacing whatever was there.
    /// Returns false if the position is out of bounds or a hole.
    pub fn place(&mut self, pos: Pos, tile: Tile) -> bool {
        match self.index(pos) {
            Some(idx) if !self.cells[idx].is_hole() => {
                self.cells[idx] = Cell::Tile(tile);
                true
            }
            _ => false,
        }
    }

    /// Remove and return the tile at `pos`, leaving the cell empty.
    ///
    /// Raw primitive: box and ice cells must be routed through the obstacle model first.
    pub fn take(&mut self, pos: Pos) -> Option<Tile> {
        let idx = self.index(pos)?;
        if !matches!(self.cells[idx], Cell::Tile(_)) {
            return None;
        }
        match std::mem::replace(&mut self.cells[idx], Cell::Empty) {
            Cell::Tile(tile) => Some(tile),
            other => {
                self.cells[idx] = other;
                None
            }
        }
    }

    /// Both cells hold unlocked tiles and are distinct
    pub fn can_swap(&self, a: Pos, b: Pos) -> bool {
        if a == b {
            return false;
        }
        let free = |p: Pos| self.tile(p).is_some_and(|t| !t.is_locked());
        free(a) && free(b)
    }

    /// Exchange two tiles. No-op (false) if either cell is a hole, empty, or locked.
    pub fn swap(&mut self, a: Pos, b: Pos) -> bool {
        if !self.can_swap(a, b) {
            return false;
        }
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return false;
        };
        self.cells.swap(ia, ib);
        true
    }

    /// Compact one column downward, preserving relative order.
    ///
    /// Holes neither block nor receive tiles: a tile above a hole falls past it to the
    /// next empty non-hole cell. The lowest empty slot is filled by the lowest tile above it.
    pub fn drop_column(&mut self, col: u8) -> Vec<TileMove> {
        let mut moves = Vec::new();
        if col >= self.cols {
            return moves;
        }

        // Non-hole slots and the tiles in them, both bottom to top.
        let mut slots = Vec::with_capacity(self.rows as usize);
        let mut tiles = Vec::with_capacity(self.rows as usize);
        for row in (0..self.rows).rev() {
            let pos = Pos::new(row as i8, col as i8);
            if self.is_hole(pos) {
                continue;
            }
            slots.push(pos);
            if let Some(tile) = self.take(pos) {
                tiles.push((pos, tile));
            }
        }

        for (slot, (from, tile)) in slots.iter().copied().zip(tiles) {
            if slot != from {
                moves.push(TileMove {
                    id: tile.id,
                    from,
                    to: slot,
                });
            }
            self.place(slot, tile);
        }

        moves
    }

    /// Drop every column
    pub fn drop_all(&mut self) -> Vec<TileMove> {
        (0..self.cols).flat_map(|c| self.drop_column(c)).collect()
    }

    /// Fill every empty non-hole cell with a Basic tile of a uniformly random kind.
    /// Returns the created tiles (row-major).
    pub fn refill(&mut self, rng: &mut SimpleRng, kinds: &[Kind]) -> Vec<(Pos, Tile)> {
        let mut created = Vec::new();
        if kinds.is_empty() {
            return created;
        }
        let empty: Vec<Pos> = self.positions().filter(|&p| self.is_vacant(p)).collect();
        for pos in empty {
            let Some(kind) = rng.pick(kinds).cloned() else {
                continue;
            };
            let tile = self.spawn(TileBody::Basic { kind }, 0);
            created.push((pos, tile.clone()));
            self.place(pos, tile);
        }
        created
    }

    /// No empty non-hole cell remains
    pub fn is_settled(&self) -> bool {
        !self.cells.iter().any(Cell::is_empty)
    }

    /// Get a reference to the internal cells (row-major)
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Build a board from rows of characters, for tests.
    ///
    /// `a`-`z` basic tile of that one-letter kind, `A`-`Z` the same under ice of strength 1,
    /// `1`/`2` a `"box"` of that strength, `-` row clear, `|` column clear, `*` color bomb,
    /// `#` hole, `.` empty.
    #[cfg(test)]
    pub fn from_ascii(rows: &[&str]) -> Self {
        use crate::types::HelperKind;

        let height = rows.len() as u8;
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0) as u8;
        let mut board = Self::new(height, width);
        for (r, line) in rows.iter().enumerate() {
            assert_eq!(line.chars().count() as u8, width, "ragged ascii board");
            for (c, ch) in line.chars().enumerate() {
                let pos = Pos::new(r as i8, c as i8);
                let idx = r * width as usize + c;
                let (body, ice) = match ch {
                    '#' => {
                        board.cells[idx] = Cell::Hole;
                        continue;
                    }
                    '.' => continue,
                    '1' | '2' => (
                        TileBody::Box {
                            kind: Kind::new("box"),
                            strength: ch.to_digit(10).unwrap() as u8,
                        },
                        0,
                    ),
                    '-' => (TileBody::Helper { helper: HelperKind::RowClear }, 0),
                    '|' => (TileBody::Helper { helper: HelperKind::ColumnClear }, 0),
                    '*' => (TileBody::Helper { helper: HelperKind::ColorBomb }, 0),
                    c if c.is_ascii_lowercase() => {
                        (TileBody::Basic { kind: Kind::new(c.to_string()) }, 0)
                    }
                    c if c.is_ascii_uppercase() => (
                        TileBody::Basic {
                            kind: Kind::new(c.to_ascii_lowercase().to_string()),
                        },
                        1,
                    ),
                    other => panic!("unknown ascii tile {other:?}"),
                };
                let tile = board.spawn(body, ice);
                board.place(pos, tile);
            }
        }
        board
    }

    /// Render back to the ascii form used by `from_ascii` (ids dropped)
    #[cfg(test)]
    pub fn to_ascii(&self) -> Vec<String> {
        use crate::types::HelperKind;

        (0..self.rows)
            .map(|r| {
                (0..self.cols)
                    .map(|c| match self.get(Pos::new(r as i8, c as i8)) {
                        Some(Cell::Hole) => '#',
                        Some(Cell::Empty) | None => '.',
                        Some(Cell::Tile(tile)) => match &tile.body {
                            TileBody::Basic { kind } => {
                                let ch = kind.as_str().chars().next().unwrap_or('?');
                                if tile.is_iced() {
                                    ch.to_ascii_uppercase()
                                } else {
                                    ch
                                }
                            }
                            TileBody::Box { strength, .. } => {
                                char::from_digit(*strength as u32, 10).unwrap_or('?')
                            }
                            TileBody::Helper { helper } => match helper {
                                HelperKind::RowClear => '-',
                                HelperKind::ColumnClear => '|',
                                HelperKind::ColorBomb => '*',
                            },
                        },
                    })
                    .collect()
            })
            .collect()
    }
}
