//! Cascade resolver - moves, the stabilization loop and the dead-board guard
//!
//! [`Game`] ties the board, match detection, obstacles, helpers and goals together and is
//! the only mutator of any of them. A move runs through explicit phases so a presentation
//! layer can pace it:
//!
//! ```text
//! begin_move -> Matching -> Falling -> Matching -> ... -> Settling -> Idle
//! ```
//!
//! Each [`Game::step`] commits one phase completely before returning. A move submitted
//! while a resolution is in flight is rejected with [`MoveError::Busy`].

use std::collections::HashSet;
use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;

use crate::board::Board;
use crate::config::EngineConfig;
use crate::goals::{Goal, GoalTracker};
use crate::helpers::HelperEngine;
use crate::level::{self, LevelDescriptor, LevelError};
use crate::matcher::{self, Run};
use crate::obstacle::ObstacleModel;
use crate::removal::RemovalContext;
use crate::rng::SimpleRng;
use crate::snapshot::BoardSnapshot;
use crate::types::{
    BoardEvent, Cell, GameStatus, HelperKind, Kind, Move, Pos, RemovalCause, Tile, TileBody,
    TileId, MIN_ELEMENT_KINDS,
};

/// Resolution phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for a move
    #[default]
    Idle,
    /// Detect runs, remove them, spawn helpers
    Matching,
    /// Drop survivors and refill
    Falling,
    /// Dead-board check, reshuffle and lose check
    Settling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    OutOfBounds,
    NotAdjacent,
    Hole,
    EmptyCell,
    Locked,
    NotHelper,
    Busy,
    GameOver,
}

impl MoveError {
    pub fn code(self) -> &'static str {
        match self {
            MoveError::Busy => "busy",
            MoveError::GameOver => "game_over",
            MoveError::OutOfBounds
            | MoveError::NotAdjacent
            | MoveError::Hole
            | MoveError::EmptyCell
            | MoveError::Locked
            | MoveError::NotHelper => "invalid_move",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            MoveError::OutOfBounds => "position is outside the board",
            MoveError::NotAdjacent => "swap cells are not 4-adjacent",
            MoveError::Hole => "cell is a hole",
            MoveError::EmptyCell => "cell holds no tile",
            MoveError::Locked => "tile is locked by ice or is a box",
            MoveError::NotHelper => "only helpers can be activated",
            MoveError::Busy => "a move is still resolving",
            MoveError::GameOver => "game is over",
        }
    }
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for MoveError {}

/// Immediate result of [`Game::begin_move`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Swap produced nothing and was reverted; no move consumed
    NoEffect,
    /// Move consumed; call [`Game::step`] until it returns false
    Started,
}

/// Summary of one resolved move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MoveReport {
    pub consumed: bool,
    /// Matching steps that removed at least one run
    pub cascades: u32,
    pub helpers_fired: u32,
    pub reshuffled: bool,
}

/// Helper to be created in place of a run tile
#[derive(Debug, Clone, Copy)]
struct Spawn {
    pos: Pos,
    helper: HelperKind,
}

/// A live game: board plus every rule component
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    elements: Vec<Kind>,
    obstacles: ObstacleModel,
    helpers: HelperEngine,
    goals: GoalTracker,
    rng: SimpleRng,
    events: Vec<BoardEvent>,
    phase: Phase,
    /// Cells of the swap that started the move, until the first matching step
    swap_cells: Option<(Pos, Pos)>,
    report: MoveReport,
    config: EngineConfig,
}

impl Game {
    /// Load a level: build the board, keep authored runs, reshuffle a dead start
    pub fn from_level(level: &LevelDescriptor, config: EngineConfig) -> Result<Self, LevelError> {
        let mut rng = SimpleRng::new(config.seed);
        let setup = level.build(&mut rng, config.avoid_initial_runs)?;
        let mut game = Self::assemble(
            setup.board,
            setup.elements,
            setup.goals,
            setup.moves,
            rng,
            config,
        );

        let runs = game.find_matches();
        if !runs.is_empty() {
            warn!(
                "[Level] initial grid contains {} runs; they resolve after the first move",
                runs.len()
            );
        }
        if !game.has_available_moves() {
            info!("[Level] no moves on the initial board, reshuffling");
            game.reshuffle();
        }
        if let Some(status) = game.goals.check_lose() {
            game.emit(BoardEvent::GameOver { status });
        }

        info!(
            "[Level] loaded {}x{} board, {} kinds, {} moves",
            game.board.rows(),
            game.board.cols(),
            game.elements.len(),
            game.goals.moves_remaining()
        );
        Ok(game)
    }

    /// Wrap an already-built board as-is (no dead-board check)
    ///
    /// Refill draws from `elements`, so fewer than two distinct kinds is rejected with
    /// [`LevelError::TooFewKinds`].
    pub fn from_parts(
        board: Board,
        elements: Vec<Kind>,
        goals: Vec<Goal>,
        moves: u32,
        config: EngineConfig,
    ) -> Result<Self, LevelError> {
        let mut distinct: Vec<&Kind> = elements.iter().collect();
        distinct.sort();
        distinct.dedup();
        if distinct.len() < MIN_ELEMENT_KINDS {
            return Err(LevelError::TooFewKinds(distinct.len()));
        }
        let rng = SimpleRng::new(config.seed);
        Ok(Self::assemble(board, elements, goals, moves, rng, config))
    }

    fn assemble(
        board: Board,
        elements: Vec<Kind>,
        goals: Vec<Goal>,
        moves: u32,
        rng: SimpleRng,
        config: EngineConfig,
    ) -> Self {
        Self {
            board,
            elements,
            obstacles: ObstacleModel::new(),
            helpers: HelperEngine::new(),
            goals: GoalTracker::new(goals, moves),
            rng,
            events: Vec::new(),
            phase: Phase::Idle,
            swap_cells: None,
            report: MoveReport::default(),
            config,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn elements(&self) -> &[Kind] {
        &self.elements
    }

    pub fn goals(&self) -> &[Goal] {
        self.goals.goals()
    }

    pub fn moves_remaining(&self) -> u32 {
        self.goals.moves_remaining()
    }

    pub fn status(&self) -> GameStatus {
        self.goals.status()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Report of the move in flight, or of the last finished one
    pub fn report(&self) -> MoveReport {
        self.report
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(self)
    }

    /// Take all events emitted since the last drain (consumed by presentation layers)
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn find_matches(&self) -> Vec<Run> {
        matcher::find_matches(&self.board)
    }

    /// Whether any move-consuming move exists; never mutates the board
    pub fn has_available_moves(&self) -> bool {
        matcher::has_available_moves(&self.board)
    }

    fn emit(&mut self, event: BoardEvent) {
        self.events.push(event);
    }

    fn parts(&mut self) -> (RemovalContext<'_>, &mut HelperEngine) {
        (
            RemovalContext {
                board: &mut self.board,
                obstacles: &mut self.obstacles,
                goals: &mut self.goals,
                events: &mut self.events,
                rng: &mut self.rng,
            },
            &mut self.helpers,
        )
    }

    /// Apply a move and run the whole stabilization loop
    pub fn resolve_move(&mut self, mv: Move) -> Result<MoveReport, MoveError> {
        if self.begin_move(mv)? == MoveOutcome::NoEffect {
            return Ok(self.report);
        }
        while self.step() {}
        Ok(self.report)
    }

    /// Validate and execute a move, leaving the resolution at its first phase boundary
    pub fn begin_move(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        if self.phase != Phase::Idle {
            return Err(MoveError::Busy);
        }
        if self.goals.status().is_terminal() || self.goals.moves_remaining() == 0 {
            return Err(MoveError::GameOver);
        }
        self.validate(mv)?;

        self.report = MoveReport::default();
        match mv {
            Move::Swap(a, b) => Ok(self.begin_swap(a, b)),
            Move::Activate(pos) => {
                debug!("[Cascade] activate {}", pos);
                self.consume_move();
                self.activate(vec![(pos, None)]);
                Ok(MoveOutcome::Started)
            }
        }
    }

    fn validate(&self, mv: Move) -> Result<(), MoveError> {
        match mv {
            Move::Swap(a, b) => {
                let ta = self.occupied(a)?;
                let tb = self.occupied(b)?;
                if !a.is_adjacent(b) {
                    return Err(MoveError::NotAdjacent);
                }
                if ta.is_locked() || tb.is_locked() {
                    return Err(MoveError::Locked);
                }
            }
            Move::Activate(pos) => {
                let tile = self.occupied(pos)?;
                if tile.free_helper().is_some() {
                    return Ok(());
                }
                if matches!(tile.body, TileBody::Helper { .. }) {
                    return Err(MoveError::Locked);
                }
                return Err(MoveError::NotHelper);
            }
        }
        Ok(())
    }

    fn occupied(&self, pos: Pos) -> Result<&Tile, MoveError> {
        match self.board.get(pos) {
            None => Err(MoveError::OutOfBounds),
            Some(Cell::Hole) => Err(MoveError::Hole),
            Some(Cell::Empty) => Err(MoveError::EmptyCell),
            Some(Cell::Tile(tile)) => Ok(tile),
        }
    }

    fn consume_move(&mut self) {
        if self.goals.consume_move() {
            let remaining = self.goals.moves_remaining();
            self.emit(BoardEvent::MovesChanged { remaining });
        }
        self.report.consumed = true;
    }

    fn begin_swap(&mut self, a: Pos, b: Pos) -> MoveOutcome {
        let helper_a = self.board.tile(a).and_then(Tile::free_helper);
        let helper_b = self.board.tile(b).and_then(Tile::free_helper);

        if !self.board.swap(a, b) {
            return MoveOutcome::NoEffect;
        }

        if helper_a.is_none() && helper_b.is_none() {
            if !matcher::has_run_through(&self.board, a)
                && !matcher::has_run_through(&self.board, b)
            {
                self.board.swap(a, b);
                self.emit(BoardEvent::SwapReverted { a, b });
                debug!("[Cascade] swap {} <-> {} made no run, reverted", a, b);
                return MoveOutcome::NoEffect;
            }
            self.emit_swap(a, b);
            self.consume_move();
            self.swap_cells = Some((a, b));
            self.phase = Phase::Matching;
            return MoveOutcome::Started;
        }

        self.emit_swap(a, b);
        self.consume_move();
        self.swap_cells = Some((a, b));

        // Helpers have traded places: whatever was at `b` now sits at `a`.
        let (at_a, at_b) = (helper_b, helper_a);
        let kind_at =
            |board: &Board, pos: Pos| board.tile(pos).and_then(Tile::matchable_kind).cloned();
        match (at_a, at_b) {
            (Some(HelperKind::ColorBomb), Some(HelperKind::ColorBomb)) => self.clear_board(a, b),
            (Some(HelperKind::ColorBomb), None) => {
                let paired = kind_at(&self.board, b);
                self.activate(vec![(a, paired)]);
            }
            (None, Some(HelperKind::ColorBomb)) => {
                let paired = kind_at(&self.board, a);
                self.activate(vec![(b, paired)]);
            }
            _ => {
                let triggers = [(a, at_a), (b, at_b)]
                    .into_iter()
                    .filter(|(_, helper)| helper.is_some())
                    .map(|(pos, _)| (pos, None))
                    .collect();
                self.activate(triggers);
            }
        }
        MoveOutcome::Started
    }

    fn emit_swap(&mut self, a: Pos, b: Pos) {
        for (from, to) in [(b, a), (a, b)] {
            if let Some(id) = self.board.tile(to).map(|t| t.id) {
                self.emit(BoardEvent::TileMoved { id, from, to });
            }
        }
    }

    /// Trigger helpers and resolve their whole chain as one obstacle pass
    fn activate(&mut self, triggers: Vec<(Pos, Option<Kind>)>) {
        self.obstacles.begin_pass();
        let (mut ctx, helpers) = self.parts();
        helpers.reset();
        for (pos, paired) in triggers {
            helpers.trigger(&mut ctx, pos, paired);
        }
        let fired = helpers.resolve(&mut ctx);
        self.report.helpers_fired += fired as u32;
        self.phase = Phase::Matching;
    }

    fn clear_board(&mut self, a: Pos, b: Pos) {
        info!("[Cascade] two color bombs swapped, clearing the board");
        self.obstacles.begin_pass();
        let (mut ctx, helpers) = self.parts();
        helpers.reset();
        helpers.clear_board(&mut ctx, [a, b]);
        self.report.helpers_fired += 2;
        self.phase = Phase::Matching;
    }

    /// Advance exactly one phase. Returns whether more phases remain.
    pub fn step(&mut self) -> bool {
        match self.phase {
            Phase::Idle => return false,
            Phase::Matching => self.step_matching(),
            Phase::Falling => self.step_falling(),
            Phase::Settling => self.step_settling(),
        }
        self.phase != Phase::Idle
    }

    fn step_matching(&mut self) {
        let swap_cells = self.swap_cells.take();
        let runs = matcher::find_matches(&self.board);
        if runs.is_empty() {
            self.phase = if self.board.is_settled() {
                Phase::Settling
            } else {
                Phase::Falling
            };
            return;
        }

        self.report.cascades += 1;
        let spawns = plan_spawns(&runs, swap_cells);
        let spawn_cells: HashSet<Pos> = spawns.iter().map(|s| s.pos).collect();

        // A cell in two runs is removed once.
        let mut seen = HashSet::new();
        let cells: Vec<Pos> = runs
            .iter()
            .flat_map(|run| run.cells.iter().copied())
            .filter(|&pos| seen.insert(pos))
            .collect();
        debug!(
            "[Cascade] {} runs, {} cells, {} helpers",
            runs.len(),
            cells.len(),
            spawns.len()
        );

        self.obstacles.begin_pass();
        let (mut ctx, _) = self.parts();
        for &pos in cells.iter().filter(|p| !spawn_cells.contains(*p)) {
            ctx.remove(pos, RemovalCause::Match);
        }
        for spawn in &spawns {
            let Some(old) = ctx.board.take(spawn.pos) else {
                continue;
            };
            let tile = ctx.board.spawn(TileBody::Helper { helper: spawn.helper }, 0);
            ctx.board.place(spawn.pos, tile.clone());
            ctx.emit(BoardEvent::HelperSpawned {
                pos: spawn.pos,
                tile,
                replaced: old.id,
            });
        }
        for &pos in &cells {
            for neighbor in ctx.board.neighbors(pos) {
                ctx.damage(neighbor);
            }
        }

        self.phase = Phase::Falling;
    }

    fn step_falling(&mut self) {
        for m in self.board.drop_all() {
            self.emit(BoardEvent::TileMoved {
                id: m.id,
                from: m.from,
                to: m.to,
            });
        }
        for (pos, tile) in self.board.refill(&mut self.rng, &self.elements) {
            self.emit(BoardEvent::TileCreated { pos, tile });
        }
        self.phase = Phase::Matching;
    }

    fn step_settling(&mut self) {
        if !self.goals.status().is_terminal() && !self.has_available_moves() {
            info!("[Cascade] no moves left after settling, reshuffling");
            self.report.reshuffled = self.reshuffle();
        }
        if let Some(status) = self.goals.check_lose() {
            info!("[Cascade] out of moves, game lost");
            self.emit(BoardEvent::GameOver { status });
        }
        self.phase = Phase::Idle;
    }

    /// Re-randomize Basic tiles until the board has no run and at least one move.
    ///
    /// Kinds are drawn in row-major order the way level fill does, never completing a run
    /// with the two tiles to the left or above.
    ///
    /// Iced tiles keep their id and ice and only change kind; boxes and helpers are
    /// untouched. Gives up after `reshuffle_limit` attempts, leaving the board as it was.
    pub fn reshuffle(&mut self) -> bool {
        let targets: Vec<Pos> = self
            .board
            .tile_positions()
            .filter(|&p| self.board.tile(p).and_then(Tile::basic_kind).is_some())
            .collect();
        if targets.is_empty() || self.elements.is_empty() {
            warn!("[Reshuffle] nothing to reshuffle");
            return false;
        }

        let mut scratch = self.board.clone();
        for attempt in 1..=self.config.reshuffle_limit {
            for &pos in &targets {
                let kind =
                    level::pick_fill_kind(&scratch, pos, &self.elements, &mut self.rng, true);
                if let Some(tile) = scratch.tile_mut(pos) {
                    tile.body = TileBody::Basic { kind };
                }
            }
            if matcher::find_matches(&scratch).is_empty()
                && matcher::has_available_moves(&scratch)
            {
                self.commit_reshuffle(&scratch, &targets);
                self.emit(BoardEvent::Reshuffled { attempts: attempt });
                info!("[Reshuffle] playable board after {} attempts", attempt);
                return true;
            }
        }

        warn!(
            "[Reshuffle] gave up after {} attempts, board left as is",
            self.config.reshuffle_limit
        );
        false
    }

    fn commit_reshuffle(&mut self, scratch: &Board, targets: &[Pos]) {
        for &pos in targets {
            let Some(kind) = scratch.tile(pos).and_then(Tile::basic_kind).cloned() else {
                continue;
            };
            let iced = self.board.tile(pos).is_some_and(Tile::is_iced);
            if iced {
                if let Some(tile) = self.board.tile_mut(pos) {
                    tile.body = TileBody::Basic { kind };
                    let tile = tile.clone();
                    self.events.push(BoardEvent::TileTransformed { pos, tile });
                }
                continue;
            }
            if let Some(old) = self.board.take(pos) {
                self.events.push(BoardEvent::TileRemoved {
                    id: old.id,
                    pos,
                    cause: RemovalCause::Reshuffle,
                });
                let tile = self.board.spawn(TileBody::Basic { kind }, 0);
                self.board.place(pos, tile.clone());
                self.events.push(BoardEvent::TileCreated { pos, tile });
            }
        }
    }

    /// Id of the tile at `pos`, for callers tracking tiles across events
    pub fn tile_id(&self, pos: Pos) -> Option<TileId> {
        self.board.tile(pos).map(|t| t.id)
    }
}

/// Pick one spawn cell per helper-producing run.
///
/// Runs are visited in detection order (rows before columns) and the first run to claim a
/// cell keeps it. Preference: a swapped cell in the run, then the middle tile, then the run
/// tile nearest the middle. A run with every cell already claimed spawns nothing.
fn plan_spawns(runs: &[Run], swap_cells: Option<(Pos, Pos)>) -> Vec<Spawn> {
    let mut claimed = HashSet::new();
    let mut spawns = Vec::new();

    for run in runs {
        let Some(helper) = run.helper() else {
            continue;
        };
        let Some(mid) = run.middle() else {
            continue;
        };
        // Run cells are contiguous on one axis, so this is the index distance.
        let mut by_distance: Vec<(u8, Pos)> = run
            .cells
            .iter()
            .map(|&p| (p.row.abs_diff(mid.row) + p.col.abs_diff(mid.col), p))
            .collect();
        by_distance.sort_by_key(|&(d, _)| d);

        let swapped = swap_cells
            .into_iter()
            .flat_map(|(a, b)| [a, b])
            .filter(|&p| run.contains(p));
        let pick = swapped
            .chain(by_distance.into_iter().map(|(_, p)| p))
            .find(|p| !claimed.contains(p));

        match pick {
            Some(pos) => {
                claimed.insert(pos);
                spawns.push(Spawn { pos, helper });
            }
            None => debug!("[Cascade] no free cell for {} from run", helper.as_str()),
        }
    }
    spawns
}
