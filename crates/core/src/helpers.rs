//! Helper engine - row/column clears, color bombs and chain reactions
//!
//! Activations are resolved breadth-first from an explicit queue. A helper caught in
//! another helper's sweep is queued, not fired on the spot, and the set of triggered tile
//! ids guarantees each helper fires at most once per activation.
//!
//! Per helper: `Idle -> Triggered` (queued) `-> Sweeping` (firing) `-> Resolved`.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::removal::RemovalContext;
use crate::types::{BoardEvent, HelperKind, Kind, Pos, RemovalCause, TileId};

/// Lifecycle of one helper instance within an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperState {
    Idle,
    Triggered,
    Sweeping,
    Resolved,
}

#[derive(Debug, Clone)]
struct Activation {
    id: TileId,
    pos: Pos,
    helper: HelperKind,
    /// Kind of the swap partner, for a color bomb swapped with a basic tile
    paired: Option<Kind>,
}

#[derive(Debug, Clone, Default)]
pub struct HelperEngine {
    queue: VecDeque<Activation>,
    triggered: HashSet<TileId>,
    resolved: HashSet<TileId>,
    sweeping: Option<TileId>,
}

impl HelperEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous activation's chain
    pub fn reset(&mut self) {
        self.queue.clear();
        self.triggered.clear();
        self.resolved.clear();
        self.sweeping = None;
    }

    pub fn state(&self, id: TileId) -> HelperState {
        if self.sweeping == Some(id) {
            HelperState::Sweeping
        } else if self.resolved.contains(&id) {
            HelperState::Resolved
        } else if self.triggered.contains(&id) {
            HelperState::Triggered
        } else {
            HelperState::Idle
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue the free helper at `pos`. False if there is none or it was already triggered.
    pub fn trigger(
        &mut self,
        ctx: &mut RemovalContext<'_>,
        pos: Pos,
        paired: Option<Kind>,
    ) -> bool {
        let Some(tile) = ctx.board.tile(pos) else {
            return false;
        };
        let Some(helper) = tile.free_helper() else {
            return false;
        };
        let id = tile.id;
        if !self.triggered.insert(id) {
            return false;
        }

        ctx.emit(BoardEvent::HelperTriggered { id, pos, helper });
        self.queue.push_back(Activation {
            id,
            pos,
            helper,
            paired,
        });
        true
    }

    /// Fire queued helpers until the chain is exhausted; returns how many fired
    pub fn resolve(&mut self, ctx: &mut RemovalContext<'_>) -> usize {
        let mut fired = 0;
        while let Some(act) = self.queue.pop_front() {
            if self.fire(ctx, act) {
                fired += 1;
            }
        }
        fired
    }

    fn fire(&mut self, ctx: &mut RemovalContext<'_>, act: Activation) -> bool {
        // Helpers don't move during a chain, so a different id here means a stale entry.
        let current = ctx.board.tile(act.pos).map(|t| t.id);
        if current != Some(act.id) {
            debug!("[Helpers] skipping stale activation {:?} at {}", act.id, act.pos);
            self.resolved.insert(act.id);
            return false;
        }

        self.sweeping = Some(act.id);
        ctx.remove(act.pos, RemovalCause::HelperFired);
        debug!("[Helpers] {} fired at {}", act.helper.as_str(), act.pos);

        match act.helper {
            HelperKind::RowClear => self.sweep_line(ctx, act.pos, (0, 1)),
            HelperKind::ColumnClear => self.sweep_line(ctx, act.pos, (1, 0)),
            HelperKind::ColorBomb => self.color_bomb(ctx, act.pos, act.paired),
        }

        self.sweeping = None;
        self.resolved.insert(act.id);
        true
    }

    /// Sweep outward from `origin` in both directions along `(dr, dc)`
    fn sweep_line(&mut self, ctx: &mut RemovalContext<'_>, origin: Pos, (dr, dc): (i8, i8)) {
        let reach = ctx.board.rows().max(ctx.board.cols()) as i8;
        for d in 1..=reach {
            for pos in [origin.offset(-dr * d, -dc * d), origin.offset(dr * d, dc * d)] {
                if !ctx.board.in_bounds(pos) || ctx.board.is_hole(pos) {
                    continue;
                }
                if ctx.board.tile(pos).and_then(|t| t.free_helper()).is_some() {
                    self.trigger(ctx, pos, None);
                    continue;
                }
                ctx.hit(pos, RemovalCause::Sweep);
            }
        }
    }

    fn color_bomb(&mut self, ctx: &mut RemovalContext<'_>, origin: Pos, paired: Option<Kind>) {
        let Some(kind) = paired.or_else(|| Self::pick_kind(ctx, origin)) else {
            debug!("[Helpers] color bomb at {} found nothing to pick", origin);
            return;
        };

        let targets: Vec<Pos> = ctx
            .board
            .tile_positions()
            .filter(|&p| ctx.board.tile(p).and_then(|t| t.basic_kind()) == Some(&kind))
            .collect();

        for pos in targets {
            let iced = ctx.board.tile(pos).is_some_and(|t| t.is_iced());
            if iced {
                ctx.damage(pos);
            } else {
                ctx.remove(pos, RemovalCause::ColorBomb);
            }
        }
    }

    /// Random kind among removable orthogonal neighbors, else among all removable tiles
    fn pick_kind(ctx: &mut RemovalContext<'_>, origin: Pos) -> Option<Kind> {
        let kind_at = |p: Pos| ctx.board.tile(p).and_then(|t| t.matchable_kind()).cloned();

        let mut kinds: Vec<Kind> = ctx
            .board
            .neighbors(origin)
            .into_iter()
            .filter_map(&kind_at)
            .collect();
        if kinds.is_empty() {
            kinds = ctx.board.tile_positions().filter_map(&kind_at).collect();
        }
        ctx.rng.pick(&kinds).cloned()
    }

    /// Two color bombs swapped together: every tile on the board goes, unconditionally
    pub fn clear_board(&mut self, ctx: &mut RemovalContext<'_>, bombs: [Pos; 2]) {
        for pos in bombs {
            let Some(tile) = ctx.board.tile(pos) else {
                continue;
            };
            let (id, helper) = (tile.id, tile.free_helper());
            if let Some(helper) = helper {
                self.triggered.insert(id);
                self.resolved.insert(id);
                ctx.emit(BoardEvent::HelperTriggered { id, pos, helper });
            }
            ctx.remove(pos, RemovalCause::HelperFired);
        }

        let all: Vec<Pos> = ctx.board.tile_positions().collect();
        debug!("[Helpers] board clear removes {} tiles", all.len());
        for pos in all {
            ctx.remove(pos, RemovalCause::BoardClear);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::goals::{Goal, GoalTracker};
    use crate::obstacle::ObstacleModel;
    use crate::rng::SimpleRng;

    struct Fixture {
        board: Board,
        obstacles: ObstacleModel,
        goals: GoalTracker,
        events: Vec<BoardEvent>,
        rng: SimpleRng,
        helpers: HelperEngine,
    }

    impl Fixture {
        fn new(rows: &[&str]) -> Self {
            Self {
                board: Board::from_ascii(rows),
                obstacles: ObstacleModel::new(),
                goals: GoalTracker::new(
                    vec![Goal::new("a", 100), Goal::new("b", 100), Goal::new("box_full", 100)],
                    10,
                ),
                events: Vec::new(),
                rng: SimpleRng::new(9),
                helpers: HelperEngine::new(),
            }
        }

        fn activate(&mut self, pos: Pos, paired: Option<Kind>) -> usize {
            let mut ctx = RemovalContext {
                board: &mut self.board,
                obstacles: &mut self.obstacles,
                goals: &mut self.goals,
                events: &mut self.events,
                rng: &mut self.rng,
            };
            self.helpers.trigger(&mut ctx, pos, paired);
            self.helpers.resolve(&mut ctx)
        }

        fn count(&self, goal: &str) -> u32 {
            self.goals.goals().iter().find(|g| g.goal == goal).map_or(0, |g| g.count)
        }
    }

    #[test]
    fn test_row_clear_sweeps_row_only() {
        let mut f = Fixture::new(&["bbb", "a-a", "bbb"]);
        assert_eq!(f.activate(Pos::new(1, 1), None), 1);
        assert_eq!(f.board.to_ascii(), ["bbb", "...", "bbb"]);
        assert_eq!(f.count("a"), 2);
    }

    #[test]
    fn test_sweep_skips_holes_and_damages_obstacles() {
        let mut f = Fixture::new(&["a#-2A"]);
        f.activate(Pos::new(0, 2), None);
        // Box cracked but stands, ice gone but tile stays, plain tile removed.
        assert_eq!(f.board.to_ascii(), [".#.1a"]);
        assert_eq!(f.count("a"), 1);
        assert_eq!(f.count("box_full"), 0);
    }

    #[test]
    fn test_chain_triggers_each_helper_once() {
        let mut f = Fixture::new(&[
            "a|a", //
            "a-a", //
            "aaa", //
        ]);
        // The column clear sweeps down through the row clear, which fires next.
        assert_eq!(f.activate(Pos::new(0, 1), None), 2);
        assert_eq!(f.board.to_ascii(), ["a.a", "...", "a.a"]);
        // column: (2,1); row: (1,0), (1,2)
        assert_eq!(f.count("a"), 3);

        let fired: Vec<_> = f
            .events
            .iter()
            .filter(|e| matches!(e, BoardEvent::HelperTriggered { .. }))
            .collect();
        assert_eq!(fired.len(), 2);
    }

    #[test]
    fn test_crossing_helpers_do_not_loop() {
        let mut f = Fixture::new(&["-|", "ab"]);
        assert_eq!(f.activate(Pos::new(0, 0), None), 2);
        // The column clear is queued rather than hit, then takes (1,1) itself.
        assert_eq!(f.board.to_ascii(), ["..", "a."]);
        assert_eq!(f.count("b"), 1);
    }

    #[test]
    fn test_color_bomb_with_paired_kind() {
        let mut f = Fixture::new(&["abA", "*ba", "bab"]);
        f.activate(Pos::new(1, 0), Some(Kind::new("a")));
        assert_eq!(f.board.to_ascii(), [".ba", ".b.", "b.b"]);
        assert_eq!(f.count("a"), 3);
    }

    #[test]
    fn test_color_bomb_standalone_picks_neighbor_kind() {
        let mut f = Fixture::new(&["cbc", "b*b", "cbc"]);
        f.activate(Pos::new(1, 1), None);
        assert_eq!(f.board.to_ascii(), ["c.c", "...", "c.c"]);
        assert_eq!(f.count("b"), 4);
    }

    #[test]
    fn test_color_bomb_falls_back_to_any_tile() {
        let mut f = Fixture::new(&["a11", "1*1", "111"]);
        f.activate(Pos::new(1, 1), None);
        assert_eq!(f.board.to_ascii(), [".11", "1.1", "111"]);
    }

    #[test]
    fn test_clear_board() {
        let mut f = Fixture::new(&["a2-", "**B", "#ab"]);
        let mut ctx = RemovalContext {
            board: &mut f.board,
            obstacles: &mut f.obstacles,
            goals: &mut f.goals,
            events: &mut f.events,
            rng: &mut f.rng,
        };
        f.helpers.clear_board(&mut ctx, [Pos::new(1, 0), Pos::new(1, 1)]);
        assert_eq!(f.board.to_ascii(), ["...", "...", "#.."]);
        assert_eq!(f.count("a"), 2);
        assert_eq!(f.count("b"), 2);
        assert_eq!(f.count("box_full"), 1);
    }

    #[test]
    fn test_state_transitions() {
        let mut f = Fixture::new(&["-a"]);
        let id = f.board.tile(Pos::new(0, 0)).unwrap().id;
        assert_eq!(f.helpers.state(id), HelperState::Idle);
        f.activate(Pos::new(0, 0), None);
        assert_eq!(f.helpers.state(id), HelperState::Resolved);
        assert_eq!(f.helpers.pending(), 0);
    }
}
