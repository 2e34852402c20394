//! Helper tests - line clears, color bombs, helper combinations and chains

mod common;

use std::collections::HashSet;

use common::{ascii, game, goal_count, p, removed, removed_by, tile_count};
use tile_cascade::core::{MoveOutcome, Phase};
use tile_cascade::types::{BoardEvent, HelperKind, Move, ObstacleKind, RemovalCause, TileId};

const ROWS: [&str; 7] = [
    "elwgelw", "wgelwge", "elwgelw", "wgelwge", "elwgelw", "wgelwge", "elwgelw",
];

/// The base pattern with row 3 replaced
fn with_row3(row: &'static str) -> [&'static str; 7] {
    let mut rows = ROWS;
    rows[3] = row;
    rows
}

fn triggered(events: &[BoardEvent]) -> Vec<TileId> {
    events
        .iter()
        .filter_map(|e| match e {
            BoardEvent::HelperTriggered { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}

fn removed_ids(events: &[BoardEvent]) -> Vec<TileId> {
    events
        .iter()
        .filter_map(|e| match e {
            BoardEvent::TileRemoved { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}

#[test]
fn test_swapped_line_helpers_clear_row_and_column() {
    let mut g = game(&with_row3("wge|-ge"), &[("energy", 99)], 10);
    g.drain_events();

    // After the swap the row clear sits at (3,3) and the column clear at (3,4).
    assert_eq!(g.begin_move(Move::Swap(p(3, 3), p(3, 4))), Ok(MoveOutcome::Started));
    let events = g.drain_events();

    let fired = triggered(&events);
    assert_eq!(fired.len(), 2);
    assert_ne!(fired[0], fired[1]);

    let ids = removed_ids(&events);
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), 13);
    assert_eq!(unique.len(), 13);
    assert_eq!(removed_by(&events, RemovalCause::HelperFired), 2);
    assert_eq!(removed_by(&events, RemovalCause::Sweep), 11);
    assert_eq!(goal_count(&g, "energy"), 6);

    let board = ascii(g.board());
    assert_eq!(board[3], ".......");
    assert!(board.iter().all(|row| row.as_bytes()[4] == b'.'));
    assert_eq!(g.report().helpers_fired, 2);
    assert_eq!(g.moves_remaining(), 9);
}

#[test]
fn test_color_bomb_swap_clears_partner_kind_and_cracks_ice() {
    let rows = [
        "slwgels", "wgelwge", "elSgelw", "wge*sge", "elwgeSw", "wgelwge", "eswgelw",
    ];
    let mut g = game(&rows, &[("smartphone", 99)], 10);
    g.drain_events();

    g.begin_move(Move::Swap(p(3, 3), p(3, 4))).unwrap();
    let events = g.drain_events();

    let mut picked: Vec<_> = removed(&events)
        .into_iter()
        .filter(|(_, cause)| *cause == RemovalCause::ColorBomb)
        .map(|(pos, _)| pos)
        .collect();
    picked.sort();
    assert_eq!(picked, vec![p(0, 0), p(0, 6), p(3, 3), p(6, 1)]);
    assert!(removed(&events).contains(&(p(3, 4), RemovalCause::HelperFired)));

    let cracked: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            BoardEvent::ObstacleDamaged {
                pos,
                obstacle: ObstacleKind::Ice,
                remaining: 0,
                ..
            } => Some(*pos),
            _ => None,
        })
        .collect();
    assert_eq!(cracked, vec![p(2, 2), p(4, 5)]);
    assert_eq!(goal_count(&g, "smartphone"), 4);

    // Freed from ice, the two survivors are plain smartphones again.
    let board = ascii(g.board());
    assert_eq!(&board[2][2..3], "s");
    assert_eq!(&board[4][5..6], "s");
}

#[test]
fn test_two_color_bombs_clear_the_board() {
    let mut g = game(&with_row3("wge**ge"), &[("energy", 99)], 10);
    g.drain_events();

    g.begin_move(Move::Swap(p(3, 3), p(3, 4))).unwrap();
    let events = g.drain_events();

    assert_eq!(tile_count(g.board()), 0);
    assert_eq!(removed_ids(&events).len(), 49);
    assert_eq!(removed_by(&events, RemovalCause::HelperFired), 2);
    assert_eq!(removed_by(&events, RemovalCause::BoardClear), 47);
    assert_eq!(triggered(&events).len(), 2);
    assert_eq!(goal_count(&g, "energy"), 14);

    while g.step() {}
    assert!(g.board().is_settled());
    assert!(g.find_matches().is_empty());
}

#[test]
fn test_bomb_swapped_with_line_helper_fires_both() {
    let mut g = game(&with_row3("wge*-ge"), &[("energy", 99)], 10);
    g.drain_events();

    g.begin_move(Move::Swap(p(3, 3), p(3, 4))).unwrap();
    let events = g.drain_events();

    let helpers: Vec<HelperKind> = events
        .iter()
        .filter_map(|e| match e {
            BoardEvent::HelperTriggered { helper, .. } => Some(*helper),
            _ => None,
        })
        .collect();
    assert_eq!(helpers, vec![HelperKind::RowClear, HelperKind::ColorBomb]);
    assert_eq!(ascii(g.board())[3], ".......");
    assert!(removed_by(&events, RemovalCause::ColorBomb) > 0);
    assert_eq!(g.report().helpers_fired, 2);
}

#[test]
fn test_tapped_row_clear_chains_into_column_clear() {
    let mut g = game(&with_row3("w-elw|e"), &[("energy", 99), ("leaf", 99)], 10);
    g.drain_events();

    g.begin_move(Move::Activate(p(3, 1))).unwrap();
    let events = g.drain_events();

    assert_eq!(
        events.first(),
        Some(&BoardEvent::MovesChanged { remaining: 9 })
    );
    assert_eq!(triggered(&events).len(), 2);
    assert_eq!(removed_ids(&events).len(), 13);
    assert_eq!(goal_count(&g, "energy"), 2);
    assert_eq!(goal_count(&g, "leaf"), 5);

    let board = ascii(g.board());
    assert_eq!(board[3], ".......");
    assert!(board.iter().all(|row| row.as_bytes()[5] == b'.'));
    assert_eq!(g.phase(), Phase::Matching);
}

#[test]
fn test_sweep_damages_obstacles_in_its_line() {
    let mut g = game(&with_row3("wL1-2ge"), &[("energy", 99), ("box_full", 5)], 10);
    g.drain_events();

    g.begin_move(Move::Activate(p(3, 3))).unwrap();
    let events = g.drain_events();

    assert_eq!(
        removed(&events)
            .iter()
            .filter(|(pos, _)| pos.row == 3)
            .count(),
        5
    );
    assert!(removed(&events).contains(&(p(3, 2), RemovalCause::BoxCleared)));
    assert_eq!(goal_count(&g, "box_full"), 1);
    // Ice cracked, the strength-2 box dented: both survive the sweep.
    assert_eq!(ascii(g.board())[3], ".l..1..");
}
