//! Goal tracking - per-type removal counters, move budget and the win/lose state machine
//!
//! Status moves `Playing -> Won | Lost` exactly once. Win is checked after every counted
//! removal; lose is checked once the board has settled with the budget exhausted, so a
//! cascade started by the last move can still finish the goals.

use serde::Serialize;

use crate::types::GameStatus;

/// One level goal and its progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Goal {
    /// Goal type: an element kind, or `"<box kind>_full"`
    pub goal: String,
    pub target: u32,
    pub count: u32,
}

impl Goal {
    pub fn new(goal: impl Into<String>, target: u32) -> Self {
        Self {
            goal: goal.into(),
            target,
            count: 0,
        }
    }

    pub fn is_met(&self) -> bool {
        self.count >= self.target
    }
}

#[derive(Debug, Clone)]
pub struct GoalTracker {
    goals: Vec<Goal>,
    moves_remaining: u32,
    status: GameStatus,
}

impl GoalTracker {
    pub fn new(goals: Vec<Goal>, moves: u32) -> Self {
        Self {
            goals,
            moves_remaining: moves,
            status: GameStatus::Playing,
        }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn all_met(&self) -> bool {
        !self.goals.is_empty() && self.goals.iter().all(Goal::is_met)
    }

    /// Count one removed tile of `goal_type`.
    ///
    /// Returns the updated goals (usually one); types no goal asks for are ignored.
    pub fn record(&mut self, goal_type: &str) -> Vec<Goal> {
        let mut updated = Vec::new();
        for goal in self.goals.iter_mut().filter(|g| g.goal == goal_type) {
            goal.count = goal.count.saturating_add(1);
            updated.push(goal.clone());
        }
        updated
    }

    /// Spend one move. False (nothing spent) when the budget is empty or the game is over.
    pub fn consume_move(&mut self) -> bool {
        if self.status.is_terminal() || self.moves_remaining == 0 {
            return false;
        }
        self.moves_remaining -= 1;
        true
    }

    /// `Playing -> Won` when every goal is met; returns the new status on transition
    pub fn check_win(&mut self) -> Option<GameStatus> {
        if self.status == GameStatus::Playing && self.all_met() {
            self.status = GameStatus::Won;
            return Some(self.status);
        }
        None
    }

    /// `Playing -> Lost` when the budget is spent and goals remain
    pub fn check_lose(&mut self) -> Option<GameStatus> {
        if self.status == GameStatus::Playing && self.moves_remaining == 0 && !self.all_met() {
            self.status = GameStatus::Lost;
            return Some(self.status);
        }
        None
    }
}
