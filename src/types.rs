// src/types.rs
//
// Common shared types for the adaptive difficulty controller:
// performance tiers, difficulty actions, Q-table state keys and the
// raw attempt outcome handed in by the exercise layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exercise difficulty level. Valid output range is [MIN_DIFFICULTY, MAX_DIFFICULTY];
/// inputs are accepted as-is and only the next level is bounded.
pub type Difficulty = i32;

/// Easiest difficulty level.
pub const MIN_DIFFICULTY: Difficulty = 1;

/// Hardest difficulty level.
pub const MAX_DIFFICULTY: Difficulty = 5;

/// Discrete performance bucket for a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Excellent,
    Average,
    NeedsPractice,
}

impl Tier {
    /// Heuristic prior ("instinct") for a state seen for the first time,
    /// indexed by `Action::index`.
    pub fn instinct(self) -> [f64; 3] {
        match self {
            // Strong push to increase.
            Tier::Excellent => [0.0, 1.0, 10.0],
            // Strong push to decrease.
            Tier::NeedsPractice => [10.0, 1.0, -5.0],
            // Bias to hold.
            Tier::Average => [-1.0, 5.0, 2.0],
        }
    }

    /// Human-readable label for feedback surfaces.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::Average => "Average",
            Tier::NeedsPractice => "Needs Practice",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Difficulty adjustment chosen by the policy.
///
/// Declaration order is the index into every 3-slot action-value array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Decrease,
    Stay,
    Increase,
}

impl Action {
    /// All actions in index order.
    pub const ALL: [Action; 3] = [Action::Decrease, Action::Stay, Action::Increase];

    pub fn index(self) -> usize {
        match self {
            Action::Decrease => 0,
            Action::Stay => 1,
            Action::Increase => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Action> {
        Action::ALL.get(index).copied()
    }

    /// Signed step applied to the difficulty level: -1, 0 or +1.
    pub fn delta(self) -> Difficulty {
        match self {
            Action::Decrease => -1,
            Action::Stay => 0,
            Action::Increase => 1,
        }
    }
}

/// Bound `current + action` to the valid difficulty range.
///
/// This is the only place difficulty is range-checked; the policy may
/// propose stepping past either end.
pub fn clamp_difficulty(current: Difficulty, action: Action) -> Difficulty {
    current
        .saturating_add(action.delta())
        .clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Q-table key: (category, difficulty, tier).
///
/// Category is an arbitrary caller-supplied string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub category: String,
    pub difficulty: Difficulty,
    pub tier: Tier,
}

impl StateKey {
    pub fn new(category: impl Into<String>, difficulty: Difficulty, tier: Tier) -> Self {
        Self {
            category: category.into(),
            difficulty,
            tier,
        }
    }

    /// Key for the post-action state.
    ///
    /// The tier of the next attempt is unknown at update time, so the
    /// just-observed tier is carried forward.
    pub fn next(&self, next_difficulty: Difficulty) -> Self {
        Self {
            category: self.category.clone(),
            difficulty: next_difficulty,
            tier: self.tier,
        }
    }
}

/// Raw outcome of one answered exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub category: String,
    /// Difficulty the exercise was served at.
    pub difficulty: Difficulty,
    pub correct: bool,
    /// Response time in seconds.
    pub elapsed_secs: f64,
    pub hint_used: bool,
}
