// src/rl/learner.rs
//
// Online one-step Q-learning update:
//
//     q' = q + alpha * (reward + gamma * max_a' Q(s', a') - q)

use serde::{Deserialize, Serialize};

use super::q_table::QTable;
use crate::types::{Action, StateKey};

/// Bellman target blend for a single value.
pub fn bellman_update(q: f64, reward: f64, max_next_q: f64, alpha: f64, gamma: f64) -> f64 {
    q + alpha * (reward + gamma * max_next_q - q)
}

/// Value at (state, action) before and after one update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueUpdate {
    pub previous: f64,
    pub updated: f64,
    /// max over the next state's row used as the bootstrap.
    pub max_next_q: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Learner {
    pub alpha: f64,
    pub gamma: f64,
}

impl Learner {
    pub fn new(alpha: f64, gamma: f64) -> Self {
        Self { alpha, gamma }
    }

    /// Apply one transition to `table` in place.
    ///
    /// Both rows are seeded on first access; the current row is read before
    /// the next row so that `state == next_state` bootstraps from the
    /// pre-update value.
    pub fn apply(
        &self,
        table: &mut QTable,
        state: &StateKey,
        action: Action,
        reward: f64,
        next_state: &StateKey,
    ) -> ValueUpdate {
        let previous = table.get_values(state)[action.index()];
        let max_next_q = table.max_value(next_state);

        let updated = bellman_update(previous, reward, max_next_q, self.alpha, self.gamma);
        table.set_value(state, action, updated);

        ValueUpdate {
            previous,
            updated,
            max_next_q,
        }
    }
}
