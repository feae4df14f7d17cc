// src/rl/q_table.rs
//
// Sparse tabular action-value function.
//
// Rows are created lazily the first time a state is looked up and are
// seeded from the state's tier ("instinct" priors) so that the policy
// behaves sensibly before any learning has happened. Rows are never
// removed and never re-seeded.
//
// A BTreeMap keeps iteration order deterministic, which keeps the
// persisted store byte-stable for identical tables.

use std::collections::BTreeMap;

use crate::types::{Action, StateKey};

/// Action values for one state, indexed by `Action::index`.
pub type ActionValues = [f64; 3];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    rows: BTreeMap<StateKey, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values for `state`, seeding the row from its tier on first access.
    pub fn get_values(&mut self, state: &StateKey) -> ActionValues {
        *self.row_mut(state)
    }

    /// Values for `state` without seeding.
    pub fn peek(&self, state: &StateKey) -> Option<&ActionValues> {
        self.rows.get(state)
    }

    /// Highest value for `state` (seeds on first access).
    pub fn max_value(&mut self, state: &StateKey) -> f64 {
        self.row_mut(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Overwrite one action value (seeds the row first if needed).
    pub fn set_value(&mut self, state: &StateKey, action: Action, value: f64) {
        self.row_mut(state)[action.index()] = value;
    }

    /// Insert or replace a whole row. Used when loading from the store.
    pub fn insert(&mut self, state: StateKey, values: ActionValues) -> Option<ActionValues> {
        self.rows.insert(state, values)
    }

    pub fn contains(&self, state: &StateKey) -> bool {
        self.rows.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.rows.iter()
    }

    fn row_mut(&mut self, state: &StateKey) -> &mut ActionValues {
        self.rows
            .entry(state.clone())
            .or_insert_with(|| state.tier.instinct())
    }
}

/// Index of the first maximum; ties resolve to the lowest action index.
pub fn greedy_action(values: &ActionValues) -> Action {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    Action::ALL[best]
}
