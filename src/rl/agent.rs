// src/rl/agent.rs
//
// Adaptive difficulty controller.
//
// Owns the Q-table, the epsilon-greedy policy, the learner and the optional
// durable store. One call to `process_attempt` is the full per-question unit
// of work:
//
//   classify tier + reward -> encode state -> select action -> clamp
//   -> learn -> persist
//
// Persistence failures never interrupt the loop: they come back as values
// and the in-memory table stays authoritative.

use crate::config::{ControllerConfig, RewardConfig};
use crate::logging::AttemptLog;
use crate::performance::{classify_tier, compute_reward};
use crate::store::{LoadStatus, QTableStore, StoreError};
use crate::types::{clamp_difficulty, Action, AttemptOutcome, Difficulty, StateKey, Tier};

use super::learner::{Learner, ValueUpdate};
use super::policy::{EpsilonGreedyPolicy, Selection};
use super::q_table::{ActionValues, QTable};

/// Result of one `learn` call.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnOutcome {
    pub update: ValueUpdate,
    /// Set when the post-update save failed. The update itself is kept.
    pub persist_error: Option<StoreError>,
}

/// Everything produced while processing one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub state: StateKey,
    pub tier: Tier,
    pub reward: i32,
    pub selection: Selection,
    pub next_difficulty: Difficulty,
    pub update: ValueUpdate,
    pub persist_error: Option<StoreError>,
}

impl StepReport {
    pub fn action(&self) -> Action {
        self.selection.action
    }

    pub fn to_log(&self, attempt_index: usize, attempt: &AttemptOutcome) -> AttemptLog {
        AttemptLog {
            attempt_index,
            category: attempt.category.clone(),
            difficulty: attempt.difficulty,
            correct: attempt.correct,
            elapsed_secs: attempt.elapsed_secs,
            hint_used: attempt.hint_used,
            tier: self.tier,
            reward: self.reward,
            action: self.selection.action,
            explored: self.selection.explored,
            next_difficulty: self.next_difficulty,
            q_before: self.update.previous,
            q_after: self.update.updated,
            persist_error: self.persist_error.as_ref().map(|e| e.to_string()),
        }
    }
}

pub struct AdaptiveDifficultyAgent {
    table: QTable,
    policy: EpsilonGreedyPolicy,
    learner: Learner,
    reward_cfg: RewardConfig,
    store: Option<QTableStore>,
}

impl AdaptiveDifficultyAgent {
    /// In-memory controller with an empty table and no durable store.
    ///
    /// `cfg.store_path` is ignored here; use `open` for a durable controller.
    pub fn new(cfg: &ControllerConfig, seed: u64) -> Self {
        Self::with_table(cfg, QTable::new(), seed)
    }

    /// In-memory controller starting from `table`.
    pub fn with_table(cfg: &ControllerConfig, table: QTable, seed: u64) -> Self {
        Self {
            table,
            policy: EpsilonGreedyPolicy::new(cfg.epsilon, seed),
            learner: Learner::new(cfg.alpha, cfg.gamma),
            reward_cfg: cfg.reward.clone(),
            store: None,
        }
    }

    /// Controller backed by the store at `cfg.store_path`.
    ///
    /// Loads the table if the store exists; any failure starts cold and is
    /// reported in the returned status.
    pub fn open(cfg: &ControllerConfig, seed: u64) -> (Self, LoadStatus) {
        let store = QTableStore::new(&cfg.store_path);
        let (table, status) = store.load_or_empty();

        let mut agent = Self::with_table(cfg, table, seed);
        agent.store = Some(store);
        (agent, status)
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn store(&self) -> Option<&QTableStore> {
        self.store.as_ref()
    }

    pub fn policy(&self) -> &EpsilonGreedyPolicy {
        &self.policy
    }

    /// Action values for a state (seeds unseen states).
    pub fn get_values(&mut self, state: &StateKey) -> ActionValues {
        self.table.get_values(state)
    }

    /// Epsilon-greedy choice for (category, difficulty, tier).
    pub fn choose_action(&mut self, category: &str, difficulty: Difficulty, tier: Tier) -> Action {
        self.select(&StateKey::new(category, difficulty, tier)).action
    }

    /// Like `choose_action`, also reporting whether the choice explored.
    pub fn select(&mut self, state: &StateKey) -> Selection {
        // Looked up before the exploration roll so the row is always seeded.
        let values = self.table.get_values(state);
        self.policy.select(&values)
    }

    pub fn next_difficulty(current: Difficulty, action: Action) -> Difficulty {
        clamp_difficulty(current, action)
    }

    /// Bellman update for one transition, then a full synchronous save.
    pub fn learn(
        &mut self,
        state: &StateKey,
        action: Action,
        reward: f64,
        next_state: &StateKey,
    ) -> LearnOutcome {
        let update = self
            .learner
            .apply(&mut self.table, state, action, reward, next_state);

        LearnOutcome {
            update,
            persist_error: self.save().err(),
        }
    }

    /// Persist the full table. No-op without a store.
    pub fn save(&self) -> Result<(), StoreError> {
        match &self.store {
            Some(store) => store.save(&self.table),
            None => Ok(()),
        }
    }

    /// Run the whole pipeline for one answered exercise.
    pub fn process_attempt(&mut self, attempt: &AttemptOutcome) -> StepReport {
        let cfg = &self.reward_cfg;
        let tier = classify_tier(cfg, attempt.correct, attempt.hint_used, attempt.elapsed_secs);
        let reward = compute_reward(cfg, attempt.correct, attempt.hint_used, attempt.elapsed_secs);

        let state = StateKey::new(attempt.category.as_str(), attempt.difficulty, tier);
        let selection = self.select(&state);
        let next_difficulty = Self::next_difficulty(attempt.difficulty, selection.action);
        let next_state = state.next(next_difficulty);

        let outcome = self.learn(&state, selection.action, f64::from(reward), &next_state);

        StepReport {
            state,
            tier,
            reward,
            selection,
            next_difficulty,
            update: outcome.update,
            persist_error: outcome.persist_error,
        }
    }
}
