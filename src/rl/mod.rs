// src/rl/mod.rs
//
// Tabular reinforcement-learning core of the difficulty controller.
//
// Key components:
// - QTable: sparse (state, action) values with per-tier instinct seeding
// - EpsilonGreedyPolicy: seeded exploration / exploitation
// - Learner: one-step Bellman update
// - AdaptiveDifficultyAgent: the per-attempt control loop + persistence

pub mod agent;
pub mod learner;
pub mod policy;
pub mod q_table;

// Re-exports for convenience
pub use agent::{AdaptiveDifficultyAgent, LearnOutcome, StepReport};
pub use learner::{bellman_update, Learner, ValueUpdate};
pub use policy::{EpsilonGreedyPolicy, Selection, EPSILON_GREEDY_POLICY_VERSION};
pub use q_table::{greedy_action, ActionValues, QTable};
