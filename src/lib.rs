//! Adaptive difficulty core library.
//!
//! A tabular Q-learning controller that watches each answered exercise and
//! decides whether the next one should be easier, the same, or harder. The
//! binary (`src/main.rs`) is a thin research harness that drives the
//! controller with a simulated learner.
//!
//! # Control loop
//!
//! - **Performance** (`performance`): tier classification and reward for one
//!   attempt, plus session-level accuracy / grade / score.
//! - **Q-table** (`rl::q_table`): sparse (category, difficulty, tier) x action
//!   values, seeded from per-tier priors the first time a state is seen.
//! - **Policy** (`rl::policy`): epsilon-greedy over a seeded `ChaCha8Rng`.
//! - **Learner** (`rl::learner`): one-step Bellman update.
//! - **Agent** (`rl::agent`): runs the pipeline and saves after every update.
//! - **Store** (`store`): versioned JSON persistence, atomic overwrite.
//!
//! Persistence faults are returned as values and never stop the loop.

pub mod config;
pub mod logging;
pub mod performance;
pub mod rl;
pub mod session;
pub mod sim;
pub mod store;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use config::{ConfigError, ControllerConfig, LearningProfile, RewardConfig};

pub use logging::{AttemptLog, EventSink, FileSink, NoopSink, StoreEvent};

pub use performance::{
    accuracy_percent, classify_tier, cognitive_score, compute_reward, SessionGrade, SessionReport,
};

pub use rl::{
    AdaptiveDifficultyAgent, EpsilonGreedyPolicy, LearnOutcome, Learner, QTable, Selection,
    StepReport, ValueUpdate,
};

pub use session::{HistoryEntry, PracticeSession, SessionError, SessionLevels, DEFAULT_GAME_LENGTH};

pub use sim::{SimAnswer, SimLearnerConfig, SimulatedLearner};

pub use store::{LoadStatus, QTableStore, StoreError, STORE_FORMAT, STORE_VERSION};

pub use types::{
    clamp_difficulty, Action, AttemptOutcome, Difficulty, StateKey, Tier, MAX_DIFFICULTY,
    MIN_DIFFICULTY,
};
