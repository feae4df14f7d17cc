// src/session.rs
//
// Fixed-length practice session around the controller.
//
// A session serves `game_length` questions in one category. After each
// answer the controller picks the next difficulty; when the session is
// complete the level reached is remembered for the category (in process
// memory only) and used as the starting level of the next session.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logging::{EventSink, StoreEvent};
use crate::performance::SessionReport;
use crate::rl::{AdaptiveDifficultyAgent, StepReport};
use crate::types::{Action, AttemptOutcome, Difficulty, Tier, MAX_DIFFICULTY, MIN_DIFFICULTY};

/// Questions per session.
pub const DEFAULT_GAME_LENGTH: usize = 5;

/// Per-category starting levels for the current process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLevels {
    levels: BTreeMap<String, Difficulty>,
}

impl SessionLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starting level for `category` (easiest level if never played).
    pub fn get(&self, category: &str) -> Difficulty {
        self.levels.get(category).copied().unwrap_or(MIN_DIFFICULTY)
    }

    pub fn set(&mut self, category: &str, level: Difficulty) {
        self.levels.insert(
            category.to_string(),
            level.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY),
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Difficulty)> {
        self.levels.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub difficulty: Difficulty,
    pub correct: bool,
    pub elapsed_secs: f64,
    pub hint_used: bool,
    pub tier: Tier,
    pub reward: i32,
    pub action: Action,
    pub next_difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// All questions have already been answered.
    AlreadyComplete { game_length: usize },
    /// The session cannot be scored yet.
    Incomplete { played: usize, game_length: usize },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyComplete { game_length } => {
                write!(f, "session already answered all {} questions", game_length)
            }
            SessionError::Incomplete {
                played,
                game_length,
            } => write!(
                f,
                "session incomplete: {} of {} questions answered",
                played, game_length
            ),
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, Clone, PartialEq)]
pub struct PracticeSession {
    category: String,
    game_length: usize,
    current_difficulty: Difficulty,
    history: Vec<HistoryEntry>,
}

impl PracticeSession {
    /// Start a session at the level remembered for `category`.
    pub fn start(category: &str, levels: &SessionLevels, game_length: usize) -> Self {
        Self {
            category: category.to_string(),
            game_length,
            current_difficulty: levels.get(category),
            history: Vec::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn game_length(&self) -> usize {
        self.game_length
    }

    /// Difficulty of the next question to serve.
    pub fn current_difficulty(&self) -> Difficulty {
        self.current_difficulty
    }

    pub fn questions_played(&self) -> usize {
        self.history.len()
    }

    pub fn is_complete(&self) -> bool {
        self.history.len() >= self.game_length
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Difficulty served at each question so far.
    pub fn difficulty_trace(&self) -> Vec<Difficulty> {
        self.history.iter().map(|h| h.difficulty).collect()
    }

    /// Feed one answer through the controller and advance the difficulty.
    pub fn record_attempt(
        &mut self,
        agent: &mut AdaptiveDifficultyAgent,
        correct: bool,
        elapsed_secs: f64,
        hint_used: bool,
        sink: &mut dyn EventSink,
    ) -> Result<StepReport, SessionError> {
        if self.is_complete() {
            return Err(SessionError::AlreadyComplete {
                game_length: self.game_length,
            });
        }

        let attempt = AttemptOutcome {
            category: self.category.clone(),
            difficulty: self.current_difficulty,
            correct,
            elapsed_secs,
            hint_used,
        };
        let report = agent.process_attempt(&attempt);

        sink.log_attempt(&report.to_log(self.history.len(), &attempt));
        if let (Some(err), Some(store)) = (&report.persist_error, agent.store()) {
            sink.log_store_event(&StoreEvent::save_failed(store.path(), err));
        }

        self.history.push(HistoryEntry {
            difficulty: attempt.difficulty,
            correct,
            elapsed_secs,
            hint_used,
            tier: report.tier,
            reward: report.reward,
            action: report.action(),
            next_difficulty: report.next_difficulty,
        });
        self.current_difficulty = report.next_difficulty;

        Ok(report)
    }

    /// Score a completed session and remember the level reached.
    pub fn finish(
        self,
        levels: &mut SessionLevels,
        sink: &mut dyn EventSink,
    ) -> Result<SessionReport, SessionError> {
        if !self.is_complete() {
            return Err(SessionError::Incomplete {
                played: self.history.len(),
                game_length: self.game_length,
            });
        }

        levels.set(&self.category, self.current_difficulty);

        let total = self.history.len();
        let correct = self.history.iter().filter(|h| h.correct).count();
        let average_time_secs = if total == 0 {
            0.0
        } else {
            self.history.iter().map(|h| h.elapsed_secs).sum::<f64>() / total as f64
        };

        let trace = self.difficulty_trace();
        let report = SessionReport::new(
            self.category,
            correct,
            total,
            average_time_secs,
            self.current_difficulty,
            trace,
        );
        sink.log_session(&report);
        Ok(report)
    }
}
