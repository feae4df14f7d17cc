// src/performance.rs
//
// Performance scoring.
//
// Per attempt:
// - classify_tier:  correctness / hint / response time -> Tier
// - compute_reward: same inputs -> signed integer reward for the learner
//
// Per session:
// - accuracy_percent, SessionGrade and cognitive_score summarise a whole
//   practice session for feedback.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RewardConfig;
use crate::types::{Difficulty, Tier};

/// Classify one attempt into a performance tier.
///
/// Incorrect answers always need practice. A correct answer is Average if a
/// hint was used or it took longer than the slow threshold, Excellent otherwise.
pub fn classify_tier(cfg: &RewardConfig, correct: bool, hint_used: bool, elapsed_secs: f64) -> Tier {
    if !correct {
        return Tier::NeedsPractice;
    }
    if hint_used || elapsed_secs > cfg.slow_threshold_secs {
        Tier::Average
    } else {
        Tier::Excellent
    }
}

/// Reward for one attempt.
///
/// The hint penalty applies once regardless of correctness; the speed
/// bonus / slow penalty only apply to correct answers. Not clamped.
pub fn compute_reward(cfg: &RewardConfig, correct: bool, hint_used: bool, elapsed_secs: f64) -> i32 {
    let mut reward = if correct {
        cfg.correct_reward
    } else {
        cfg.incorrect_reward
    };

    if hint_used {
        reward -= cfg.hint_penalty;
    }

    if correct {
        if elapsed_secs < cfg.fast_threshold_secs {
            reward += cfg.fast_bonus;
        } else if elapsed_secs > cfg.slow_threshold_secs {
            reward -= cfg.slow_penalty;
        }
    }

    reward
}

// ----- Session-level summaries ---------------------------------------------

/// Expected seconds per question before the speed bonus runs out.
pub const SESSION_TARGET_SECS_PER_QUESTION: f64 = 30.0;

/// Points per correct answer at difficulty 1.
pub const SESSION_POINTS_PER_LEVEL: i64 = 10;

/// Percentage of correct answers, rounded to one decimal place.
pub fn accuracy_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let accuracy = correct as f64 / total as f64 * 100.0;
    (accuracy * 10.0).round() / 10.0
}

/// Coarse feedback bucket for a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionGrade {
    Excellent,
    GoodJob,
    NeedsPractice,
}

impl SessionGrade {
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 85.0 {
            SessionGrade::Excellent
        } else if accuracy >= 60.0 {
            SessionGrade::GoodJob
        } else {
            SessionGrade::NeedsPractice
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionGrade::Excellent => "Excellent",
            SessionGrade::GoodJob => "Good Job",
            SessionGrade::NeedsPractice => "Needs Practice",
        }
    }
}

impl fmt::Display for SessionGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Difficulty-weighted session score.
///
/// Each correct answer is worth `10 * difficulty`. Answering faster than the
/// per-question target adds one point per second saved per correct answer;
/// slow sessions just earn no bonus.
pub fn cognitive_score(correct: usize, total: usize, avg_time_secs: f64, difficulty: Difficulty) -> i64 {
    if total == 0 {
        return 0;
    }

    let points_per_question = SESSION_POINTS_PER_LEVEL * i64::from(difficulty);
    let base = correct as i64 * points_per_question;

    let time_saved = (SESSION_TARGET_SECS_PER_QUESTION - avg_time_secs).max(0.0);
    let speed_bonus = (time_saved * correct as f64) as i64;

    base + speed_bonus
}

/// Summary of one completed practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub category: String,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy_percent: f64,
    pub grade: SessionGrade,
    pub average_time_secs: f64,
    /// Difficulty used for scoring (level reached at the end of the session).
    pub difficulty: Difficulty,
    pub total_score: i64,
    /// Difficulty at each question, in order.
    pub difficulty_trace: Vec<Difficulty>,
}

impl SessionReport {
    pub fn new(
        category: impl Into<String>,
        correct: usize,
        total: usize,
        average_time_secs: f64,
        difficulty: Difficulty,
        difficulty_trace: Vec<Difficulty>,
    ) -> Self {
        let accuracy = accuracy_percent(correct, total);
        Self {
            category: category.into(),
            total_questions: total,
            correct_answers: correct,
            accuracy_percent: accuracy,
            grade: SessionGrade::from_accuracy(accuracy),
            average_time_secs,
            difficulty,
            total_score: cognitive_score(correct, total, average_time_secs, difficulty),
            difficulty_trace,
        }
    }
}
