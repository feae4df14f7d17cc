// src/config.rs
//
// Central configuration for the adaptive difficulty controller.
// Everything the learning loop needs is passed in explicitly at
// construction time: learning rates, exploration rate, reward timing
// thresholds and the path of the durable Q-table store.

use std::fmt;
use std::path::PathBuf;

/// Default location of the durable Q-table store.
pub const DEFAULT_STORE_PATH: &str = "q_table.json";

/// Coarse exploration preset used by the CLI / research harness.
///
/// Presets only change epsilon on top of the default ("Balanced") centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningProfile {
    Conservative,
    Balanced,
    Exploratory,
}

impl LearningProfile {
    /// Return a stable lowercase name for the profile (used in logs/telemetry).
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningProfile::Conservative => "conservative",
            LearningProfile::Balanced => "balanced",
            LearningProfile::Exploratory => "exploratory",
        }
    }

    /// Parse a profile name (case-insensitive). Returns None if unrecognized.
    pub fn parse(s: &str) -> Option<LearningProfile> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" | "bal" | "b" => Some(LearningProfile::Balanced),
            "conservative" | "cons" | "c" => Some(LearningProfile::Conservative),
            "exploratory" | "explore" | "e" => Some(LearningProfile::Exploratory),
            _ => None,
        }
    }

    fn epsilon(&self) -> f64 {
        match self {
            LearningProfile::Conservative => 0.05,
            LearningProfile::Balanced => 0.2,
            LearningProfile::Exploratory => 0.35,
        }
    }
}

/// Timing thresholds and point values used by the tier classifier and
/// the reward function.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardConfig {
    /// Correct answers strictly faster than this earn the fast bonus (seconds).
    pub fast_threshold_secs: f64,
    /// Correct answers strictly slower than this are "slow" (seconds).
    /// Also separates Excellent from Average.
    pub slow_threshold_secs: f64,
    pub correct_reward: i32,
    pub incorrect_reward: i32,
    pub hint_penalty: i32,
    pub fast_bonus: i32,
    pub slow_penalty: i32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            fast_threshold_secs: 5.0,
            slow_threshold_secs: 15.0,
            correct_reward: 10,
            incorrect_reward: -10,
            hint_penalty: 5,
            fast_bonus: 5,
            slow_penalty: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Human-readable config version.
    pub version: &'static str,
    /// Learning rate alpha in (0, 1].
    pub alpha: f64,
    /// Discount factor gamma in [0, 1].
    pub gamma: f64,
    /// Exploration probability epsilon in [0, 1].
    pub epsilon: f64,
    /// Durable Q-table store.
    pub store_path: PathBuf,
    pub reward: RewardConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            version: "adaptive-difficulty-v1",
            alpha: 0.5,
            gamma: 0.8,
            epsilon: 0.2,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            reward: RewardConfig::default(),
        }
    }
}

impl ControllerConfig {
    pub fn for_profile(profile: LearningProfile) -> Self {
        Self {
            epsilon: profile.epsilon(),
            ..Self::default()
        }
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Check hyperparameters and thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "alpha",
                value: self.alpha,
                expected: "(0, 1]",
            });
        }
        if !self.gamma.is_finite() || !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::OutOfRange {
                field: "gamma",
                value: self.gamma,
                expected: "[0, 1]",
            });
        }
        if !self.epsilon.is_finite() || !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::OutOfRange {
                field: "epsilon",
                value: self.epsilon,
                expected: "[0, 1]",
            });
        }

        let r = &self.reward;
        for (field, value) in [
            ("reward.fast_threshold_secs", r.fast_threshold_secs),
            ("reward.slow_threshold_secs", r.slow_threshold_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    expected: "finite and >= 0",
                });
            }
        }
        if r.fast_threshold_secs > r.slow_threshold_secs {
            return Err(ConfigError::InvertedThresholds {
                fast_secs: r.fast_threshold_secs,
                slow_secs: r.slow_threshold_secs,
            });
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyStorePath);
        }

        Ok(())
    }
}

/// Errors raised by `ControllerConfig::validate`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    InvertedThresholds {
        fast_secs: f64,
        slow_secs: f64,
    },
    EmptyStorePath,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "config field '{}' = {} is outside {}", field, value, expected),
            ConfigError::InvertedThresholds {
                fast_secs,
                slow_secs,
            } => write!(
                f,
                "fast threshold ({}s) must not exceed slow threshold ({}s)",
                fast_secs, slow_secs
            ),
            ConfigError::EmptyStorePath => write!(f, "store path must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
