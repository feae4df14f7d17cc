// src/sim.rs
//
// Synthetic learner for offline policy runs.
//
// Each category has a latent skill on the difficulty scale. The chance of a
// correct answer falls off logistically once difficulty exceeds skill,
// response times stretch with the gap, and hints get more likely when the
// learner is overmatched. Skill drifts up slowly with correct practice.
//
// All sampling is deterministic given a seed.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Difficulty, MAX_DIFFICULTY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimLearnerConfig {
    /// Skill used for categories without an explicit entry.
    pub default_skill: f64,
    /// Per-category skill overrides.
    pub skills: BTreeMap<String, f64>,
    /// Logistic slope of P(correct) against (skill - difficulty).
    pub sharpness: f64,
    /// Median response time at a perfectly matched difficulty (seconds).
    pub base_time_secs: f64,
    /// Extra response time per level of overmatch (seconds).
    pub time_per_level_secs: f64,
    /// Hint probability when difficulty is at or below skill.
    pub base_hint_prob: f64,
    /// Additional hint probability per level of overmatch.
    pub hint_prob_per_level: f64,
    /// Skill gained per correct answer.
    pub learning_rate: f64,
}

impl Default for SimLearnerConfig {
    fn default() -> Self {
        Self {
            default_skill: 3.0,
            skills: BTreeMap::new(),
            sharpness: 1.6,
            base_time_secs: 7.0,
            time_per_level_secs: 5.0,
            base_hint_prob: 0.05,
            hint_prob_per_level: 0.2,
            learning_rate: 0.02,
        }
    }
}

/// One synthetic answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimAnswer {
    pub correct: bool,
    pub elapsed_secs: f64,
    pub hint_used: bool,
}

pub struct SimulatedLearner {
    config: SimLearnerConfig,
    skills: BTreeMap<String, f64>,
    rng: ChaCha8Rng,
}

impl SimulatedLearner {
    pub fn new(config: SimLearnerConfig, seed: u64) -> Self {
        Self {
            skills: config.skills.clone(),
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Current latent skill for a category.
    pub fn skill(&self, category: &str) -> f64 {
        self.skills
            .get(category)
            .copied()
            .unwrap_or(self.config.default_skill)
    }

    /// Probability of a correct answer at `difficulty`.
    pub fn p_correct(&self, category: &str, difficulty: Difficulty) -> f64 {
        // +0.5 puts a matched difficulty slightly on the easy side.
        let margin = self.skill(category) - f64::from(difficulty) + 0.5;
        1.0 / (1.0 + (-self.config.sharpness * margin).exp())
    }

    /// Sample an answer to a question in `category` at `difficulty`.
    pub fn answer(&mut self, category: &str, difficulty: Difficulty) -> SimAnswer {
        let cfg = &self.config;
        let skill = self.skill(category);
        let overmatch = (f64::from(difficulty) - skill).max(0.0);

        let hint_prob = (cfg.base_hint_prob + cfg.hint_prob_per_level * overmatch).min(0.9);
        let hint_used = self.rng.gen::<f64>() < hint_prob;

        // A hint recovers part of the gap.
        let mut p_correct = self.p_correct(category, difficulty);
        if hint_used {
            p_correct += (1.0 - p_correct) * 0.3;
        }
        let correct = self.rng.gen::<f64>() < p_correct;

        let typical = cfg.base_time_secs + cfg.time_per_level_secs * overmatch;
        let jitter: f64 = self.rng.gen_range(0.5..1.5);
        let elapsed_secs = typical * jitter;

        if correct {
            let learning_rate = self.config.learning_rate;
            let entry = self.skills.entry(category.to_string()).or_insert(skill);
            *entry = (*entry + learning_rate).min(f64::from(MAX_DIFFICULTY) + 1.0);
        }

        SimAnswer {
            correct,
            elapsed_secs,
            hint_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_answers() {
        let mut a = SimulatedLearner::new(SimLearnerConfig::default(), 9);
        let mut b = SimulatedLearner::new(SimLearnerConfig::default(), 9);
        for level in [1, 2, 3, 4, 5, 3, 1] {
            assert_eq!(a.answer("math", level), b.answer("math", level));
        }
    }

    #[test]
    fn harder_questions_are_less_likely_correct() {
        let learner = SimulatedLearner::new(SimLearnerConfig::default(), 0);
        let probs: Vec<f64> = (1..=5).map(|d| learner.p_correct("math", d)).collect();
        for w in probs.windows(2) {
            assert!(w[0] > w[1]);
        }
    }

    #[test]
    fn per_category_skill_overrides_default() {
        let mut cfg = SimLearnerConfig::default();
        cfg.skills.insert("memory".to_string(), 1.0);
        let learner = SimulatedLearner::new(cfg, 0);
        assert_eq!(learner.skill("memory"), 1.0);
        assert_eq!(learner.skill("math"), 3.0);
        assert!(learner.p_correct("memory", 4) < learner.p_correct("math", 4));
    }

    #[test]
    fn response_times_are_positive() {
        let mut learner = SimulatedLearner::new(SimLearnerConfig::default(), 5);
        for _ in 0..200 {
            let ans = learner.answer("math", 5);
            assert!(ans.elapsed_secs > 0.0);
        }
    }
}
