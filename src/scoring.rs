// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Serialize;

use crate::config::ScoringConfig;

/// Running statistics for one session.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub score: u32,
    /// Fully satisfied pairs answered correctly.
    pub correct: u32,
    pub incorrect: u32,
    /// Consecutive correct answers since the last mismatch.
    pub combo: u32,
    pub max_combo: u32,
    pub matched_pairs: usize,
    pub total_pairs: usize,
}

impl Stats {
    pub fn new(total_pairs: usize) -> Self {
        Self {
            total_pairs,
            ..Self::default()
        }
    }

    /// A completed pair. Returns the points awarded.
    pub fn record_correct(&mut self, rules: &ScoringConfig) -> u32 {
        self.correct += 1;
        self.matched_pairs += 1;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        let points = rules.base.saturating_add(combo_bonus(rules, self.combo));
        self.score = self.score.saturating_add(points);
        points
    }

    /// One variant of a one-to-many pair. Counters and combo are untouched.
    pub fn record_partial(&mut self, rules: &ScoringConfig) -> u32 {
        self.score = self.score.saturating_add(rules.partial);
        rules.partial
    }

    /// A mismatch. Returns the points actually deducted.
    pub fn record_incorrect(&mut self, rules: &ScoringConfig) -> u32 {
        self.incorrect += 1;
        self.combo = 0;
        let deducted = self.score.min(rules.penalty);
        self.score -= deducted;
        deducted
    }

    /// Percentage of correct answers, 0 when nothing was attempted.
    pub fn accuracy(&self) -> f64 {
        let attempts = self.correct + self.incorrect;
        if attempts == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(attempts) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.matched_pairs >= self.total_pairs
    }
}

/// Extra points for a streak of length `combo`: nothing below the threshold,
/// then one `bonus_unit` more for every step at or above it.
pub fn combo_bonus(rules: &ScoringConfig, combo: u32) -> u32 {
    if combo < rules.combo_threshold {
        return 0;
    }
    (combo - rules.combo_threshold + 1).saturating_mul(rules.bonus_unit)
}
