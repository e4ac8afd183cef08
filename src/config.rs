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

use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::selector::Distribution;

/// The level used when a requested level has no distribution.
pub const FALLBACK_LEVEL: u8 = 2;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub board: BoardConfig,
    pub scoring: ScoringConfig,
    pub timing: TimingConfig,
    /// Overrides for the level → distribution table.
    pub levels: Vec<LevelEntry>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitStrategy {
    /// Pull a partner for every left card straight out of the reservoir.
    Constructive,
    /// Reshuffle the right reservoir until the first slices overlap.
    Retry,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// One right card per left card.
    OneToOne,
    /// Every right variant of a pair becomes a card, and the left card is only
    /// complete once all of them are found.
    OneToMany,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Visible cards per side.
    pub capacity: usize,
    pub strategy: InitStrategy,
    /// Attempts before the retry strategy gives up.
    pub retry_limit: usize,
    pub mode: MatchMode,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            capacity: 6,
            strategy: InitStrategy::Constructive,
            retry_limit: 100,
            mode: MatchMode::OneToOne,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Points for a correct match.
    pub base: u32,
    /// Points lost on a mismatch. Score is floored at zero.
    pub penalty: u32,
    /// Combo length at which the bonus starts.
    pub combo_threshold: u32,
    /// Bonus per combo step at or above the threshold.
    pub bonus_unit: u32,
    /// Points for a partial one-to-many match.
    pub partial: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: 50,
            penalty: 10,
            combo_threshold: 5,
            bonus_unit: 10,
            partial: 50,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub correct_delay_ms: u64,
    pub incorrect_delay_ms: u64,
    /// Upper bound on how long the session may stay in CHECKING.
    pub watchdog_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            correct_delay_ms: 600,
            incorrect_delay_ms: 800,
            watchdog_ms: 5000,
        }
    }
}

impl TimingConfig {
    /// No presentation delays. The watchdog is kept.
    pub fn instant() -> Self {
        Self {
            correct_delay_ms: 0,
            incorrect_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn correct_delay(&self) -> Duration {
        Duration::from_millis(self.correct_delay_ms)
    }

    pub fn incorrect_delay(&self) -> Duration {
        Duration::from_millis(self.incorrect_delay_ms)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_millis(self.watchdog_ms)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelEntry {
    pub level: u8,
    #[serde(default)]
    pub easy: usize,
    #[serde(default)]
    pub medium: usize,
    #[serde(default)]
    pub hard: usize,
}

fn default_distribution(level: u8) -> Option<Distribution> {
    match level {
        1 => Some(Distribution::new(8, 2, 0)),
        2 => Some(Distribution::new(4, 8, 2)),
        3 => Some(Distribution::new(2, 6, 10)),
        _ => None,
    }
}

impl Config {
    /// Load the configuration at `path`, or the defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Fallible<Self> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return fail(format!("config file {} does not exist.", path.display()));
                }
                log::debug!("Loading config from {}.", path.display());
                let content = read_to_string(path)?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Fallible<()> {
        if self.board.capacity == 0 {
            return fail("board capacity must be at least 1.");
        }
        if self.board.retry_limit == 0 {
            return fail("retry limit must be at least 1.");
        }
        if self.scoring.combo_threshold == 0 {
            return fail("combo threshold must be at least 1.");
        }
        Ok(())
    }

    /// The per-tier card counts for `level`. Unknown levels fall back to
    /// level 2.
    pub fn distribution(&self, level: u8) -> Distribution {
        let lookup = |level: u8| {
            self.levels
                .iter()
                .find(|e| e.level == level)
                .map(|e| Distribution::new(e.easy, e.medium, e.hard))
                .or_else(|| default_distribution(level))
        };
        match lookup(level) {
            Some(d) => d,
            None => {
                log::debug!("Unknown level {level}, using level {FALLBACK_LEVEL}.");
                lookup(FALLBACK_LEVEL).unwrap_or(Distribution::new(4, 8, 2))
            }
        }
    }
}
