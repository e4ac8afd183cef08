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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::config::MatchMode;

/// Index of a pair within its catalog. Stable for the lifetime of a session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
pub struct PairId(usize);

impl PairId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// The `id` of a pair as written in the catalog document.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PairKey {
    Number(i64),
    Text(String),
}

impl Display for PairKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PairKey::Number(n) => write!(f, "{n}"),
            PairKey::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    /// Tiers in the order the selector satisfies them: scarce hard demand
    /// first, so that easy picks cannot exhaust shared left values.
    pub const PRIORITY: [Tier; 3] = [Tier::Hard, Tier::Medium, Tier::Easy];

    /// Parse the numeric difficulty used by catalog documents.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Tier::Easy),
            2 => Some(Tier::Medium),
            3 => Some(Tier::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        }
    }
}

/// One right-hand answer of a multi-right pair.
#[derive(Clone, Debug)]
pub struct RightVariant {
    pub text: String,
    pub tier: Tier,
    pub description: Option<String>,
}

/// A borrowed view of any right-hand answer, regardless of pair shape.
#[derive(Clone, Copy, Debug)]
pub struct Variant<'a> {
    pub text: &'a str,
    /// `None` for simple pairs that carry no difficulty.
    pub tier: Option<Tier>,
    pub description: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub enum Pair {
    Simple {
        key: PairKey,
        left: String,
        right: String,
        tier: Option<Tier>,
        description: Option<String>,
    },
    MultiRight {
        key: PairKey,
        left: String,
        /// Never empty.
        rights: Vec<RightVariant>,
    },
}

impl Pair {
    pub fn key(&self) -> &PairKey {
        match self {
            Pair::Simple { key, .. } => key,
            Pair::MultiRight { key, .. } => key,
        }
    }

    pub fn left(&self) -> &str {
        match self {
            Pair::Simple { left, .. } => left,
            Pair::MultiRight { left, .. } => left,
        }
    }

    pub fn variant_count(&self) -> usize {
        match self {
            Pair::Simple { .. } => 1,
            Pair::MultiRight { rights, .. } => rights.len(),
        }
    }

    pub fn variant(&self, index: usize) -> Option<Variant<'_>> {
        match self {
            Pair::Simple {
                right,
                tier,
                description,
                ..
            } => (index == 0).then(|| Variant {
                text: right,
                tier: *tier,
                description: description.as_deref(),
            }),
            Pair::MultiRight { rights, .. } => rights.get(index).map(|r| Variant {
                text: &r.text,
                tier: Some(r.tier),
                description: r.description.as_deref(),
            }),
        }
    }

    pub fn variants(&self) -> impl Iterator<Item = Variant<'_>> {
        (0..self.variant_count()).filter_map(|i| self.variant(i))
    }

    /// How many distinct right cards must be matched before the left card
    /// of this pair is complete.
    pub fn required_completions(&self, mode: MatchMode) -> usize {
        match (self, mode) {
            (Pair::Simple { .. }, _) => 1,
            (Pair::MultiRight { .. }, MatchMode::OneToOne) => 1,
            (Pair::MultiRight { rights, .. }, MatchMode::OneToMany) => rights.len(),
        }
    }
}
