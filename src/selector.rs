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

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::types::pair::PairId;
use crate::types::pair::Tier;

/// Requested number of pairs per difficulty tier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct Distribution {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl Distribution {
    pub fn new(easy: usize, medium: usize, hard: usize) -> Self {
        Self { easy, medium, hard }
    }

    pub fn get(&self, tier: Tier) -> usize {
        match tier {
            Tier::Easy => self.easy,
            Tier::Medium => self.medium,
            Tier::Hard => self.hard,
        }
    }

    fn set(&mut self, tier: Tier, value: usize) {
        match tier {
            Tier::Easy => self.easy = value,
            Tier::Medium => self.medium = value,
            Tier::Hard => self.hard = value,
        }
    }

    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }
}

/// One chosen (pair, right variant) combination.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Selection {
    pub pair: PairId,
    pub variant: usize,
}

#[derive(Debug)]
pub struct SelectionReport {
    /// The selections, in the order they were accepted. The length of this
    /// list, not the request, is authoritative.
    pub selections: Vec<Selection>,
    /// Per-tier demand the tiered passes could not meet.
    pub shortfall: Distribution,
    /// How much of the shortfall was covered by unrated variants.
    pub unrated: usize,
}

impl SelectionReport {
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Pick at most `wanted.total()` (pair, variant) combinations, each left value
/// used at most once, satisfying hard demand first.
///
/// Unrated variants (simple pairs without a difficulty) are only used to cover
/// demand the tiered passes could not meet. A shortfall is logged, never
/// fatal.
pub fn select_pairs(
    catalog: &Catalog,
    wanted: Distribution,
    rng: &mut impl Rng,
) -> SelectionReport {
    let mut buckets: [Vec<Selection>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut unrated: Vec<Selection> = Vec::new();
    for (index, pair) in catalog.pairs().iter().enumerate() {
        for (variant, v) in pair.variants().enumerate() {
            let selection = Selection {
                pair: PairId::new(index),
                variant,
            };
            match v.tier {
                Some(tier) => buckets[bucket_index(tier)].push(selection),
                None => unrated.push(selection),
            }
        }
    }
    for bucket in buckets.iter_mut() {
        bucket.shuffle(rng);
    }
    unrated.shuffle(rng);

    // Claimed left values are skipped on every later pass, which purges the
    // other variants of that left from all buckets.
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut selections: Vec<Selection> = Vec::with_capacity(wanted.total());
    let mut shortfall = Distribution::default();

    for tier in Tier::PRIORITY {
        let limit = wanted.get(tier);
        if limit == 0 {
            continue;
        }
        let taken = claim(
            catalog,
            &buckets[bucket_index(tier)],
            limit,
            &mut claimed,
            &mut selections,
        );
        shortfall.set(tier, limit - taken);
    }

    let unrated_taken = claim(
        catalog,
        &unrated,
        shortfall.total(),
        &mut claimed,
        &mut selections,
    );

    let missing = shortfall.total() - unrated_taken;
    if missing > 0 {
        for tier in Tier::PRIORITY {
            let short = shortfall.get(tier);
            if short > 0 {
                log::warn!(
                    "Requested {} {} pairs, {} short.",
                    wanted.get(tier),
                    tier.as_str(),
                    short
                );
            }
        }
        log::warn!(
            "Selected {} of {} requested pairs.",
            selections.len(),
            wanted.total()
        );
    } else if unrated_taken > 0 {
        log::debug!("Covered {unrated_taken} pairs with unrated variants.");
    }

    SelectionReport {
        selections,
        shortfall,
        unrated: unrated_taken,
    }
}

/// Accept up to `limit` candidates whose left value is still unclaimed.
fn claim<'a>(
    catalog: &'a Catalog,
    candidates: &[Selection],
    limit: usize,
    claimed: &mut HashSet<&'a str>,
    selections: &mut Vec<Selection>,
) -> usize {
    let mut taken = 0;
    for candidate in candidates {
        if taken == limit {
            break;
        }
        let Some(pair) = catalog.pair(candidate.pair) else {
            continue;
        };
        if claimed.insert(pair.left()) {
            selections.push(*candidate);
            taken += 1;
        }
    }
    taken
}

fn bucket_index(tier: Tier) -> usize {
    match tier {
        Tier::Easy => 0,
        Tier::Medium => 1,
        Tier::Hard => 2,
    }
}
