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
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::Fallible;
use crate::types::catalog_hash::CatalogHash;
use crate::types::pair::Pair;
use crate::types::pair::Tier;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_catalog_stats(path: &Path, format: StatsFormat) -> Fallible<()> {
    let catalog = Catalog::load(path)?;
    let stats = CatalogStats::of(&catalog);
    match format {
        StatsFormat::Text => {
            println!("{} ({})", stats.title, stats.catalog.short());
            println!("pairs:       {}", stats.pair_count);
            println!("multi-right: {}", stats.multi_right_count);
            println!("variants:    {}", stats.variant_count);
            println!(
                "tiers:       {} easy, {} medium, {} hard, {} unrated",
                stats.easy, stats.medium, stats.hard, stats.unrated
            );
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    title: String,
    pair_count: usize,
    multi_right_count: usize,
    /// Right-hand answers across all pairs.
    variant_count: usize,
    easy: usize,
    medium: usize,
    hard: usize,
    unrated: usize,
    catalog: CatalogHash,
}

impl CatalogStats {
    pub fn of(catalog: &Catalog) -> Self {
        let mut stats = CatalogStats {
            title: catalog.title().to_string(),
            pair_count: catalog.len(),
            multi_right_count: 0,
            variant_count: 0,
            easy: 0,
            medium: 0,
            hard: 0,
            unrated: 0,
            catalog: catalog.hash(),
        };
        for pair in catalog.pairs() {
            if matches!(pair, Pair::MultiRight { .. }) {
                stats.multi_right_count += 1;
            }
            for variant in pair.variants() {
                stats.variant_count += 1;
                match variant.tier {
                    Some(Tier::Easy) => stats.easy += 1,
                    Some(Tier::Medium) => stats.medium += 1,
                    Some(Tier::Hard) => stats.hard += 1,
                    None => stats.unrated += 1,
                }
            }
        }
        stats
    }
}
