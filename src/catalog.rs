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
use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::catalog_hash::CatalogHash;
use crate::types::pair::Pair;
use crate::types::pair::PairId;
use crate::types::pair::PairKey;
use crate::types::pair::RightVariant;
use crate::types::pair::Tier;

/// Catalogs smaller than this are rejected.
pub const MIN_PAIRS: usize = 3;

/// Catalogs smaller than this are accepted with a warning.
pub const RECOMMENDED_PAIRS: usize = 6;

/// A validated theme: a title, the two column labels, and the pairs.
#[derive(Clone, Debug)]
pub struct Catalog {
    title: String,
    left_label: String,
    right_label: String,
    pairs: Vec<Pair>,
    hash: CatalogHash,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPair {
    id: Option<PairKey>,
    left: Option<String>,
    right: Option<String>,
    description: Option<String>,
    difficulty: Option<u8>,
    rights: Option<Vec<RawRight>>,
}

#[derive(Deserialize)]
struct RawRight {
    text: Option<String>,
    difficulty: Option<u8>,
    description: Option<String>,
}

impl Catalog {
    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail(format!("catalog {} does not exist.", path.display()));
        }
        let content = read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| ErrorReport::new(format!("{}: {}", path.display(), e.message())))
    }

    /// Parse and validate a catalog document.
    pub fn from_json(content: &str) -> Fallible<Self> {
        let document: Value = serde_json::from_str(content)?;
        let Value::Object(mut document) = document else {
            return fail("catalog must be a JSON object.");
        };
        let text_field = |name: &str, document: &serde_json::Map<String, Value>| {
            document
                .get(name)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let title = text_field("title", &document).unwrap_or_else(|| "Untitled".to_string());
        let left_label = text_field("leftLabel", &document).unwrap_or_else(|| "Left".to_string());
        let right_label =
            text_field("rightLabel", &document).unwrap_or_else(|| "Right".to_string());

        let raw_pairs = match document.remove("pairs") {
            Some(Value::Array(pairs)) => pairs,
            Some(_) => return fail("`pairs` must be an array."),
            None => return fail("catalog has no `pairs`."),
        };
        if raw_pairs.is_empty() {
            return fail("catalog has no pairs.");
        }
        if raw_pairs.len() < MIN_PAIRS {
            return fail(format!(
                "catalog has {} pairs, at least {MIN_PAIRS} are required.",
                raw_pairs.len()
            ));
        }
        if raw_pairs.len() < RECOMMENDED_PAIRS {
            log::warn!(
                "Catalog '{title}' has only {} pairs; {RECOMMENDED_PAIRS} or more are recommended.",
                raw_pairs.len()
            );
        }

        let mut keys: HashSet<PairKey> = HashSet::new();
        let mut pairs = Vec::with_capacity(raw_pairs.len());
        for (index, raw) in raw_pairs.into_iter().enumerate() {
            let raw: RawPair = serde_json::from_value(raw)
                .map_err(|e| ErrorReport::new(format!("pair #{index} is malformed: {e}")))?;
            let pair = validate_pair(index, raw)?;
            if !keys.insert(pair.key().clone()) {
                return fail(format!("duplicate pair id: {}.", pair.key()));
            }
            pairs.push(pair);
        }

        Ok(Self {
            title,
            left_label,
            right_label,
            pairs,
            hash: CatalogHash::hash_bytes(content.as_bytes()),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn left_label(&self) -> &str {
        &self.left_label
    }

    pub fn right_label(&self) -> &str {
        &self.right_label
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn pair(&self, id: PairId) -> Option<&Pair> {
        self.pairs.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn hash(&self) -> CatalogHash {
        self.hash
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_tier(index: usize, difficulty: u8) -> Fallible<Tier> {
    Tier::from_level(difficulty).ok_or_else(|| {
        ErrorReport::new(format!(
            "pair #{index} has difficulty {difficulty}, expected 1, 2 or 3."
        ))
    })
}

fn validate_pair(index: usize, raw: RawPair) -> Fallible<Pair> {
    let Some(key) = raw.id else {
        return fail(format!("pair #{index} has no id."));
    };
    let Some(left) = non_empty(raw.left) else {
        return fail(format!("pair {key} has no left value."));
    };
    let description = non_empty(raw.description);
    match raw.rights {
        Some(rights) if !rights.is_empty() => {
            let mut variants = Vec::with_capacity(rights.len());
            for (i, right) in rights.into_iter().enumerate() {
                let Some(text) = non_empty(right.text) else {
                    return fail(format!("pair {key}: right #{i} has no text."));
                };
                let Some(difficulty) = right.difficulty else {
                    return fail(format!("pair {key}: right #{i} has no difficulty."));
                };
                variants.push(RightVariant {
                    text,
                    tier: parse_tier(index, difficulty)?,
                    description: non_empty(right.description).or_else(|| description.clone()),
                });
            }
            Ok(Pair::MultiRight {
                key,
                left,
                rights: variants,
            })
        }
        _ => {
            let Some(right) = non_empty(raw.right) else {
                return fail(format!("pair {key} has neither a right value nor rights."));
            };
            let tier = match raw.difficulty {
                Some(d) => Some(parse_tier(index, d)?),
                None => None,
            };
            Ok(Pair::Simple {
                key,
                left,
                right,
                tier,
                description,
            })
        }
    }
}
