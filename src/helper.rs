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

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;
use tempfile::tempdir;

use crate::catalog::Catalog;
use crate::error::Fallible;

pub fn create_tmp_directory() -> Fallible<TempDir> {
    Ok(tempdir()?)
}

fn document(pairs: Vec<Value>) -> String {
    json!({
        "title": "Capitals",
        "leftLabel": "Country",
        "rightLabel": "Capital",
        "pairs": pairs,
    })
    .to_string()
}

/// `n` unrated one-to-one pairs.
pub fn simple_catalog_json(n: usize) -> String {
    let pairs = (1..=n)
        .map(|i| {
            json!({
                "id": i,
                "left": format!("country-{i}"),
                "right": format!("capital-{i}"),
                "description": format!("capital-{i} is the capital of country-{i}"),
            })
        })
        .collect();
    document(pairs)
}

/// One-to-one pairs with the given number of easy, medium and hard pairs.
pub fn tiered_catalog_json(easy: usize, medium: usize, hard: usize) -> String {
    let mut pairs = Vec::new();
    let tiers = [(1, easy), (2, medium), (3, hard)];
    for (difficulty, count) in tiers {
        for _ in 0..count {
            let i = pairs.len() + 1;
            pairs.push(json!({
                "id": i,
                "left": format!("left-{i}"),
                "right": format!("right-{i}"),
                "difficulty": difficulty,
            }));
        }
    }
    document(pairs)
}

/// Four pairs: the first with three right variants (one per tier), the rest
/// with a single easy variant.
pub fn multi_right_catalog_json() -> String {
    document(vec![
        json!({
            "id": "hund",
            "left": "Hund",
            "rights": [
                {"text": "dog", "difficulty": 1, "description": "common"},
                {"text": "hound", "difficulty": 2},
                {"text": "canine", "difficulty": 3},
            ],
        }),
        json!({"id": "katze", "left": "Katze", "rights": [{"text": "cat", "difficulty": 1}]}),
        json!({"id": "maus", "left": "Maus", "rights": [{"text": "mouse", "difficulty": 1}]}),
        json!({"id": "vogel", "left": "Vogel", "rights": [{"text": "bird", "difficulty": 1}]}),
    ])
}

pub fn simple_catalog(n: usize) -> Catalog {
    Catalog::from_json(&simple_catalog_json(n)).unwrap()
}

pub fn multi_right_catalog() -> Catalog {
    Catalog::from_json(&multi_right_catalog_json()).unwrap()
}
