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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde::Serialize;

use crate::scoring::Stats;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::card::Side;
use crate::types::catalog_hash::CatalogHash;
use crate::types::pair::Tier;
use crate::types::timestamp::Timestamp;

/// What a renderer needs to draw one card.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: CardId,
    pub side: Side,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    /// Left cards that need more than one match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressView>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct ProgressView {
    pub found: usize,
    pub required: usize,
}

impl CardView {
    pub fn of(card: &Card) -> Self {
        let progress = card
            .progress()
            .filter(|p| p.required() > 1)
            .map(|p| ProgressView {
                found: p.found(),
                required: p.required(),
            });
        Self {
            id: card.id(),
            side: card.side(),
            text: card.text().to_string(),
            tier: card.tier(),
            progress,
        }
    }
}

/// Final statistics of a finished session.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub score: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Percentage, 0 to 100.
    pub accuracy: f64,
    pub max_combo: u32,
    pub matched_pairs: usize,
    pub total_pairs: usize,
    pub duration_ms: u64,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    /// Fingerprint of the catalog the session was played on.
    pub catalog: CatalogHash,
}

impl Summary {
    pub fn new(
        stats: &Stats,
        started_at: Timestamp,
        ended_at: Timestamp,
        catalog: CatalogHash,
    ) -> Self {
        Self {
            score: stats.score,
            correct: stats.correct,
            incorrect: stats.incorrect,
            accuracy: stats.accuracy(),
            max_combo: stats.max_combo,
            matched_pairs: stats.matched_pairs,
            total_pairs: stats.total_pairs,
            duration_ms: ended_at.millis_since(started_at),
            started_at,
            ended_at,
            catalog,
        }
    }
}

/// Instructions for the renderer. Board changes are incremental: after
/// `BoardReady`, the board is only ever patched with `Replace` and `Remove`.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    BoardReady {
        title: String,
        left_label: String,
        right_label: String,
        left: Vec<CardView>,
        right: Vec<CardView>,
        total_pairs: usize,
    },
    Replace {
        side: Side,
        slot: usize,
        old: CardId,
        card: CardView,
    },
    /// The slot is gone; later slots on that side shift down.
    Remove {
        side: Side,
        slot: usize,
        card: CardId,
    },
    Match {
        left: CardId,
        right: CardId,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        points: u32,
        score: u32,
        combo: u32,
    },
    PartialMatch {
        left: CardId,
        right: CardId,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        found: usize,
        required: usize,
        points: u32,
        score: u32,
    },
    Mismatch {
        left: CardId,
        right: CardId,
        deducted: u32,
        score: u32,
    },
    Finished {
        summary: Summary,
    },
}

/// Receives the session's outbound events.
pub trait EventSink: Send {
    fn emit(&mut self, event: Event);
}

/// An in-memory event log. Clones share the same log.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything logged so far.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.acquire())
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.acquire().clone()
    }

    pub fn len(&self) -> usize {
        self.acquire().len()
    }

    pub fn is_empty(&self) -> bool {
        self.acquire().is_empty()
    }

    fn acquire(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: Event) {
        self.acquire().push(event);
    }
}
