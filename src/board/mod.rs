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

mod init;
mod refill;

pub use init::InitReport;
pub use init::initialize;
pub use refill::RefillReport;
pub use refill::Vacated;
pub use refill::refill;

use crate::types::card::CardId;
use crate::types::card::CardSet;
use crate::types::card::Side;

/// The visible window: up to `capacity` cards per side, in display order.
#[derive(Debug)]
pub struct Board {
    capacity: usize,
    left: Vec<CardId>,
    right: Vec<CardId>,
}

/// A single mutation of the board, in the order it was applied.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardChange {
    /// The card at `slot` was swapped for a card from the reservoir.
    Replace {
        side: Side,
        slot: usize,
        old: CardId,
        new: CardId,
    },
    /// The slot was removed; later slots shift down by one.
    Remove {
        side: Side,
        slot: usize,
        old: CardId,
    },
}

impl Board {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            left: Vec::with_capacity(capacity),
            right: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slots(&self, side: Side) -> &[CardId] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn slots_mut(&mut self, side: Side) -> &mut Vec<CardId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn slot_of(&self, side: Side, id: CardId) -> Option<usize> {
        self.slots(side).iter().position(|c| *c == id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.left.contains(&id) || self.right.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    /// Every (left, right) combination on the board the player could match
    /// right now.
    pub fn playable_pairs(&self, cards: &CardSet) -> Vec<(CardId, CardId)> {
        let mut pairs = Vec::new();
        for left in &self.left {
            for right in &self.right {
                if cards.is_playable(*left, *right) {
                    pairs.push((*left, *right));
                }
            }
        }
        pairs
    }

    /// The match-guarantee invariant: at least one playable pair is visible.
    pub fn has_playable_match(&self, cards: &CardSet) -> bool {
        self.left
            .iter()
            .any(|l| self.right.iter().any(|r| cards.is_playable(*l, *r)))
    }
}
