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
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ErrorReport;
use crate::types::pair::PairId;
use crate::types::pair::Tier;

/// Session-unique card identity. Cards are numbered in creation order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
#[serde(transparent)]
pub struct CardId(usize);

impl CardId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CardId {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .map(CardId)
            .map_err(|_| ErrorReport::new(format!("invalid card id: {s}")))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardState {
    /// Waiting in the reservoir.
    Pool,
    /// Visible on the board.
    Active,
    /// Consumed by a correct match. Never returns to the pool.
    Matched,
}

/// Completion tracking for a left card whose pair needs several right
/// matches.
#[derive(Clone, Debug)]
pub struct Progress {
    required: usize,
    matched: HashSet<CardId>,
}

impl Progress {
    pub fn new(required: usize) -> Self {
        Self {
            required: required.max(1),
            matched: HashSet::new(),
        }
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn found(&self) -> usize {
        self.matched.len()
    }

    pub fn is_complete(&self) -> bool {
        self.found() >= self.required
    }

    pub fn has_matched(&self, right: CardId) -> bool {
        self.matched.contains(&right)
    }
}

#[derive(Clone, Debug)]
pub struct Card {
    id: CardId,
    pair: PairId,
    side: Side,
    text: String,
    /// Shown when the card is matched. Right cards only.
    description: Option<String>,
    /// Right cards only, and only when the source variant is rated.
    tier: Option<Tier>,
    state: CardState,
    /// Left cards only.
    progress: Option<Progress>,
}

impl Card {
    pub fn left(id: CardId, pair: PairId, text: impl Into<String>, required: usize) -> Self {
        Self {
            id,
            pair,
            side: Side::Left,
            text: text.into(),
            description: None,
            tier: None,
            state: CardState::Pool,
            progress: Some(Progress::new(required)),
        }
    }

    pub fn right(
        id: CardId,
        pair: PairId,
        text: impl Into<String>,
        tier: Option<Tier>,
        description: Option<String>,
    ) -> Self {
        Self {
            id,
            pair,
            side: Side::Right,
            text: text.into(),
            description,
            tier,
            state: CardState::Pool,
            progress: None,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn pair(&self) -> PairId {
        self.pair
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tier(&self) -> Option<Tier> {
        self.tier
    }

    pub fn state(&self) -> CardState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == CardState::Active
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    /// Move the card from the reservoir onto the board.
    pub fn activate(&mut self) {
        if self.state != CardState::Pool {
            log::warn!("Card {} activated from state {:?}.", self.id, self.state);
            return;
        }
        self.state = CardState::Active;
    }

    pub fn mark_matched(&mut self) {
        self.state = CardState::Matched;
    }

    /// Record that `right` was matched against this left card. Returns true
    /// once every required match has been found.
    pub fn record_match(&mut self, right: CardId) -> bool {
        match &mut self.progress {
            Some(progress) => {
                progress.matched.insert(right);
                progress.is_complete()
            }
            None => true,
        }
    }
}

/// Every card of a session, indexed by [`CardId`].
#[derive(Default)]
pub struct CardSet {
    cards: Vec<Card>,
}

impl CardSet {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    /// Allocate the next id.
    pub fn next_id(&self) -> CardId {
        CardId(self.cards.len())
    }

    pub fn push(&mut self, card: Card) -> CardId {
        let id = card.id();
        debug_assert_eq!(id, self.next_id());
        self.cards.push(card);
        id
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.0)
    }

    pub fn get_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn pair_of(&self, id: CardId) -> Option<PairId> {
        self.get(id).map(|c| c.pair())
    }

    /// True when `left` and `right` are both on the board, share a pair, and
    /// the relationship has not already been consumed.
    pub fn is_playable(&self, left: CardId, right: CardId) -> bool {
        let (Some(l), Some(r)) = (self.get(left), self.get(right)) else {
            return false;
        };
        l.side() == Side::Left
            && r.side() == Side::Right
            && l.is_active()
            && r.is_active()
            && l.pair() == r.pair()
            && !l.progress().is_some_and(|p| p.has_matched(right))
    }
}
