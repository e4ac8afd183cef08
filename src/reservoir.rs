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

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::Catalog;
use crate::config::MatchMode;
use crate::selector::Selection;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::card::CardSet;
use crate::types::card::Side;

/// The off-board backlog: one queue per side, drawn from the front.
#[derive(Default, Debug)]
pub struct Reservoir {
    left: VecDeque<CardId>,
    right: VecDeque<CardId>,
}

impl Reservoir {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_ids(left: Vec<CardId>, right: Vec<CardId>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn len(&self, side: Side) -> usize {
        self.queue(side).len()
    }

    /// Both sides are exhausted.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// The next `n` cards of a side, without drawing them.
    pub fn peek(&self, side: Side, n: usize) -> impl Iterator<Item = CardId> + '_ {
        self.queue(side).iter().take(n).copied()
    }

    pub fn draw(&mut self, side: Side) -> Option<CardId> {
        self.queue_mut(side).pop_front()
    }

    /// Remove and return the first card of `side` accepted by `pred`.
    pub fn take_where(
        &mut self,
        side: Side,
        mut pred: impl FnMut(CardId) -> bool,
    ) -> Option<CardId> {
        let queue = self.queue_mut(side);
        let position = queue.iter().position(|id| pred(*id))?;
        queue.remove(position)
    }

    /// Reshuffle the right side only; the left order is left untouched.
    pub fn reshuffle_right(&mut self, rng: &mut impl Rng) {
        self.right.make_contiguous().shuffle(rng);
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    fn queue(&self, side: Side) -> &VecDeque<CardId> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn queue_mut(&mut self, side: Side) -> &mut VecDeque<CardId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Create every card of a session from the selector's output and queue them,
/// each side shuffled independently.
///
/// In one-to-many mode a multi-right pair contributes one right card per
/// variant, not just the selected one.
pub fn build_reservoir(
    catalog: &Catalog,
    selections: &[Selection],
    mode: MatchMode,
    rng: &mut impl Rng,
) -> (CardSet, Reservoir) {
    let mut cards = CardSet::new();
    let mut left: Vec<CardId> = Vec::with_capacity(selections.len());
    let mut right: Vec<CardId> = Vec::with_capacity(selections.len());
    for selection in selections {
        let Some(pair) = catalog.pair(selection.pair) else {
            log::warn!("Selection refers to unknown pair {:?}.", selection.pair);
            continue;
        };
        let required = pair.required_completions(mode);
        let id = cards.push(Card::left(
            cards.next_id(),
            selection.pair,
            pair.left(),
            required,
        ));
        left.push(id);

        let variants: Vec<usize> = match mode {
            MatchMode::OneToOne => vec![selection.variant],
            MatchMode::OneToMany if required > 1 => (0..pair.variant_count()).collect(),
            MatchMode::OneToMany => vec![selection.variant],
        };
        for index in variants {
            let Some(variant) = pair.variant(index) else {
                continue;
            };
            let id = cards.push(Card::right(
                cards.next_id(),
                selection.pair,
                variant.text,
                variant.tier,
                variant.description.map(str::to_string),
            ));
            right.push(id);
        }
    }
    left.shuffle(rng);
    right.shuffle(rng);
    log::debug!(
        "Reservoir built: {} left cards, {} right cards.",
        left.len(),
        right.len()
    );
    let reservoir = Reservoir {
        left: left.into(),
        right: right.into(),
    };
    (cards, reservoir)
}
