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

use crate::board::Board;
use crate::board::BoardChange;
use crate::reservoir::Reservoir;
use crate::types::card::CardId;
use crate::types::card::CardSet;
use crate::types::card::Side;
use crate::types::pair::PairId;

/// The slots freed by a correct match.
#[derive(Clone, Copy, Debug)]
pub struct Vacated {
    /// Only set when the left card completed its pair.
    pub left: Option<CardId>,
    pub right: CardId,
}

#[derive(Debug)]
pub struct RefillReport {
    pub changes: Vec<BoardChange>,
    /// False when the board ended without a playable match while the
    /// reservoir still held cards.
    pub invariant_held: bool,
}

/// Refill the vacated slots from the reservoir, left side first.
///
/// The left slot takes the next left card as-is. The right slot is where the
/// match guarantee is restored: if the board has no playable match after the
/// left side is settled, the right reservoir is searched for a partner of the
/// card just placed, then of any active left card.
pub fn refill(
    board: &mut Board,
    cards: &mut CardSet,
    pool: &mut Reservoir,
    vacated: Vacated,
) -> RefillReport {
    let mut changes = Vec::new();
    let mut inserted_left = None;

    if let Some(old) = vacated.left {
        match board.slot_of(Side::Left, old) {
            Some(slot) => {
                let change = fill_slot(board, cards, Side::Left, slot, old, pool.draw(Side::Left));
                if let BoardChange::Replace { new, .. } = change {
                    inserted_left = Some(new);
                }
                changes.push(change);
            }
            None => log::warn!("Vacated left card {old} is not on the board."),
        }
    }

    match board.slot_of(Side::Right, vacated.right) {
        Some(slot) => {
            let replacement = if board.has_playable_match(cards) {
                pool.draw(Side::Right)
            } else {
                take_partner(board, cards, pool, inserted_left).or_else(|| pool.draw(Side::Right))
            };
            changes.push(fill_slot(
                board,
                cards,
                Side::Right,
                slot,
                vacated.right,
                replacement,
            ));
        }
        None => log::warn!("Vacated right card {} is not on the board.", vacated.right),
    }

    let invariant_held = board.has_playable_match(cards) || pool.is_empty();
    if !invariant_held {
        log::warn!(
            "Board has no playable match with {} left and {} right cards in reserve.",
            pool.len(Side::Left),
            pool.len(Side::Right)
        );
    }
    RefillReport {
        changes,
        invariant_held,
    }
}

/// Put `replacement` into `slot`, or drop the slot when there is none.
fn fill_slot(
    board: &mut Board,
    cards: &mut CardSet,
    side: Side,
    slot: usize,
    old: CardId,
    replacement: Option<CardId>,
) -> BoardChange {
    match replacement {
        Some(new) => {
            board.slots_mut(side)[slot] = new;
            if let Some(card) = cards.get_mut(new) {
                card.activate();
            }
            BoardChange::Replace {
                side,
                slot,
                old,
                new,
            }
        }
        None => {
            board.slots_mut(side).remove(slot);
            BoardChange::Remove { side, slot, old }
        }
    }
}

/// Remove from the right reservoir a card that pairs with a left card on the
/// board, preferring `preferred`.
fn take_partner(
    board: &Board,
    cards: &CardSet,
    pool: &mut Reservoir,
    preferred: Option<CardId>,
) -> Option<CardId> {
    let targets: Vec<PairId> = preferred
        .into_iter()
        .chain(board.slots(Side::Left).iter().copied())
        .filter(|id| cards.get(*id).is_some_and(|c| c.is_active()))
        .filter_map(|id| cards.pair_of(id))
        .collect();
    for pair in targets {
        if let Some(id) = pool.take_where(Side::Right, |r| cards.pair_of(r) == Some(pair)) {
            log::debug!("Refill pulled card {id} to keep a match on the board.");
            return Some(id);
        }
    }
    None
}
