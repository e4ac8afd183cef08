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

use crate::board::Board;
use crate::config::BoardConfig;
use crate::config::InitStrategy;
use crate::reservoir::Reservoir;
use crate::types::card::CardSet;
use crate::types::card::Side;
use crate::types::pair::PairId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InitReport {
    /// Candidate boards examined. Always 1 for the constructive strategy.
    pub attempts: usize,
    /// Whether the initial board has a playable match.
    pub guaranteed: bool,
}

/// Fill an empty board from the reservoir so that at least one playable match
/// is visible before the first render.
pub fn initialize(
    board: &mut Board,
    cards: &mut CardSet,
    pool: &mut Reservoir,
    config: &BoardConfig,
    rng: &mut impl Rng,
) -> InitReport {
    debug_assert!(board.is_empty());
    let attempts = match config.strategy {
        InitStrategy::Constructive => {
            fill_constructive(board, cards, pool, rng);
            1
        }
        InitStrategy::Retry => fill_retry(board, cards, pool, config.retry_limit, rng),
    };
    for side in [Side::Left, Side::Right] {
        for id in board.slots(side) {
            if let Some(card) = cards.get_mut(*id) {
                card.activate();
            }
        }
    }
    let guaranteed = board.has_playable_match(cards);
    if !guaranteed {
        log::warn!(
            "Initial board has no playable match ({} left, {} right).",
            board.slots(Side::Left).len(),
            board.slots(Side::Right).len()
        );
    }
    InitReport {
        attempts,
        guaranteed,
    }
}

/// Take the first `capacity` left cards, pull one partner for each distinct
/// pair straight out of the right reservoir, pad, then shuffle the right
/// slice so the guaranteed partner is not in a fixed position.
fn fill_constructive(board: &mut Board, cards: &CardSet, pool: &mut Reservoir, rng: &mut impl Rng) {
    let capacity = board.capacity();
    while board.left.len() < capacity {
        match pool.draw(Side::Left) {
            Some(id) => board.left.push(id),
            None => break,
        }
    }

    let mut seen: HashSet<PairId> = HashSet::new();
    let wanted: Vec<PairId> = board
        .left
        .iter()
        .filter_map(|id| cards.pair_of(*id))
        .filter(|pair| seen.insert(*pair))
        .collect();
    for pair in wanted {
        if board.right.len() == capacity {
            break;
        }
        if let Some(id) = pool.take_where(Side::Right, |r| cards.pair_of(r) == Some(pair)) {
            board.right.push(id);
        }
    }

    while board.right.len() < capacity {
        match pool.draw(Side::Right) {
            Some(id) => board.right.push(id),
            None => break,
        }
    }
    board.right.shuffle(rng);
}

/// Reshuffle the right reservoir until its first slice shares a pair with
/// the first left slice, at most `limit` times. Returns the number of
/// candidates examined.
fn fill_retry(
    board: &mut Board,
    cards: &CardSet,
    pool: &mut Reservoir,
    limit: usize,
    rng: &mut impl Rng,
) -> usize {
    let capacity = board.capacity();
    let left_pairs: HashSet<PairId> = pool
        .peek(Side::Left, capacity)
        .filter_map(|id| cards.pair_of(id))
        .collect();
    let mut attempts = 0;
    let found = loop {
        attempts += 1;
        let found = pool
            .peek(Side::Right, capacity)
            .filter_map(|id| cards.pair_of(id))
            .any(|pair| left_pairs.contains(&pair));
        // The last candidate examined is the one that gets dealt.
        if found || attempts >= limit {
            break found;
        }
        pool.reshuffle_right(rng);
    };
    if !found {
        log::warn!("No shared pair after {attempts} shuffles, accepting the board anyway.");
    }
    for side in [Side::Left, Side::Right] {
        while board.slots(side).len() < capacity {
            match pool.draw(side) {
                Some(id) => board.slots_mut(side).push(id),
                None => break,
            }
        }
    }
    attempts
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::catalog::Catalog;
    use crate::config::MatchMode;
    use crate::error::Fallible;
    use crate::helper::tiered_catalog_json;
    use crate::reservoir::build_reservoir;
    use crate::selector::Distribution;
    use crate::selector::select_pairs;
    use crate::types::card::Card;
    use crate::types::card::CardId;
    use crate::types::card::CardState;

    /// Twelve one-to-one pairs. The left reservoir starts with pairs 0..6 and
    /// the right reservoir with pairs 6..12, so the naive first slices share
    /// nothing.
    fn disjoint_fixture() -> (CardSet, Reservoir) {
        let mut cards = CardSet::new();
        let mut left = Vec::new();
        let mut right = Vec::new();
        for i in 0..12 {
            left.push(cards.push(Card::left(cards.next_id(), PairId::new(i), format!("l{i}"), 1)));
        }
        for i in (6..12).chain(0..6) {
            right.push(cards.push(Card::right(
                cards.next_id(),
                PairId::new(i),
                format!("r{i}"),
                None,
                None,
            )));
        }
        (cards, Reservoir::from_ids(left, right))
    }

    fn overlaps_naively(cards: &CardSet, pool: &Reservoir, capacity: usize) -> bool {
        let left: HashSet<PairId> = pool
            .peek(Side::Left, capacity)
            .filter_map(|id| cards.pair_of(id))
            .collect();
        pool.peek(Side::Right, capacity)
            .filter_map(|id| cards.pair_of(id))
            .any(|p| left.contains(&p))
    }

    #[test]
    fn test_constructive_repairs_disjoint_slices() {
        let (mut cards, mut pool) = disjoint_fixture();
        assert!(!overlaps_naively(&cards, &pool, 6));
        let mut board = Board::new(6);
        let mut rng = StdRng::seed_from_u64(42);
        let config = BoardConfig::default();
        let report = initialize(&mut board, &mut cards, &mut pool, &config, &mut rng);
        assert!(report.guaranteed);
        assert_eq!(report.attempts, 1);
        assert_eq!(board.slots(Side::Left).len(), 6);
        assert_eq!(board.slots(Side::Right).len(), 6);
        assert!(board.has_playable_match(&cards));
        // Every left card got its partner.
        assert_eq!(board.playable_pairs(&cards).len(), 6);
        assert_eq!(pool.len(Side::Left), 6);
        assert_eq!(pool.len(Side::Right), 6);
        for side in [Side::Left, Side::Right] {
            for id in board.slots(side) {
                assert_eq!(cards.get(*id).unwrap().state(), CardState::Active);
            }
        }
    }

    #[test]
    fn test_retry_repairs_disjoint_slices() {
        let (mut cards, mut pool) = disjoint_fixture();
        let mut board = Board::new(6);
        let config = BoardConfig {
            strategy: InitStrategy::Retry,
            ..BoardConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let report = initialize(&mut board, &mut cards, &mut pool, &config, &mut rng);
        assert!(report.guaranteed);
        assert!(report.attempts > 1);
        assert!(report.attempts <= config.retry_limit);
        // The left order is never reshuffled.
        let lefts: Vec<CardId> = board.slots(Side::Left).to_vec();
        assert_eq!(lefts, (0..6).map(CardId::new).collect::<Vec<_>>());
    }

    #[test]
    fn test_retry_exhaustion_is_not_fatal() {
        // The right reservoir holds no partner for any left card.
        let mut cards = CardSet::new();
        let mut left = Vec::new();
        let mut right = Vec::new();
        for i in 0..3 {
            left.push(cards.push(Card::left(cards.next_id(), PairId::new(i), "l", 1)));
        }
        for i in 3..6 {
            right.push(cards.push(Card::right(cards.next_id(), PairId::new(i), "r", None, None)));
        }
        let mut pool = Reservoir::from_ids(left, right);
        let mut board = Board::new(3);
        let config = BoardConfig {
            strategy: InitStrategy::Retry,
            retry_limit: 10,
            ..BoardConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let report = initialize(&mut board, &mut cards, &mut pool, &config, &mut rng);
        assert_eq!(report.attempts, 10);
        assert!(!report.guaranteed);
        assert_eq!(board.slots(Side::Left).len(), 3);
        assert_eq!(board.slots(Side::Right).len(), 3);
    }

    #[test]
    fn test_retry_exhaustion_deals_last_candidate() {
        let (mut cards, mut pool) = disjoint_fixture();
        let examined: Vec<CardId> = pool.peek(Side::Right, 6).collect();
        let mut board = Board::new(6);
        let config = BoardConfig {
            strategy: InitStrategy::Retry,
            retry_limit: 1,
            ..BoardConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let report = initialize(&mut board, &mut cards, &mut pool, &config, &mut rng);
        assert_eq!(report.attempts, 1);
        assert!(!report.guaranteed);
        assert_eq!(board.slots(Side::Right), examined.as_slice());
    }

    /// Select and queue every pair of `catalog` the way a session load does,
    /// stopping before the board is filled.
    fn seeded_deal(catalog: &Catalog, seed: u64) -> (CardSet, Reservoir, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let report = select_pairs(catalog, Distribution::new(12, 0, 0), &mut rng);
        let (cards, pool) =
            build_reservoir(catalog, &report.selections, MatchMode::OneToOne, &mut rng);
        (cards, pool, rng)
    }

    #[test]
    fn test_seeded_disjoint_deal_is_repaired() -> Fallible<()> {
        let catalog = Catalog::from_json(&tiered_catalog_json(12, 0, 0))?;
        let seed = (0..1000)
            .find(|seed| {
                let (cards, pool, _) = seeded_deal(&catalog, *seed);
                !overlaps_naively(&cards, &pool, 3)
            })
            .unwrap();
        for strategy in [InitStrategy::Constructive, InitStrategy::Retry] {
            let (mut cards, mut pool, mut rng) = seeded_deal(&catalog, seed);
            assert!(!overlaps_naively(&cards, &pool, 3));
            let mut board = Board::new(3);
            let config = BoardConfig {
                capacity: 3,
                strategy,
                ..BoardConfig::default()
            };
            let report = initialize(&mut board, &mut cards, &mut pool, &config, &mut rng);
            assert!(report.guaranteed);
            assert!(board.has_playable_match(&cards));
            assert_eq!(board.slots(Side::Left).len(), 3);
            assert_eq!(board.slots(Side::Right).len(), 3);
        }
        Ok(())
    }

    #[test]
    fn test_small_reservoir() {
        let (mut cards, _) = disjoint_fixture();
        let mut pool = Reservoir::from_ids(
            vec![CardId::new(0), CardId::new(1)],
            vec![CardId::new(18), CardId::new(19)],
        );
        let mut board = Board::new(6);
        let mut rng = StdRng::seed_from_u64(0);
        let config = BoardConfig::default();
        let report = initialize(&mut board, &mut cards, &mut pool, &config, &mut rng);
        assert!(report.guaranteed);
        assert_eq!(board.slots(Side::Left).len(), 2);
        assert_eq!(board.slots(Side::Right).len(), 2);
        assert!(pool.is_empty());
    }
}
