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

use serde::Serialize;

use crate::board::Board;
use crate::types::card::CardId;
use crate::types::card::CardSet;
use crate::types::card::Side;
use crate::types::pair::PairId;

/// Why an attempted match was not evaluated. None of these count against
/// the player.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchRejection {
    NotFound,
    NotActive,
    SameSide,
}

impl MatchRejection {
    pub fn code(self) -> &'static str {
        match self {
            MatchRejection::NotFound => "NOT_FOUND",
            MatchRejection::NotActive => "NOT_ACTIVE",
            MatchRejection::SameSide => "SAME_SIDE",
        }
    }
}

impl Display for MatchRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The verdict on a valid attempt, normalised so `left` is the left card.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MatchCheck {
    pub left: CardId,
    pub right: CardId,
    pub is_match: bool,
    /// The shared pair, when `is_match`.
    pub pair: Option<PairId>,
    /// The right card's description, when `is_match`.
    pub description: Option<String>,
}

/// Compare two board cards. Pure: reads card state, mutates nothing.
///
/// The cards may be given in either order.
pub fn check_match(
    board: &Board,
    cards: &CardSet,
    a: CardId,
    b: CardId,
) -> Result<MatchCheck, MatchRejection> {
    let (Some(first), Some(second)) = (cards.get(a), cards.get(b)) else {
        return Err(MatchRejection::NotFound);
    };
    if !board.contains(a) || !board.contains(b) {
        return Err(MatchRejection::NotFound);
    }
    if !first.is_active() || !second.is_active() {
        return Err(MatchRejection::NotActive);
    }
    if first.side() == second.side() {
        return Err(MatchRejection::SameSide);
    }
    let (left, right) = match first.side() {
        Side::Left => (first, second),
        Side::Right => (second, first),
    };
    // A right card already credited to this left card cannot be active, so
    // pair equality is the whole test.
    let is_match = left.pair() == right.pair();
    Ok(MatchCheck {
        left: left.id(),
        right: right.id(),
        is_match,
        pair: is_match.then(|| left.pair()),
        description: if is_match {
            right.description().map(str::to_string)
        } else {
            None
        },
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::board::initialize;
    use crate::config::BoardConfig;
    use crate::reservoir::Reservoir;
    use crate::types::card::Card;

    /// A 2x2 board: lefts (p0, p1), rights (p0 "zero", p2), plus one card
    /// left in the reservoir.
    fn setup() -> (Board, CardSet, [CardId; 5]) {
        let mut cards = CardSet::new();
        let l0 = cards.push(Card::left(cards.next_id(), PairId::new(0), "a", 1));
        let l1 = cards.push(Card::left(cards.next_id(), PairId::new(1), "b", 1));
        let r0 = cards.push(Card::right(
            cards.next_id(),
            PairId::new(0),
            "x",
            None,
            Some("zero".to_string()),
        ));
        let r2 = cards.push(Card::right(cards.next_id(), PairId::new(2), "y", None, None));
        let pooled = cards.push(Card::right(cards.next_id(), PairId::new(1), "z", None, None));
        let mut pool = Reservoir::from_ids(vec![l0, l1], vec![r0, r2, pooled]);
        let mut board = Board::new(2);
        let config = BoardConfig {
            capacity: 2,
            ..BoardConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        initialize(&mut board, &mut cards, &mut pool, &config, &mut rng);
        (board, cards, [l0, l1, r0, r2, pooled])
    }

    #[test]
    fn test_match_either_order() {
        let (board, cards, [l0, _, r0, _, _]) = setup();
        let expected = MatchCheck {
            left: l0,
            right: r0,
            is_match: true,
            pair: Some(PairId::new(0)),
            description: Some("zero".to_string()),
        };
        assert_eq!(check_match(&board, &cards, l0, r0), Ok(expected.clone()));
        assert_eq!(check_match(&board, &cards, r0, l0), Ok(expected));
    }

    #[test]
    fn test_mismatch() {
        let (board, cards, [l0, l1, r0, _, _]) = setup();
        // The constructive initializer pulled the partner of l1 onto the board,
        // so find the card that is not r0.
        let other = *board
            .slots(Side::Right)
            .iter()
            .find(|id| **id != r0)
            .unwrap();
        let check = check_match(&board, &cards, l0, other).unwrap();
        assert!(!check.is_match);
        assert_eq!(check.pair, None);
        assert_eq!(check.description, None);
        let check = check_match(&board, &cards, l1, r0).unwrap();
        assert!(!check.is_match);
    }

    #[test]
    fn test_same_side() {
        let (board, cards, [l0, l1, _, _, _]) = setup();
        assert_eq!(
            check_match(&board, &cards, l0, l1),
            Err(MatchRejection::SameSide)
        );
    }

    #[test]
    fn test_not_found() {
        let (board, cards, [l0, _, _, _, _]) = setup();
        assert_eq!(
            check_match(&board, &cards, l0, CardId::new(99)),
            Err(MatchRejection::NotFound)
        );
        // On the card set, but still in the reservoir.
        let pooled = cards
            .iter()
            .find(|c| !board.contains(c.id()))
            .map(|c| c.id())
            .unwrap();
        assert_eq!(
            check_match(&board, &cards, l0, pooled),
            Err(MatchRejection::NotFound)
        );
    }

    #[test]
    fn test_not_active() {
        let (board, mut cards, [l0, _, r0, _, _]) = setup();
        cards.get_mut(r0).unwrap().mark_matched();
        assert_eq!(
            check_match(&board, &cards, l0, r0),
            Err(MatchRejection::NotActive)
        );
    }

    #[test]
    fn test_repeatable() {
        let (board, cards, [l0, _, r0, _, _]) = setup();
        let first = check_match(&board, &cards, l0, r0);
        let second = check_match(&board, &cards, l0, r0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_codes() {
        assert_eq!(MatchRejection::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(MatchRejection::NotActive.code(), "NOT_ACTIVE");
        assert_eq!(
            serde_json::to_string(&MatchRejection::SameSide).unwrap(),
            "\"SAME_SIDE\""
        );
    }
}
