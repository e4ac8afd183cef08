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
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::board::Board;
use crate::board::BoardChange;
use crate::board::Vacated;
use crate::board::initialize;
use crate::board::refill;
use crate::catalog::Catalog;
use crate::checker::MatchRejection;
use crate::checker::check_match;
use crate::config::Config;
use crate::error::Fallible;
use crate::error::fail;
use crate::events::CardView;
use crate::events::Event;
use crate::events::EventSink;
use crate::events::Summary;
use crate::phase::Phase;
use crate::reservoir::Reservoir;
use crate::reservoir::build_reservoir;
use crate::scoring::Stats;
use crate::selector::select_pairs;
use crate::types::card::CardId;
use crate::types::card::CardSet;
use crate::types::card::Side;
use crate::types::timestamp::Timestamp;

/// Identifies one accepted match attempt. Tickets increase monotonically for
/// the lifetime of a session object, across resets, so a completion issued
/// before a reset can never be mistaken for a later one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Ticket(u64);

impl Display for Ticket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// A pair was completed.
    Correct,
    /// One variant of a one-to-many pair was found; the left card stays.
    Partial,
    Incorrect,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        self != Outcome::Incorrect
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Attempt {
    /// The session was not accepting input. Not an error.
    Ignored,
    Rejected(MatchRejection),
    /// Outcome applied. The board is mutated when `ticket` completes.
    Accepted { ticket: Ticket, outcome: Outcome },
}

/// An accepted attempt whose board mutation has not run yet.
#[derive(Debug)]
struct Pending {
    ticket: Ticket,
    vacated: Option<Vacated>,
}

/// One play-through: owns the board, both reservoirs, and the statistics.
/// Nothing outside the session mutates them.
pub struct Session {
    config: Config,
    rng: StdRng,
    sink: Box<dyn EventSink>,
    phase: Phase,
    catalog: Option<Arc<Catalog>>,
    cards: CardSet,
    pool: Reservoir,
    board: Board,
    stats: Stats,
    pending: Option<Pending>,
    last_ticket: u64,
    started_at: Option<Timestamp>,
    summary: Option<Summary>,
}

impl Session {
    /// A fresh session in IDLE. Without a seed, one is drawn at random and
    /// logged so the session can be replayed.
    pub fn new(config: Config, seed: Option<u64>, sink: Box<dyn EventSink>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        log::debug!("Session seed: {seed}.");
        let capacity = config.board.capacity;
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            sink,
            phase: Phase::Idle,
            catalog: None,
            cards: CardSet::new(),
            pool: Reservoir::new(),
            board: Board::new(capacity),
            stats: Stats::default(),
            pending: None,
            last_ticket: 0,
            started_at: None,
            summary: None,
        }
    }

    /// Select pairs for `level`, build the reservoirs and the initial board.
    /// On success the session is READY and `BoardReady` has been emitted.
    pub fn load(&mut self, catalog: Arc<Catalog>, level: u8) -> Fallible<()> {
        if let Err(e) = self.phase.transition(Phase::Loading) {
            return fail(e.to_string());
        }
        self.enter(Phase::Loading);
        let wanted = self.config.distribution(level);
        let report = select_pairs(&catalog, wanted, &mut self.rng);
        if report.is_empty() {
            let message = format!("level {level} selects no pairs from this catalog.");
            self.enter_error(&message);
            return fail(message);
        }
        let (cards, pool) = build_reservoir(
            &catalog,
            &report.selections,
            self.config.board.mode,
            &mut self.rng,
        );
        self.cards = cards;
        self.pool = pool;
        self.board = Board::new(self.config.board.capacity);
        let init = initialize(
            &mut self.board,
            &mut self.cards,
            &mut self.pool,
            &self.config.board,
            &mut self.rng,
        );
        log::debug!(
            "Loaded {} pairs from '{}' at level {level} ({} attempts).",
            report.len(),
            catalog.title(),
            init.attempts
        );
        self.stats = Stats::new(report.len());
        let (left, right) = self.board_view();
        self.sink.emit(Event::BoardReady {
            title: catalog.title().to_string(),
            left_label: catalog.left_label().to_string(),
            right_label: catalog.right_label().to_string(),
            left,
            right,
            total_pairs: self.stats.total_pairs,
        });
        self.catalog = Some(catalog);
        self.enter(Phase::Ready);
        Ok(())
    }

    /// READY to PLAYING. Starts the clock.
    pub fn start(&mut self) -> Fallible<()> {
        if let Err(e) = self.phase.transition(Phase::Playing) {
            return fail(e.to_string());
        }
        self.started_at = Some(Timestamp::now());
        self.enter(Phase::Playing);
        Ok(())
    }

    /// Evaluate the player's attempt to link `a` and `b`.
    ///
    /// Statistics and card states are updated immediately; the board is left
    /// alone until [`Session::complete`] is called with the returned ticket.
    /// While that is outstanding every further attempt is ignored.
    pub fn attempt_match(&mut self, a: CardId, b: CardId) -> Attempt {
        if !self.phase.accepts_input() {
            log::debug!("Ignoring attempt ({a}, {b}) in {}.", self.phase);
            return Attempt::Ignored;
        }
        let check = match check_match(&self.board, &self.cards, a, b) {
            Ok(check) => check,
            Err(rejection) => {
                log::debug!("Rejected attempt ({a}, {b}): {rejection}.");
                return Attempt::Rejected(rejection);
            }
        };
        self.enter(Phase::Checking);
        self.last_ticket += 1;
        let ticket = Ticket(self.last_ticket);
        let rules = &self.config.scoring;
        let (left, right) = (check.left, check.right);

        let (outcome, vacated) = if check.is_match {
            let complete = match self.cards.get_mut(left) {
                Some(card) => card.record_match(right),
                None => true,
            };
            if let Some(card) = self.cards.get_mut(right) {
                card.mark_matched();
            }
            if complete {
                if let Some(card) = self.cards.get_mut(left) {
                    card.mark_matched();
                }
                let points = self.stats.record_correct(rules);
                self.sink.emit(Event::Match {
                    left,
                    right,
                    description: check.description,
                    points,
                    score: self.stats.score,
                    combo: self.stats.combo,
                });
                let vacated = Vacated {
                    left: Some(left),
                    right,
                };
                (Outcome::Correct, Some(vacated))
            } else {
                let points = self.stats.record_partial(rules);
                let (found, required) = self
                    .cards
                    .get(left)
                    .and_then(|c| c.progress())
                    .map(|p| (p.found(), p.required()))
                    .unwrap_or((0, 0));
                self.sink.emit(Event::PartialMatch {
                    left,
                    right,
                    description: check.description,
                    found,
                    required,
                    points,
                    score: self.stats.score,
                });
                let vacated = Vacated { left: None, right };
                (Outcome::Partial, Some(vacated))
            }
        } else {
            let deducted = self.stats.record_incorrect(rules);
            self.sink.emit(Event::Mismatch {
                left,
                right,
                deducted,
                score: self.stats.score,
            });
            (Outcome::Incorrect, None)
        };
        log::debug!("Attempt {ticket} ({left}, {right}): {outcome:?}.");
        self.pending = Some(Pending { ticket, vacated });
        Attempt::Accepted { ticket, outcome }
    }

    /// Apply the board mutation for `ticket` and reopen the gate. Returns
    /// false, and does nothing, if the ticket is not the pending one.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => {}
            _ => {
                log::debug!("Ignoring stale completion {ticket}.");
                return false;
            }
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if let Some(vacated) = pending.vacated {
            let report = refill(&mut self.board, &mut self.cards, &mut self.pool, vacated);
            for change in report.changes {
                let event = match change {
                    BoardChange::Replace {
                        side,
                        slot,
                        old,
                        new,
                    } => match self.cards.get(new) {
                        Some(card) => Event::Replace {
                            side,
                            slot,
                            old,
                            card: CardView::of(card),
                        },
                        None => continue,
                    },
                    BoardChange::Remove { side, slot, old } => Event::Remove {
                        side,
                        slot,
                        card: old,
                    },
                };
                self.sink.emit(event);
            }
        }
        if self.stats.is_complete() {
            self.finish();
        } else {
            self.enter(Phase::Playing);
        }
        true
    }

    /// Watchdog path: force the pending cycle through when the normal
    /// completion never arrived.
    pub fn recover(&mut self, ticket: Ticket) -> bool {
        let stuck = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket);
        if !stuck {
            return false;
        }
        log::warn!("Attempt {ticket} did not complete in time, forcing completion.");
        self.complete(ticket)
    }

    /// Drop everything and return to IDLE. Any outstanding ticket becomes
    /// stale.
    pub fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            log::debug!("Reset discards pending attempt {}.", pending.ticket);
        }
        self.pool.clear();
        self.board.clear();
        self.cards.clear();
        self.stats = Stats::default();
        self.catalog = None;
        self.started_at = None;
        self.summary = None;
        log::debug!("Session reset from {}.", self.phase);
        self.phase = Phase::Idle;
    }

    fn finish(&mut self) {
        self.enter(Phase::Finished);
        let ended_at = Timestamp::now();
        let started_at = self.started_at.unwrap_or(ended_at);
        let Some(catalog) = &self.catalog else {
            log::error!("Finished a session with no catalog.");
            return;
        };
        let summary = Summary::new(&self.stats, started_at, ended_at, catalog.hash());
        log::debug!(
            "Session finished: score {}, accuracy {:.1}%.",
            summary.score,
            summary.accuracy
        );
        self.sink.emit(Event::Finished {
            summary: summary.clone(),
        });
        self.summary = Some(summary);
    }

    /// Move along an edge of the transition table. An illegal edge is a bug
    /// in the caller and sends the session to ERROR.
    fn enter(&mut self, to: Phase) {
        match self.phase.transition(to) {
            Ok(phase) => {
                log::debug!("{} -> {}", self.phase, phase);
                self.phase = phase;
            }
            Err(e) => self.enter_error(&e.to_string()),
        }
    }

    fn enter_error(&mut self, message: &str) {
        log::error!("Session error in {}: {message}", self.phase);
        self.pending = None;
        if self.phase.can_transition(Phase::Error) {
            self.phase = Phase::Error;
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cards(&self) -> &CardSet {
        &self.cards
    }

    /// The ticket awaiting completion, if any.
    pub fn pending(&self) -> Option<Ticket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    pub fn board_view(&self) -> (Vec<CardView>, Vec<CardView>) {
        let view = |side: Side| -> Vec<CardView> {
            self.board
                .slots(side)
                .iter()
                .filter_map(|id| self.cards.get(*id))
                .map(CardView::of)
                .collect()
        };
        (view(Side::Left), view(Side::Right))
    }

    pub fn playable_pairs(&self) -> Vec<(CardId, CardId)> {
        self.board.playable_pairs(&self.cards)
    }

    pub fn has_playable_match(&self) -> bool {
        self.board.has_playable_match(&self.cards)
    }

    pub fn reservoir_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// The match guarantee as it must hold whenever the session is PLAYING.
    pub fn invariant_holds(&self) -> bool {
        self.has_playable_match() || self.pool.is_empty()
    }
}
