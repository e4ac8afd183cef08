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

use std::io::Write;
use std::sync::Arc;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::config::TimingConfig;
use crate::driver::Driver;
use crate::error::Fallible;
use crate::error::fail;
use crate::events::EventLog;
use crate::events::Summary;
use crate::phase::Phase;
use crate::session::Session;
use crate::types::card::CardId;
use crate::types::card::Side;

/// Upper bound on attempts in one simulated session.
const MAX_TURNS: usize = 100_000;

pub struct Simulation {
    pub level: u8,
    pub seed: u64,
    /// Probability, per turn, of deliberately picking a wrong pair.
    pub mistakes: f64,
}

/// Play a whole session with an automatic player, writing every event as a
/// JSON line to `out`, followed by the summary.
///
/// Fails if the board is ever left without a playable match while the
/// reservoir still holds cards.
pub async fn run_simulation(
    catalog: Arc<Catalog>,
    config: Config,
    sim: &Simulation,
    out: &mut dyn Write,
) -> Fallible<Summary> {
    if !(0.0..=1.0).contains(&sim.mistakes) {
        return fail(format!("mistake rate {} is not in [0, 1].", sim.mistakes));
    }
    let timing = TimingConfig {
        correct_delay_ms: 0,
        incorrect_delay_ms: 0,
        ..config.timing.clone()
    };
    let log = EventLog::new();
    let session = Session::new(config, Some(sim.seed), Box::new(log.clone()));
    let driver = Driver::new(session, timing);
    driver.load(catalog, sim.level)?;
    driver.start()?;
    flush(&log, out)?;

    let mut rng = StdRng::seed_from_u64(sim.seed.wrapping_add(1));
    let mut turns = 0;
    loop {
        let (a, b) = {
            let session = driver.session();
            if session.phase() != Phase::Playing {
                break;
            }
            if !session.invariant_holds() {
                return fail(format!(
                    "turn {turns}: no playable match on the board while cards remain."
                ));
            }
            let playable = session.playable_pairs();
            if playable.is_empty() {
                return fail(format!("turn {turns}: the board has no playable match."));
            }
            let wrong = if rng.random_bool(sim.mistakes) {
                pick_wrong(&session)
            } else {
                None
            };
            wrong.unwrap_or_else(|| playable[rng.random_range(0..playable.len())])
        };
        driver.attempt_match(a, b).await;
        flush(&log, out)?;
        turns += 1;
        if turns >= MAX_TURNS {
            return fail(format!("session did not finish in {MAX_TURNS} turns."));
        }
    }

    let session = driver.session();
    let Some(summary) = session.summary().cloned() else {
        return fail(format!("session stopped in {}.", session.phase()));
    };
    log::debug!("Simulation finished after {turns} turns.");
    writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    Ok(summary)
}

fn pick_wrong(session: &Session) -> Option<(CardId, CardId)> {
    let board = session.board();
    let cards = session.cards();
    board.slots(Side::Left).iter().find_map(|l| {
        board
            .slots(Side::Right)
            .iter()
            .find(|r| cards.pair_of(*l) != cards.pair_of(**r))
            .map(|r| (*l, *r))
    })
}

fn flush(log: &EventLog, out: &mut dyn Write) -> Fallible<()> {
    for event in log.drain() {
        writeln!(out, "{}", serde_json::to_string(&event)?)?;
    }
    Ok(())
}
