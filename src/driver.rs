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

use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::catalog::Catalog;
use crate::config::TimingConfig;
use crate::error::Fallible;
use crate::session::Attempt;
use crate::session::Session;
use crate::session::Ticket;
use crate::types::card::CardId;

/// Runs a session in real time: outcome first, then the presentation delay,
/// then the board mutation.
#[derive(Clone)]
pub struct Driver {
    session: Arc<Mutex<Session>>,
    timing: TimingConfig,
}

impl Driver {
    pub fn new(session: Session, timing: TimingConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            timing,
        }
    }

    /// Lock the session. Never hold the guard across an `.await`.
    pub fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap()
    }

    pub fn load(&self, catalog: Arc<Catalog>, level: u8) -> Fallible<()> {
        self.session().load(catalog, level)
    }

    pub fn start(&self) -> Fallible<()> {
        self.session().start()
    }

    /// Submit an attempt. The gate is closed before the first suspension
    /// point, so any attempt made while this one is in flight is ignored.
    ///
    /// If this future is dropped during the delay, the watchdog completes the
    /// cycle once `watchdog_ms` has passed.
    pub async fn attempt_match(&self, a: CardId, b: CardId) -> Attempt {
        let attempt = self.session().attempt_match(a, b);
        let Attempt::Accepted { ticket, outcome } = attempt else {
            return attempt;
        };
        let watchdog = self.spawn_watchdog(ticket);
        let delay = if outcome.is_correct() {
            self.timing.correct_delay()
        } else {
            self.timing.incorrect_delay()
        };
        if !delay.is_zero() {
            sleep(delay).await;
        }
        self.session().complete(ticket);
        watchdog.abort();
        attempt
    }

    /// Reset synchronously. Cycles still in flight complete against a stale
    /// ticket and are discarded.
    pub fn reset(&self) {
        self.session().reset();
    }

    fn spawn_watchdog(&self, ticket: Ticket) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let limit = self.timing.watchdog();
        tokio::spawn(async move {
            sleep(limit).await;
            session.lock().unwrap().recover(ticket);
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;
    use tokio::time::timeout;

    use super::*;
    use crate::config::Config;
    use crate::events::Event;
    use crate::events::EventLog;
    use crate::helper::simple_catalog;
    use crate::phase::Phase;
    use crate::session::Outcome;
    use crate::types::card::Side;

    fn driver(seed: u64) -> Fallible<(Driver, EventLog)> {
        let log = EventLog::new();
        let config = Config::default();
        let timing = config.timing.clone();
        let session = Session::new(config, Some(seed), Box::new(log.clone()));
        let driver = Driver::new(session, timing);
        driver.load(Arc::new(simple_catalog(20)), 2)?;
        driver.start()?;
        Ok((driver, log))
    }

    fn first_playable(driver: &Driver) -> (CardId, CardId) {
        driver.session().playable_pairs()[0]
    }

    #[tokio::test(start_paused = true)]
    async fn test_board_mutates_after_delay() -> Fallible<()> {
        let (driver, log) = driver(1)?;
        log.drain();
        let (l, r) = first_playable(&driver);
        let started = Instant::now();
        let attempt = driver.attempt_match(l, r).await;
        assert!(matches!(
            attempt,
            Attempt::Accepted {
                outcome: Outcome::Correct,
                ..
            }
        ));
        assert_eq!(started.elapsed(), Duration::from_millis(600));
        let events = log.drain();
        assert!(matches!(events[0], Event::Match { .. }));
        assert!(matches!(events[1], Event::Replace { side: Side::Left, .. }));
        let session = driver.session();
        assert_eq!(session.phase(), Phase::Playing);
        assert!(!session.board().contains(l));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_during_delay_is_dropped() -> Fallible<()> {
        let (driver, _) = driver(2)?;
        let (l, r) = first_playable(&driver);
        let first = {
            let driver = driver.clone();
            tokio::spawn(async move { driver.attempt_match(l, r).await })
        };
        sleep(Duration::from_millis(100)).await;
        assert_eq!(driver.session().phase(), Phase::Checking);
        let board = driver.session().board().slots(Side::Left).to_vec();
        assert_eq!(driver.attempt_match(board[0], board[1]).await, Attempt::Ignored);
        let stats = *driver.session().stats();
        assert_eq!(stats.correct, 1);
        assert_eq!(stats.incorrect, 0);
        first.await?;
        assert_eq!(driver.session().phase(), Phase::Playing);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_recovers_dropped_cycle() -> Fallible<()> {
        let (driver, _) = driver(3)?;
        let (l, r) = first_playable(&driver);
        let result = timeout(Duration::from_millis(100), driver.attempt_match(l, r)).await;
        assert!(result.is_err());
        assert_eq!(driver.session().phase(), Phase::Checking);
        sleep(Duration::from_millis(4000)).await;
        assert_eq!(driver.session().phase(), Phase::Checking);
        sleep(Duration::from_millis(1000)).await;
        let session = driver.session();
        assert_eq!(session.phase(), Phase::Playing);
        assert!(!session.board().contains(l));
        assert!(session.invariant_holds());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_in_flight_cycle() -> Fallible<()> {
        let (driver, _) = driver(4)?;
        let (l, r) = first_playable(&driver);
        let first = {
            let driver = driver.clone();
            tokio::spawn(async move { driver.attempt_match(l, r).await })
        };
        sleep(Duration::from_millis(100)).await;
        driver.reset();
        assert_eq!(driver.session().phase(), Phase::Idle);
        driver.load(Arc::new(simple_catalog(20)), 1)?;
        driver.start()?;
        let board = driver.session().board_view();
        first.await?;
        // The old completion found a stale ticket and touched nothing.
        let session = driver.session();
        assert_eq!(session.board_view(), board);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.stats().correct, 0);
        assert_eq!(session.stats().total_pairs, 10);
        Ok(())
    }
}
