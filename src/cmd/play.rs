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

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::driver::Driver;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::events::CardView;
use crate::events::Event;
use crate::events::EventSink;
use crate::phase::Phase;
use crate::session::Attempt;
use crate::session::Session;
use crate::types::card::CardId;

/// Prints events for a human at a terminal.
struct PrintSink;

impl EventSink for PrintSink {
    fn emit(&mut self, event: Event) {
        if let Some(line) = describe(&event) {
            println!("{line}");
        }
    }
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::BoardReady {
            title, total_pairs, ..
        } => Some(format!("{title}: {total_pairs} pairs.")),
        Event::Match {
            description,
            points,
            score,
            combo,
            ..
        } => {
            let mut line = format!("Match! +{points} (score {score}, combo {combo})");
            if let Some(description) = description {
                line.push_str(&format!("\n  {description}"));
            }
            Some(line)
        }
        Event::PartialMatch {
            found,
            required,
            points,
            score,
            ..
        } => Some(format!("Found {found} of {required}. +{points} (score {score})")),
        Event::Mismatch {
            deducted, score, ..
        } => Some(format!("No match. -{deducted} (score {score})")),
        Event::Finished { summary } => Some(format!(
            "Finished! Score {}, {} correct, {} incorrect, accuracy {:.0}%, max combo {}, {}s.",
            summary.score,
            summary.correct,
            summary.incorrect,
            summary.accuracy,
            summary.max_combo,
            summary.duration_ms / 1000
        )),
        Event::Replace { .. } | Event::Remove { .. } => None,
    }
}

#[derive(PartialEq, Eq, Debug)]
enum Input {
    Attempt(CardId, CardId),
    Board,
    Quit,
}

fn parse_input(line: &str) -> Fallible<Input> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["q" | "quit"] => Ok(Input::Quit),
        [] | ["b" | "board"] => Ok(Input::Board),
        [a, b] => Ok(Input::Attempt(a.parse()?, b.parse()?)),
        _ => Err(ErrorReport::new("enter two card ids, `board`, or `quit`.")),
    }
}

fn print_board(session: &Session) {
    let (left, right) = session.board_view();
    let rows = left.len().max(right.len());
    for i in 0..rows {
        let cell = |cards: &[CardView]| match cards.get(i) {
            Some(card) => {
                let progress = match card.progress {
                    Some(p) => format!(" ({}/{})", p.found, p.required),
                    None => String::new(),
                };
                format!("[{:>3}] {}{}", card.id, card.text, progress)
            }
            None => String::new(),
        };
        println!("{:<40} {}", cell(left.as_slice()), cell(right.as_slice()));
    }
}

async fn read_line() -> Fallible<Option<String>> {
    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|n| (n > 0).then_some(line))
    })
    .await??;
    Ok(line)
}

pub async fn play(
    file: PathBuf,
    level: u8,
    seed: Option<u64>,
    config: Option<PathBuf>,
) -> Fallible<()> {
    let config = Config::load(config.as_deref())?;
    let catalog = Arc::new(Catalog::load(&file)?);
    let timing = config.timing.clone();
    let session = Session::new(config, seed, Box::new(PrintSink));
    let driver = Driver::new(session, timing);
    driver.load(catalog.clone(), level)?;
    driver.start()?;
    println!(
        "{} vs {}. Type two card ids to link them.",
        catalog.left_label(),
        catalog.right_label()
    );
    print_board(&driver.session());

    while driver.session().phase() == Phase::Playing {
        let Some(line) = read_line().await? else {
            break;
        };
        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(e) => {
                println!("{}", e.message());
                continue;
            }
        };
        match input {
            Input::Quit => break,
            Input::Board => print_board(&driver.session()),
            Input::Attempt(a, b) => match driver.attempt_match(a, b).await {
                Attempt::Rejected(reason) => println!("Invalid selection: {reason}."),
                Attempt::Ignored => {}
                Attempt::Accepted { .. } => {
                    let session = driver.session();
                    if session.phase() == Phase::Playing {
                        print_board(&session);
                    }
                }
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::card::Side;

    #[test]
    fn test_parse_input() -> Fallible<()> {
        assert_eq!(
            parse_input("3 7\n")?,
            Input::Attempt(CardId::new(3), CardId::new(7))
        );
        assert_eq!(parse_input("quit")?, Input::Quit);
        assert_eq!(parse_input("\n")?, Input::Board);
        assert!(parse_input("3").is_err());
        assert!(parse_input("a b").is_err());
        Ok(())
    }

    #[test]
    fn test_describe() {
        let event = Event::Match {
            left: CardId::new(0),
            right: CardId::new(1),
            description: Some("Paris is the capital of France".to_string()),
            points: 60,
            score: 310,
            combo: 5,
        };
        assert_eq!(
            describe(&event).unwrap(),
            "Match! +60 (score 310, combo 5)\n  Paris is the capital of France"
        );
        let event = Event::Replace {
            side: Side::Left,
            slot: 0,
            old: CardId::new(0),
            card: CardView {
                id: CardId::new(9),
                side: Side::Left,
                text: "Spain".to_string(),
                tier: None,
                progress: None,
            },
        };
        assert_eq!(describe(&event), None);
    }
}
