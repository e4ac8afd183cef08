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

/// The lifecycle of a session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Playing,
    /// A match is being evaluated. Doubles as the reentrancy gate.
    Checking,
    Finished,
    Error,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IllegalTransition {
    pub from: Phase,
    pub to: Phase,
}

impl Display for IllegalTransition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "illegal transition {} -> {}", self.from, self.to)
    }
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Loading => "LOADING",
            Phase::Ready => "READY",
            Phase::Playing => "PLAYING",
            Phase::Checking => "CHECKING",
            Phase::Finished => "FINISHED",
            Phase::Error => "ERROR",
        }
    }

    pub fn can_transition(self, to: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, to),
            (Idle, Loading | Error)
                | (Loading, Ready | Error)
                | (Ready, Playing | Error)
                | (Playing, Checking | Finished | Error)
                | (Checking, Playing | Finished | Error)
                | (Finished, Idle)
                | (Error, Idle | Loading)
        )
    }

    /// The phase after moving to `to`, or the rejected edge.
    pub fn transition(self, to: Phase) -> Result<Phase, IllegalTransition> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(IllegalTransition { from: self, to })
        }
    }

    /// Player input is only evaluated while playing.
    pub fn accepts_input(self) -> bool {
        self == Phase::Playing
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Phase; 7] = [
        Phase::Idle,
        Phase::Loading,
        Phase::Ready,
        Phase::Playing,
        Phase::Checking,
        Phase::Finished,
        Phase::Error,
    ];

    #[test]
    fn test_table() {
        let legal: usize = ALL
            .iter()
            .map(|from| ALL.iter().filter(|to| from.can_transition(**to)).count())
            .sum();
        // 2 + 2 + 2 + 3 + 3 + 1 + 2
        assert_eq!(legal, 15);
        assert_eq!(Phase::Playing.transition(Phase::Checking), Ok(Phase::Checking));
        assert_eq!(Phase::Checking.transition(Phase::Playing), Ok(Phase::Playing));
    }

    #[test]
    fn test_illegal() {
        let err = Phase::Idle.transition(Phase::Playing).unwrap_err();
        assert_eq!(
            err,
            IllegalTransition {
                from: Phase::Idle,
                to: Phase::Playing
            }
        );
        assert_eq!(err.to_string(), "illegal transition IDLE -> PLAYING");
        assert!(Phase::Finished.transition(Phase::Playing).is_err());
        assert!(Phase::Ready.transition(Phase::Checking).is_err());
        // Self-loops are not edges.
        for phase in ALL {
            assert!(phase.transition(phase).is_err());
        }
    }

    #[test]
    fn test_error_recovery() {
        for from in [Phase::Loading, Phase::Ready, Phase::Playing, Phase::Checking] {
            assert!(from.can_transition(Phase::Error));
        }
        assert!(!Phase::Finished.can_transition(Phase::Error));
        assert!(Phase::Error.can_transition(Phase::Idle));
        assert!(Phase::Error.can_transition(Phase::Loading));
    }

    #[test]
    fn test_accepts_input() {
        let accepting: Vec<Phase> = ALL.into_iter().filter(|p| p.accepts_input()).collect();
        assert_eq!(accepting, vec![Phase::Playing]);
    }
}
