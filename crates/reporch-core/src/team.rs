//! Developer selection over a fixed team.

use crate::types::{Developer, Strategy};
use rand::seq::SliceRandom;
use rand::Rng;

/// Stateful cursor producing an unbounded sequence of developers.
///
/// Randomness is borrowed per pull rather than owned, so the same session
/// rng drives selection, timeline jitter and message text in one stream.
#[derive(Debug, Clone)]
pub struct DeveloperSelector {
    team: Vec<Developer>,
    strategy: Strategy,
    cursor: usize,
}

impl DeveloperSelector {
    /// `team` must be non-empty; session assembly guarantees it.
    pub fn new(team: Vec<Developer>, strategy: Strategy) -> Self {
        debug_assert!(!team.is_empty());
        Self {
            team,
            strategy,
            cursor: 0,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn team(&self) -> &[Developer] {
        &self.team
    }

    pub fn next_developer<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Developer {
        match self.strategy {
            Strategy::RoundRobin => {
                let dev = self.team[self.cursor % self.team.len()].clone();
                self.cursor = (self.cursor + 1) % self.team.len();
                dev
            }
            Strategy::RandomUniform => self
                .team
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| self.team[0].clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
