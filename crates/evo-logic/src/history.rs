//! Append-only move record of a single match, with derived scoring

use crate::error::SimError;
use crate::payoff::{Action, PayoffMatrix};

/// The accumulated moves of one match, from the first player's point of
/// view: `own` holds player one's moves, `opponent` player two's, one entry
/// pair per round.
///
/// Invariant: both columns always have equal length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    own: Vec<Action>,
    opponent: Vec<Action>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one joint round. O(1) amortized.
    pub fn append(&mut self, own_move: Action, opponent_move: Action) {
        self.own.push(own_move);
        self.opponent.push(opponent_move);
    }

    /// Number of rounds played so far.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.own.len(), self.opponent.len());
        self.own.len()
    }

    pub fn is_empty(&self) -> bool {
        self.own.is_empty()
    }

    pub fn own_moves(&self) -> &[Action] {
        &self.own
    }

    pub fn opponent_moves(&self) -> &[Action] {
        &self.opponent
    }

    /// The match as player one sees it. `view().invert()` is the same match
    /// as player two sees it; both borrow the same underlying columns, so
    /// the two perspectives can never drift apart.
    pub fn view(&self) -> Perspective<'_> {
        Perspective {
            own: &self.own,
            opponent: &self.opponent,
        }
    }

    /// Walk all rounds through the payoff matrix and return per-round
    /// average scores as `(own, opponent)`.
    ///
    /// Errors with [`SimError::EmptyHistory`] before any rounds are played;
    /// callers that need a score mid-setup must guard the zero-length case.
    pub fn score(&self, matrix: &PayoffMatrix) -> Result<(f64, f64), SimError> {
        if self.is_empty() {
            return Err(SimError::EmptyHistory);
        }
        let mut own_total = 0i64;
        let mut opponent_total = 0i64;
        for (&own_move, &opponent_move) in self.own.iter().zip(&self.opponent) {
            let (own_reward, opponent_reward) = matrix.reward(own_move, opponent_move);
            own_total += i64::from(own_reward);
            opponent_total += i64::from(opponent_reward);
        }
        let rounds = self.len() as f64;
        Ok((own_total as f64 / rounds, opponent_total as f64 / rounds))
    }

    #[cfg(test)]
    pub(crate) fn from_columns(own: Vec<Action>, opponent: Vec<Action>) -> Self {
        assert_eq!(own.len(), opponent.len());
        Self { own, opponent }
    }
}

/// A borrowed, perspective-aware view of a [`History`].
///
/// Strategies always receive the match through a `Perspective` so that
/// "my moves" and "their moves" mean the same thing regardless of which
/// seat the player occupies. Inversion swaps the two slice references and
/// copies nothing.
#[derive(Clone, Copy, Debug)]
pub struct Perspective<'a> {
    own: &'a [Action],
    opponent: &'a [Action],
}

impl<'a> Perspective<'a> {
    /// The same match seen from the other side.
    pub fn invert(self) -> Perspective<'a> {
        Perspective {
            own: self.opponent,
            opponent: self.own,
        }
    }

    pub fn len(&self) -> usize {
        self.own.len()
    }

    pub fn is_empty(&self) -> bool {
        self.own.is_empty()
    }

    pub fn own_moves(&self) -> &'a [Action] {
        self.own
    }

    pub fn opponent_moves(&self) -> &'a [Action] {
        self.opponent
    }

    /// Rounds in order, as `(own_move, opponent_move)` pairs.
    pub fn rounds(&self) -> impl Iterator<Item = (Action, Action)> + 'a {
        self.own
            .iter()
            .copied()
            .zip(self.opponent.iter().copied())
    }
}
