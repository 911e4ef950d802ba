//! Action alphabet and payoff model

use serde::{Deserialize, Serialize};

/// One move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Cooperate,
    Defect,
}

impl Action {
    /// The opposite action
    pub fn invert(self) -> Self {
        match self {
            Action::Cooperate => Action::Defect,
            Action::Defect => Action::Cooperate,
        }
    }
}

/// Per-round reward table, keyed by (own action, opponent action).
///
/// Constructed from the four own-side entries; the cross entries mirror
/// each other, so the reward for defecting against a cooperator is the
/// opponent-side reward for cooperating against a defector. Immutable once
/// built and shared by reference across every match in a run.
///
/// The classic dilemma ordering t > r > p > s is conventional, not
/// enforced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffMatrix {
    coop_coop: i32,
    coop_defect: i32,
    defect_coop: i32,
    defect_defect: i32,
}

impl PayoffMatrix {
    pub fn new(coop_coop: i32, coop_defect: i32, defect_coop: i32, defect_defect: i32) -> Self {
        Self {
            coop_coop,
            coop_defect,
            defect_coop,
            defect_defect,
        }
    }

    /// Look up the rewards for one simultaneous pair of actions.
    ///
    /// Returns `(own_reward, opponent_reward)`. Total over the two-variant
    /// action type, so there is no invalid-action failure path.
    pub fn reward(&self, own: Action, opponent: Action) -> (i32, i32) {
        match (own, opponent) {
            (Action::Cooperate, Action::Cooperate) => (self.coop_coop, self.coop_coop),
            (Action::Cooperate, Action::Defect) => (self.coop_defect, self.defect_coop),
            (Action::Defect, Action::Cooperate) => (self.defect_coop, self.coop_defect),
            (Action::Defect, Action::Defect) => (self.defect_defect, self.defect_defect),
        }
    }
}

impl Default for PayoffMatrix {
    /// The conventional Axelrod payoffs: reward 3, sucker 0, temptation 5,
    /// punishment 1.
    fn default() -> Self {
        Self::new(3, 0, 5, 1)
    }
}
