//! Strategy trait and the species catalogue
//!
//! A strategy is a pure decision function over the match as seen from its
//! own side. Strategies hold no state of their own; everything they may
//! react to lives in the [`Perspective`] they are handed, so one instance
//! can safely serve any number of simultaneous matches.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::history::Perspective;
use crate::payoff::Action;
use crate::random::random_action;

/// A species' decision rule: match history in, next move out.
///
/// `decide` is called once per round with the history up to (and
/// excluding) the current round. Randomized species draw from the shared
/// run generator passed in by the engine.
pub trait Strategy: fmt::Debug + Send + Sync {
    /// Display name, also the census key for this species.
    fn name(&self) -> &'static str;

    fn decide(&self, history: Perspective<'_>, rng: &mut StdRng) -> Action;
}

/// Shared handle to a strategy instance.
pub type StrategyRef = Arc<dyn Strategy>;

/// Always plays COOPERATE.
#[derive(Debug, Default)]
pub struct AlwaysCooperate;

impl Strategy for AlwaysCooperate {
    fn name(&self) -> &'static str {
        "AlwaysCooperate"
    }

    fn decide(&self, _history: Perspective<'_>, _rng: &mut StdRng) -> Action {
        Action::Cooperate
    }
}

/// Always plays DEFECT.
#[derive(Debug, Default)]
pub struct AlwaysDefect;

impl Strategy for AlwaysDefect {
    fn name(&self) -> &'static str {
        "AlwaysDefect"
    }

    fn decide(&self, _history: Perspective<'_>, _rng: &mut StdRng) -> Action {
        Action::Defect
    }
}

/// Cooperates first, then copies the opponent's last move.
#[derive(Debug, Default)]
pub struct TitForTat;

impl Strategy for TitForTat {
    fn name(&self) -> &'static str {
        "TitForTat"
    }

    fn decide(&self, history: Perspective<'_>, _rng: &mut StdRng) -> Action {
        match history.opponent_moves().last() {
            None => Action::Cooperate,
            Some(&last) => last,
        }
    }
}

/// Only retaliates after two consecutive opponent defections.
#[derive(Debug, Default)]
pub struct TitForTwoTats;

impl Strategy for TitForTwoTats {
    fn name(&self) -> &'static str {
        "TitForTwoTats"
    }

    fn decide(&self, history: Perspective<'_>, _rng: &mut StdRng) -> Action {
        let opponent = history.opponent_moves();
        if opponent.len() < 2 {
            return Action::Cooperate;
        }
        let last_two = &opponent[opponent.len() - 2..];
        if last_two == [Action::Defect, Action::Defect] {
            Action::Defect
        } else {
            Action::Cooperate
        }
    }
}

/// Grudger with patience: defects forever once the opponent's lifetime
/// defection count reaches three.
#[derive(Debug, Default)]
pub struct ThreeChances;

impl Strategy for ThreeChances {
    fn name(&self) -> &'static str {
        "ThreeChances"
    }

    fn decide(&self, history: Perspective<'_>, _rng: &mut StdRng) -> Action {
        let defections = history
            .opponent_moves()
            .iter()
            .filter(|&&m| m == Action::Defect)
            .count();
        if defections >= 3 {
            Action::Defect
        } else {
            Action::Cooperate
        }
    }
}

/// Classic grudger: cooperates until the opponent's first defection, then
/// defects forever.
#[derive(Debug, Default)]
pub struct AngryRevenge;

impl Strategy for AngryRevenge {
    fn name(&self) -> &'static str {
        "AngryRevenge"
    }

    fn decide(&self, history: Perspective<'_>, _rng: &mut StdRng) -> Action {
        if history.opponent_moves().contains(&Action::Defect) {
            Action::Defect
        } else {
            Action::Cooperate
        }
    }
}

/// Tit-for-tat that sneaks in an unprovoked DEFECT 10% of the time.
#[derive(Debug, Default)]
pub struct Joss;

impl Strategy for Joss {
    fn name(&self) -> &'static str {
        "Joss"
    }

    fn decide(&self, history: Perspective<'_>, rng: &mut StdRng) -> Action {
        match history.opponent_moves().last() {
            None => Action::Cooperate,
            Some(&last) => {
                if rng.gen_bool(0.1) {
                    Action::Defect
                } else {
                    last
                }
            }
        }
    }
}

/// Tit-for-tat that forgives: substitutes COOPERATE for its answer 20% of
/// the time, breaking defection spirals against other retaliators.
#[derive(Debug, Default)]
pub struct GenerousTitForTat;

impl Strategy for GenerousTitForTat {
    fn name(&self) -> &'static str {
        "GenerousTitForTat"
    }

    fn decide(&self, history: Perspective<'_>, rng: &mut StdRng) -> Action {
        match history.opponent_moves().last() {
            None => Action::Cooperate,
            Some(&last) => {
                if rng.gen_bool(0.2) {
                    Action::Cooperate
                } else {
                    last
                }
            }
        }
    }
}

/// Win-stay/lose-shift: cooperates iff both sides made the same move last
/// round.
#[derive(Debug, Default)]
pub struct Pavlov;

impl Strategy for Pavlov {
    fn name(&self) -> &'static str {
        "Pavlov"
    }

    fn decide(&self, history: Perspective<'_>, _rng: &mut StdRng) -> Action {
        match (history.own_moves().last(), history.opponent_moves().last()) {
            (Some(own), Some(opponent)) if own == opponent => Action::Cooperate,
            (Some(_), Some(_)) => Action::Defect,
            _ => Action::Cooperate,
        }
    }
}

/// Plays the opponent's most frequent move so far. Ties cooperate.
#[derive(Debug, Default)]
pub struct Majority;

impl Strategy for Majority {
    fn name(&self) -> &'static str {
        "Majority"
    }

    fn decide(&self, history: Perspective<'_>, _rng: &mut StdRng) -> Action {
        let opponent = history.opponent_moves();
        if opponent.is_empty() {
            return Action::Cooperate;
        }
        let defections = opponent.iter().filter(|&&m| m == Action::Defect).count();
        // Strict majority required to defect; an even split cooperates.
        if defections * 2 > opponent.len() {
            Action::Defect
        } else {
            Action::Cooperate
        }
    }
}

/// Uniform coin flip every round.
#[derive(Debug, Default)]
pub struct Random;

impl Strategy for Random {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn decide(&self, _history: Perspective<'_>, rng: &mut StdRng) -> Action {
        random_action(rng)
    }
}

/// Replays a move drawn uniformly from the opponent's past, so the defect
/// probability tracks how often they have defected. Cooperates first.
#[derive(Debug, Default)]
pub struct Random2;

impl Strategy for Random2 {
    fn name(&self) -> &'static str {
        "Random2"
    }

    fn decide(&self, history: Perspective<'_>, rng: &mut StdRng) -> Action {
        history
            .opponent_moves()
            .choose(rng)
            .copied()
            .unwrap_or(Action::Cooperate)
    }
}

/// Probes for exploitable opponents: defects on round 0, cooperates on
/// rounds 1-2, then either settles into a defect/cooperate alternation if
/// the opponent let the opening defection slide, or falls back to
/// tit-for-tat if they pushed back.
#[derive(Debug, Default)]
pub struct Tester;

impl Strategy for Tester {
    fn name(&self) -> &'static str {
        "Tester"
    }

    fn decide(&self, history: Perspective<'_>, _rng: &mut StdRng) -> Action {
        let opponent = history.opponent_moves();
        match history.len() {
            0 => Action::Defect,
            1 | 2 => Action::Cooperate,
            n => {
                if opponent[1] == Action::Cooperate {
                    // They cooperated right after being defected on.
                    if n % 2 == 1 {
                        Action::Defect
                    } else {
                        Action::Cooperate
                    }
                } else {
                    opponent[n - 1]
                }
            }
        }
    }
}

/// Name → instance registry of every built-in species, ordered by name.
///
/// Used by hosting surfaces for multi-select listings and as the default
/// mutation pool.
pub fn registry() -> BTreeMap<&'static str, StrategyRef> {
    all_strategies()
        .into_iter()
        .map(|strategy| (strategy.name(), strategy))
        .collect()
}

/// Every built-in species, one shared instance each.
pub fn all_strategies() -> Vec<StrategyRef> {
    vec![
        Arc::new(AlwaysCooperate),
        Arc::new(AlwaysDefect),
        Arc::new(TitForTat),
        Arc::new(TitForTwoTats),
        Arc::new(ThreeChances),
        Arc::new(AngryRevenge),
        Arc::new(Joss),
        Arc::new(GenerousTitForTat),
        Arc::new(Pavlov),
        Arc::new(Majority),
        Arc::new(Random),
        Arc::new(Random2),
        Arc::new(Tester),
    ]
}
