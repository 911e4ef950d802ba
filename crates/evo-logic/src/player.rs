//! A living individual: a strategy plus lineage state

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::battle;
use crate::error::SimError;
use crate::history::Perspective;
use crate::payoff::{Action, PayoffMatrix};
use crate::strategy::StrategyRef;

/// Mutation settings for one reproduction phase.
///
/// Each non-parent offspring independently swaps its inherited strategy
/// for a uniform pick from `strategies` with probability `probability`;
/// the surviving parent joins the lottery only when `can_mutate_parent`
/// is set. A pick may land on the strategy the player already has.
#[derive(Clone, Debug, Default)]
pub struct MutationParams {
    pub strategies: Vec<StrategyRef>,
    pub probability: f64,
    pub can_mutate_parent: bool,
}

impl MutationParams {
    /// No mutation at all.
    pub fn none() -> Self {
        Self::default()
    }
}

/// One living individual.
///
/// Wraps a shared strategy instance together with the mutable lineage
/// state: the cached species label, generations survived, and the score
/// accumulated over the current generation's battles. Identity persists
/// across a strategy change; a player only disappears when a generation
/// grants it zero offspring.
#[derive(Clone, Debug)]
pub struct Player {
    strategy: StrategyRef,
    strategy_name: &'static str,
    age: u32,
    most_recent_score: f64,
}

impl Player {
    pub fn new(strategy: StrategyRef) -> Self {
        Self::with_age(strategy, 0)
    }

    fn with_age(strategy: StrategyRef, age: u32) -> Self {
        Self {
            strategy_name: strategy.name(),
            strategy,
            age,
            most_recent_score: 0.0,
        }
    }

    /// The species label, kept in sync with the current strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy_name
    }

    /// Generations survived so far.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Normalized average payoff accumulated during the current
    /// generation's battling phase.
    pub fn most_recent_score(&self) -> f64 {
        self.most_recent_score
    }

    pub(crate) fn reset_score(&mut self) {
        self.most_recent_score = 0.0;
    }

    pub(crate) fn add_score(&mut self, delta: f64) {
        self.most_recent_score += delta;
    }

    /// Delegate the next move to this player's strategy.
    pub fn make_decision(&self, history: Perspective<'_>, rng: &mut StdRng) -> Action {
        self.strategy.decide(history, rng)
    }

    /// Swap the strategy in place. Age and score are untouched; only the
    /// species label follows the new strategy.
    pub fn change_strategy(&mut self, new_strategy: StrategyRef) {
        self.strategy_name = new_strategy.name();
        self.strategy = new_strategy;
    }

    /// Run one fixed-length match against `opponent` and return the
    /// per-round-normalized score pair. Does not touch either player's
    /// accumulated score; that bookkeeping belongs to the population.
    pub fn battle(
        &self,
        opponent: &Player,
        rounds: u32,
        matrix: &PayoffMatrix,
        rng: &mut StdRng,
    ) -> Result<(f64, f64), SimError> {
        battle::battle(self, opponent, rounds, matrix, rng)
    }

    /// Produce this player's contribution to the next generation.
    ///
    /// A count of zero means the player did not survive and yields an
    /// empty vector. Otherwise element 0 continues this lineage, aged by
    /// one and with a fresh score; elements 1.. are newborn offspring at
    /// age 0 inheriting the current strategy. Mutation applies per
    /// [`MutationParams`].
    ///
    /// Negative counts are rejected; the non-integral case the adjustment
    /// formula could produce is handled before rounding ever reaches this
    /// boundary.
    pub fn get_offspring(
        &self,
        count: i64,
        mutation: &MutationParams,
        rng: &mut StdRng,
    ) -> Result<Vec<Player>, SimError> {
        if count < 0 {
            return Err(SimError::NegativeOffspring(count));
        }
        if !(0.0..=1.0).contains(&mutation.probability) {
            return Err(SimError::InvalidMutationProbability(mutation.probability));
        }
        if mutation.probability > 0.0 && mutation.strategies.is_empty() {
            return Err(SimError::EmptyMutationPool);
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut players = Vec::with_capacity(count as usize);
        let mut parent = Player::with_age(Arc::clone(&self.strategy), self.age + 1);
        if mutation.can_mutate_parent {
            maybe_mutate(&mut parent, mutation, rng);
        }
        players.push(parent);

        for _ in 1..count {
            let mut child = Player::new(Arc::clone(&self.strategy));
            maybe_mutate(&mut child, mutation, rng);
            players.push(child);
        }
        Ok(players)
    }
}

fn maybe_mutate(player: &mut Player, mutation: &MutationParams, rng: &mut StdRng) {
    if mutation.probability == 0.0 || !rng.gen_bool(mutation.probability) {
        return;
    }
    if let Some(pick) = mutation.strategies.choose(rng) {
        player.change_strategy(Arc::clone(pick));
    }
}
