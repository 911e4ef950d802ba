//! Crate error taxonomy
//!
//! Invalid arguments fail fast at the call boundary; internal bookkeeping
//! invariants use `debug_assert!` instead and are not represented here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A score was requested from a history with no rounds played.
    #[error("history has no rounds to score")]
    EmptyHistory,

    /// A battle must run at least one round.
    #[error("rounds must be greater than zero")]
    ZeroRounds,

    /// Offspring counts come from the population-adjustment formula and can
    /// go negative with exotic payoff matrices; the caller must not pass
    /// such a count through.
    #[error("offspring count must be non-negative, got {0}")]
    NegativeOffspring(i64),

    #[error("matchup rate must be in [0, 1], got {0}")]
    InvalidMatchupRate(f64),

    #[error("mutation probability must be in [0, 1], got {0}")]
    InvalidMutationProbability(f64),

    /// A positive mutation probability needs at least one candidate strategy.
    #[error("mutation probability is positive but the mutation pool is empty")]
    EmptyMutationPool,

    #[error("overall food must be finite and non-negative, got {0}")]
    InvalidOverallFood(f64),

    #[error("standard deviation must be non-negative, got {0}")]
    NegativeStdDev(f64),

    /// Extinction is terminal: once a generation comes up empty, no further
    /// generation transitions are possible for this population.
    #[error("population is extinct; no living players to run a generation")]
    PopulationExtinct,

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
