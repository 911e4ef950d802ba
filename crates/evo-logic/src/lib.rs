//! Evolutionary simulation core for the iterated Prisoner's Dilemma
//!
//! Pluggable strategies battle pairwise over fixed-length matches, and a
//! multi-species population evolves across generations from their relative
//! performance. This crate is the programmatic core only: dashboards,
//! configuration files, and persistence are external collaborators that
//! call into it and are never depended on.
//!
//! The usual loop:
//!
//! ```
//! use evo_logic::{GenerationParams, PayoffMatrix, Population};
//!
//! let registry = evo_logic::registry();
//! let mut population = Population::new(
//!     [
//!         (registry["TitForTat"].clone(), 10),
//!         (registry["AlwaysDefect"].clone(), 10),
//!     ],
//!     PayoffMatrix::default(),
//!     42,
//! );
//!
//! let params = GenerationParams {
//!     rounds: 20,
//!     overall_food: 40.0,
//!     ..GenerationParams::default()
//! };
//! for _ in 0..5 {
//!     if population.do_generation(&params).is_err() {
//!         break; // extinct
//!     }
//! }
//! println!("{:?}", population.top_species(3));
//! ```
//!
//! A `Population` owns a single seeded random source for every draw in a
//! run, so runs replay exactly from their seed. The core is synchronous
//! and assumes at most one in-flight generation transition per instance;
//! serializing duplicate triggers is the caller's job.

mod battle;
mod config;
mod error;
mod history;
mod payoff;
mod player;
mod population;
mod random;
mod strategy;

pub use battle::battle;
pub use config::SimConfig;
pub use error::SimError;
pub use history::{History, Perspective};
pub use payoff::{Action, PayoffMatrix};
pub use player::{MutationParams, Player};
pub use population::{GenerationParams, Population};
pub use random::{gaussian, probabilistic_round, random_action};
pub use strategy::{
    all_strategies, registry, AlwaysCooperate, AlwaysDefect, AngryRevenge, GenerousTitForTat,
    Joss, Majority, Pavlov, Random, Random2, Strategy, StrategyRef, Tester, ThreeChances,
    TitForTat, TitForTwoTats,
};
