//! Typed view of the flat key→value configuration supplied by hosting
//! surfaces
//!
//! The core never reads files itself; a collaborator hands it the
//! recognized options (already serialized as JSON) and gets back typed
//! values plus projections into [`PayoffMatrix`] and
//! [`GenerationParams`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SimError;
use crate::payoff::PayoffMatrix;
use crate::population::GenerationParams;

/// Recognized configuration options, with the conventional defaults for
/// anything omitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SimConfig {
    /// Players seeded per species at generation 0.
    pub starting_population: usize,
    pub rounds_per_battle: u32,
    /// Optional jitter on per-match length.
    pub rounds_per_battle_std_dev: u32,
    /// Optional noise on the population-adjustment formula.
    pub population_adjustment_epsilon_std_dev: f64,
    pub coop_coop: i32,
    pub coop_defect: i32,
    pub defect_coop: i32,
    pub defect_defect: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            starting_population: 10,
            rounds_per_battle: 50,
            rounds_per_battle_std_dev: 0,
            population_adjustment_epsilon_std_dev: 0.0,
            coop_coop: 3,
            coop_defect: 0,
            defect_coop: 5,
            defect_defect: 1,
        }
    }
}

impl SimConfig {
    /// Parse from a JSON object of recognized options. Unknown keys are
    /// ignored; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: SimConfig = serde_json::from_str(json)?;
        if config.rounds_per_battle_std_dev * 4 > config.rounds_per_battle {
            warn!(
                rounds = config.rounds_per_battle,
                std_dev = config.rounds_per_battle_std_dev,
                "rounds jitter is large relative to the mean; short matches will clamp to one round"
            );
        }
        Ok(config)
    }

    /// The payoff entries as a matrix.
    pub fn payoff_matrix(&self) -> PayoffMatrix {
        PayoffMatrix::new(
            self.coop_coop,
            self.coop_defect,
            self.defect_coop,
            self.defect_defect,
        )
    }

    /// Generation parameters seeded from this configuration; matchup,
    /// food, and mutation keep their defaults.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            rounds: self.rounds_per_battle,
            rounds_std_dev: f64::from(self.rounds_per_battle_std_dev),
            adjustment_noise_std_dev: self.population_adjustment_epsilon_std_dev,
            ..GenerationParams::default()
        }
    }
}
