//! Shared stochastic helpers
//!
//! Every random draw in a run (matchup trials, randomized strategies,
//! mutation picks, stochastic rounding) goes through one seeded `StdRng`
//! owned by the [`Population`](crate::Population), so a run is
//! reproducible from its seed.

use rand::rngs::StdRng;
use rand::Rng;

use crate::payoff::Action;

/// Uniform coin flip over the two actions.
pub fn random_action(rng: &mut StdRng) -> Action {
    if rng.gen_bool(0.5) {
        Action::Cooperate
    } else {
        Action::Defect
    }
}

/// Unbiased stochastic rounding: round down, then round up with
/// probability equal to the fractional remainder. 3.75 becomes 4 with 75%
/// probability and 3 otherwise, so the expectation equals the input and
/// the continuous fitness signal survives integer offspring counts.
pub fn probabilistic_round(x: f64, rng: &mut StdRng) -> i64 {
    debug_assert!(x.is_finite(), "probabilistic_round on non-finite {x}");
    let floor = x.floor();
    let remainder = x - floor;
    floor as i64 + i64::from(rng.gen_bool(remainder))
}

/// Zero-mean gaussian sample with the given standard deviation,
/// approximated by an Irwin-Hall sum of 12 uniforms.
pub fn gaussian(std_dev: f64, rng: &mut StdRng) -> f64 {
    let sum: f64 = (0..12).map(|_| rng.gen::<f64>()).sum();
    (sum - 6.0) * std_dev
}
