//! Fixed-length match engine

use rand::rngs::StdRng;

use crate::error::SimError;
use crate::history::History;
use crate::payoff::PayoffMatrix;
use crate::player::Player;

/// Run one match of exactly `rounds` rounds between two players.
///
/// Each round, player one decides against the running history and player
/// two against its inverted view, then both moves are appended as one
/// joint round. No early termination. Returns the per-round-normalized
/// score pair from the final history.
///
/// Deterministic given deterministic strategies and a seeded generator;
/// matches involving randomized strategies are only reproducible by
/// replaying from the same generator state.
pub fn battle(
    player1: &Player,
    player2: &Player,
    rounds: u32,
    matrix: &PayoffMatrix,
    rng: &mut StdRng,
) -> Result<(f64, f64), SimError> {
    if rounds == 0 {
        return Err(SimError::ZeroRounds);
    }

    let mut history = History::new();
    for _ in 0..rounds {
        let own_move = player1.make_decision(history.view(), rng);
        let opponent_move = player2.make_decision(history.view().invert(), rng);
        history.append(own_move, opponent_move);
    }
    debug_assert_eq!(history.len(), rounds as usize);

    history.score(matrix)
}
