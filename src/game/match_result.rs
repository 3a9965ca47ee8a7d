//! Match result
//!
//! Computes the outcome and per-ship stats once either side runs out of lives.

use serde::Serialize;

use crate::game::state::{GameState, ShipId};

/// How the match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchOutcome {
    Winner(ShipId),
    /// Both ships lost their last life in the same tick
    Draw,
}

/// Per-ship stats at the end of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShipStats {
    pub id: ShipId,
    pub lives_left: u32,
    pub deaths: u32,
    pub shots_fired: u32,
    pub hits: u32,
}

impl ShipStats {
    /// Fraction of shots that destroyed the opponent
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots_fired as f32
        }
    }
}

/// Match result information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub winner: Option<ShipId>,
    /// Ticks played
    pub ticks: u64,
    pub ships: [ShipStats; 2],
}

/// Whether either ship is out of lives
pub fn is_match_over(state: &GameState) -> bool {
    state.ships.iter().any(|s| s.lives == 0)
}

/// Determine match result from game state, or `None` while both ships have lives
pub fn determine_result(state: &GameState) -> Option<MatchResult> {
    if !is_match_over(state) {
        return None;
    }

    let ships = ShipId::ALL.map(|id| {
        let ship = state.ship(id);
        ShipStats {
            id,
            lives_left: ship.lives,
            deaths: ship.deaths,
            shots_fired: ship.shots_fired,
            hits: ship.hits,
        }
    });

    let outcome = match (ships[0].lives_left, ships[1].lives_left) {
        (0, 0) => MatchOutcome::Draw,
        (0, _) => MatchOutcome::Winner(ShipId::Two),
        _ => MatchOutcome::Winner(ShipId::One),
    };
    let winner = match outcome {
        MatchOutcome::Winner(id) => Some(id),
        MatchOutcome::Draw => None,
    };

    Some(MatchResult {
        outcome,
        winner,
        ticks: state.tick,
        ships,
    })
}
