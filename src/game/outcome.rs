//! Win detection follow-up: rewards and termination notices.

use serde::Serialize;
use tracing::info;

use crate::game::{Event, Player, PlayerId};
use crate::store::{PlayerStore, award_or_log};

/// Experience granted to the player who destroys the enemy king.
pub const WIN_REWARD: u32 = 30;

/// Experience granted to the losing player.
pub const CONSOLATION_REWARD: u32 = 10;

/// The decided result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Seat that destroyed the enemy king.
    pub winner: PlayerId,
    /// Seat whose king fell.
    pub loser: PlayerId,
}

/// Persist rewards for both players and produce the closing notices.
///
/// Store failures are logged inside [`award_or_log`]; the notices are
/// produced regardless.
pub fn settle(outcome: Outcome, players: &[Player; 2], store: &dyn PlayerStore) -> Vec<Event> {
    let winner = &players[outcome.winner];
    let loser = &players[outcome.loser];
    info!(winner = %winner.username, loser = %loser.username, "settling match");

    let mut events = Vec::with_capacity(3);
    for (player, amount) in [(winner, WIN_REWARD), (loser, CONSOLATION_REWARD)] {
        award_or_log(store, &player.username, amount);
        events.push(Event::ExperienceAwarded {
            player: player.id,
            username: player.username.clone(),
            amount,
        });
    }
    events.push(Event::MatchOver);
    events
}
