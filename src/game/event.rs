//! Notifications emitted by the engine.
//!
//! Every state change worth telling a player about becomes an [`Event`].
//! The transport decides how to deliver them; `Display` gives the text.

use std::fmt;

use serde::Serialize;

use crate::game::{Lane, Mode, PlayerId};

/// Who should receive an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Both players.
    Everyone,
    /// A single player.
    Player(PlayerId),
}

impl Audience {
    /// Whether `player` should receive an event with this audience.
    #[must_use]
    pub const fn includes(self, player: PlayerId) -> bool {
        match self {
            Self::Everyone => true,
            Self::Player(id) => id == player,
        }
    }
}

/// Something that happened in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Both players are in and the match begins.
    MatchStarted {
        /// Usernames by seat.
        players: [String; 2],
    },
    /// A troop entered a lane queue.
    Summoned {
        /// Summoning player.
        player: String,
        /// Troop name.
        troop: String,
        /// Lane it joined.
        lane: Lane,
        /// Stance.
        mode: Mode,
        /// Mana left after paying.
        mana: u32,
    },
    /// A healing troop restored a tower.
    TowerHealed {
        /// Tower owner.
        player: String,
        /// Healed tower's lane.
        lane: Lane,
        /// HP restored.
        amount: u32,
        /// HP after healing.
        hp: u32,
    },
    /// A player committed `end`.
    TurnEnded {
        /// Player who passed.
        player: String,
    },
    /// The turn holder ran out of time; `end` was committed for them.
    TurnTimedOut {
        /// Player who timed out.
        player: String,
    },
    /// A troop's HP reached zero and it left its queue.
    TroopDefeated {
        /// Owner of the fallen troop.
        owner: String,
        /// Troop name.
        troop: String,
        /// Lane it fell in.
        lane: Lane,
    },
    /// A troop hit the opposing tower.
    TowerStruck {
        /// Attacking player.
        attacker: String,
        /// Attacking troop.
        troop: String,
        /// Lane of the tower.
        lane: Lane,
        /// Whether the hit was critical.
        critical: bool,
        /// Tower DEF before the hit.
        def_before: u32,
        /// Tower DEF after the hit.
        def_after: u32,
        /// Tower HP before the hit.
        hp_before: u32,
        /// Tower HP after the hit.
        hp_after: u32,
    },
    /// A tower hit back at the troop that struck it.
    TowerRetaliated {
        /// Owner of the troop that was hit.
        owner: String,
        /// Troop name.
        troop: String,
        /// Lane of the exchange.
        lane: Lane,
        /// Damage after the troop's DEF.
        damage: u32,
        /// Troop HP afterwards.
        hp: u32,
    },
    /// A tower's HP reached zero.
    TowerDestroyed {
        /// Player who lost the tower.
        owner: String,
        /// Lane of the tower.
        lane: Lane,
    },
    /// Both sides' troops in a lane were cleared after a guard tower fell.
    LaneCleared {
        /// The lane that reset.
        lane: Lane,
    },
    /// All three lanes were resolved.
    RoundResolved {
        /// Round number, starting at 1.
        round: u32,
    },
    /// End-of-round mana update.
    ManaRegenerated {
        /// Player whose mana changed.
        player: PlayerId,
        /// Mana after regeneration.
        mana: u32,
    },
    /// A king tower fell.
    Victory {
        /// Winning player.
        winner: String,
        /// Losing player.
        loser: String,
    },
    /// Experience granted at match end.
    ExperienceAwarded {
        /// Seat of the recipient.
        player: PlayerId,
        /// Recipient's username.
        username: String,
        /// Experience added.
        amount: u32,
    },
    /// The session is closing.
    MatchOver,
}

impl Event {
    /// Who should see this event.
    #[must_use]
    pub const fn audience(&self) -> Audience {
        match self {
            Self::ManaRegenerated { player, .. } | Self::ExperienceAwarded { player, .. } => {
                Audience::Player(*player)
            }
            _ => Audience::Everyone,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchStarted { players } => write!(
                f,
                "Game started: {} vs {}. Take turns to summon your troops.",
                players[0], players[1]
            ),
            Self::Summoned {
                player,
                troop,
                lane,
                mode,
                mana,
            } => write!(f, "{player} summoned {troop} to {lane} ({mode}). Mana: {mana}"),
            Self::TowerHealed {
                player,
                lane,
                amount,
                hp,
            } => write!(f, "{player}'s tower in {lane} healed by {amount} HP (HP: {hp})"),
            Self::TurnEnded { player } => write!(f, "{player} ended their turn."),
            Self::TurnTimedOut { player } => {
                write!(f, "{player} ran out of time; their turn was ended.")
            }
            Self::TroopDefeated { owner, troop, lane } => {
                write!(f, "{owner}'s {troop} was defeated in {lane}")
            }
            Self::TowerStruck {
                attacker,
                troop,
                lane,
                critical,
                def_before,
                def_after,
                hp_before,
                hp_after,
            } => {
                let crit = if *critical { " CRITICAL HIT!" } else { "" };
                write!(
                    f,
                    "{attacker}'s {troop} attacked enemy tower in {lane}.{crit} DEF: {def_before}->{def_after} | HP: {hp_before}->{hp_after}"
                )
            }
            Self::TowerRetaliated {
                owner,
                troop,
                lane,
                damage,
                hp,
            } => write!(
                f,
                "Tower in {lane} struck back at {owner}'s {troop} for {damage} (HP: {hp})"
            ),
            Self::TowerDestroyed { owner, lane } => {
                write!(f, "{owner}'s tower in {lane} was destroyed!")
            }
            Self::LaneCleared { lane } => write!(f, "All troops in {lane} were cleared."),
            Self::RoundResolved { round } => write!(f, "Round {round} resolved."),
            Self::ManaRegenerated { mana, .. } => write!(f, "Mana = {mana}"),
            Self::Victory { winner, .. } => write!(f, "{winner} wins the game!"),
            Self::ExperienceAwarded { amount, .. } => write!(f, "You earned {amount} EXP."),
            Self::MatchOver => write!(f, "Game over. Disconnecting..."),
        }
    }
}
