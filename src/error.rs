//! Error types for command handling.
//!
//! Every rejection leaves the session untouched and the submitting player
//! keeps the turn. The `Display` text is what the player is shown.

use thiserror::Error;

/// Broad class of a rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The input could not be understood.
    Malformed,
    /// The input parsed but breaks a game rule (mana, lane locks, king access).
    RuleViolation,
    /// The input arrived out of turn or after the game ended.
    TurnOrder,
}

/// Reasons a command is rejected by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Blank input; the player is simply prompted again.
    #[error("empty command")]
    Blank,
    /// The first word is not a known command.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// `summon` with the wrong number of arguments.
    #[error("usage: summon <troop> <guard|king> <slot> <attack|defend>")]
    Usage,
    /// The slot argument is not a number.
    #[error("slot must be a number, got `{0}`")]
    InvalidSlot(String),
    /// The slot number is above 2.
    #[error("slot {0} is out of range")]
    SlotOutOfRange(u32),
    /// Target was neither `guard` nor `king`.
    #[error("invalid target `{0}`, use guard or king")]
    InvalidTarget(String),
    /// Mode was neither `attack` nor `defend`.
    #[error("invalid mode `{0}`, use attack or defend")]
    InvalidMode(String),
    /// The stat catalog has no troop by this name.
    #[error("unknown troop `{0}`")]
    UnknownTroop(String),
    /// Player cannot afford the troop.
    #[error("not enough mana ({required} required, {available} available)")]
    NotEnoughMana {
        /// Cost of the troop.
        required: u32,
        /// Mana the player holds.
        available: u32,
    },
    /// `guard 0` does not name a guard tower.
    #[error("guard slot must be 1 or 2")]
    InvalidGuardSlot,
    /// Guard tower 2 can only be attacked once guard tower 1 has fallen.
    #[error("opponent's guard tower 1 is still standing, guard tower 2 is locked")]
    LaneLocked,
    /// The targeted enemy guard tower is already destroyed.
    #[error("opponent's guard tower {0} is already destroyed")]
    TargetDestroyed(u8),
    /// The player's own guard tower for that lane is destroyed.
    #[error("your guard tower {0} is destroyed, cannot defend there")]
    OwnTowerDestroyed(u8),
    /// King attack while an enemy guard tower still stands.
    #[error("opponent's guard towers are still standing, cannot attack the king")]
    KingSealed,
    /// King defence while one of the player's guard towers still stands.
    #[error("you must lose both guard towers before defending your king")]
    KingNotExposed,
    /// Any king slot/mode pairing other than `1 attack` or `0 defend`.
    #[error("use `king 1 attack` or `king 0 defend`")]
    InvalidKingSlot,
    /// Input from the player who does not hold the turn.
    #[error("it is not your turn")]
    NotYourTurn,
    /// The match has already been decided.
    #[error("the game is over")]
    GameOver,
}

impl CommandError {
    /// Classify this rejection.
    #[must_use]
    pub const fn kind(&self) -> Rejection {
        match self {
            Self::Blank
            | Self::UnknownCommand(_)
            | Self::Usage
            | Self::InvalidSlot(_)
            | Self::SlotOutOfRange(_)
            | Self::InvalidTarget(_)
            | Self::InvalidMode(_)
            | Self::UnknownTroop(_) => Rejection::Malformed,
            Self::NotEnoughMana { .. }
            | Self::InvalidGuardSlot
            | Self::LaneLocked
            | Self::TargetDestroyed(_)
            | Self::OwnTowerDestroyed(_)
            | Self::KingSealed
            | Self::KingNotExposed
            | Self::InvalidKingSlot => Rejection::RuleViolation,
            Self::NotYourTurn | Self::GameOver => Rejection::TurnOrder,
        }
    }
}

/// Result type for command handling.
pub type CommandResult<T> = Result<T, CommandError>;
