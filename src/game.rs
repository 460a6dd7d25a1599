//! Game layer for lanewar.
//!
//! Implements the match rules:
//! - Troops and towers with level-scaled combat stats
//! - Three lanes per player, each a FIFO troop queue
//! - Command parsing and lane-unlock rules
//! - Per-lane combat resolution with seeded critical hits
//! - Turn coordination, mana, victory and rewards

mod combat;
mod command;
mod event;
pub mod invariants;
mod lane;
mod outcome;
mod player;
mod session;
mod stats;
mod tower;
mod troop;

pub use combat::{
    CritSource, FixedCrits, SeededCrits, TowerHit, damage_tower, resolve_lane, tower_strikes_troop,
};
pub use command::{Command, Placement, SummonOrder, Target, validate_summon};
pub use event::{Audience, Event};
pub use lane::{LANE_COUNT, Lane, LaneQueue};
pub use outcome::{CONSOLATION_REWARD, Outcome, WIN_REWARD, settle};
pub use player::{
    MANA_REGEN, MAX_MANA, Player, PlayerId, STARTING_MANA, level_for_experience, opponent,
};
pub use session::{Entrant, Lobby, LobbyError, SEATS, Session, Submission};
pub use stats::{
    CombatStats, HasCombatStats, Special, StatProvider, TowerTemplate, TowerTemplates,
    TroopTemplate, scale_for_level, scale_value,
};
pub use tower::{HEAL_AMOUNT, Tower, TowerKind, heal_weakest};
pub use troop::{Mode, Troop, TroopId};
