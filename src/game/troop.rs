//! Troop instances.

use std::fmt;

use serde::Serialize;

use crate::game::{CombatStats, HasCombatStats, Lane, PlayerId, Special, TroopTemplate, scale_for_level};

/// Session-unique troop identity.
///
/// Two troops may share every stat; the id is what tells them apart when a
/// troop has to be pulled out of the middle of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TroopId(pub u64);

/// A troop's stance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// May strike the opposing tower.
    Attack,
    /// Holds the lane; never touches a tower.
    Defend,
}

impl Mode {
    /// Parse `attack` / `defend`, case-insensitively.
    #[must_use]
    pub fn parse(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("attack") {
            Some(Self::Attack)
        } else if word.eq_ignore_ascii_case("defend") {
            Some(Self::Defend)
        } else {
            None
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::Defend => write!(f, "defend"),
        }
    }
}

/// A summoned troop, owned by exactly one lane queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Troop {
    /// Identity within the session.
    pub id: TroopId,
    /// Template name.
    pub name: String,
    /// Owning player.
    pub owner: PlayerId,
    /// Lane the troop was placed in.
    pub lane: Lane,
    /// Stance.
    pub mode: Mode,
    /// Level-scaled combat stats.
    pub stats: CombatStats,
    /// Level-scaled mana paid for the troop.
    pub mana_cost: u32,
    /// Special ability, if any.
    pub special: Option<Special>,
}

impl Troop {
    /// Instantiate a template for `owner`, scaled by the owner's level.
    #[must_use]
    pub fn summon(
        id: TroopId,
        template: &TroopTemplate,
        owner: PlayerId,
        level: u32,
        lane: Lane,
        mode: Mode,
    ) -> Self {
        let mut troop = Self {
            id,
            name: template.name.clone(),
            owner,
            lane,
            mode,
            stats: template.stats,
            mana_cost: template.cost_for_level(level),
            special: template.special,
        };
        scale_for_level(&mut troop, level);
        troop
    }
}

impl HasCombatStats for Troop {
    fn combat(&self) -> &CombatStats {
        &self.stats
    }

    fn combat_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }
}
