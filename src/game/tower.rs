//! Towers.

use serde::Serialize;

use crate::game::{CombatStats, HasCombatStats, Lane, TowerTemplate, TowerTemplates, scale_for_level};

/// HP restored by a healing troop.
pub const HEAL_AMOUNT: u32 = 300;

/// Guard or king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TowerKind {
    /// One of the two guard towers.
    Guard,
    /// The king tower; losing it loses the game.
    King,
}

/// A player's tower. Built once at session start, mutated, never replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tower {
    /// Guard or king.
    pub kind: TowerKind,
    /// Level-scaled stats. `def` is worn down before `hp`.
    pub stats: CombatStats,
    /// Probability in `[0, 1]` that a hit on this tower is critical.
    pub crit: f64,
    /// Experience value.
    pub exp_value: u32,
}

impl Tower {
    /// Build a tower from a template, scaled for the owner's level.
    #[must_use]
    pub fn from_template(kind: TowerKind, template: &TowerTemplate, level: u32) -> Self {
        let mut tower = Self {
            kind,
            stats: template.stats,
            crit: template.crit.clamp(0.0, 1.0),
            exp_value: template.exp_value,
        };
        scale_for_level(&mut tower, level);
        tower
    }

    /// The full set of towers for one side, indexed by lane.
    #[must_use]
    pub fn standard_set(templates: &TowerTemplates, level: u32) -> [Self; 3] {
        [
            Self::from_template(TowerKind::Guard, &templates.guard, level),
            Self::from_template(TowerKind::Guard, &templates.guard, level),
            Self::from_template(TowerKind::King, &templates.king, level),
        ]
    }

    /// A destroyed tower takes no further part in combat.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.stats.hp == 0
    }
}

impl HasCombatStats for Tower {
    fn combat(&self) -> &CombatStats {
        &self.stats
    }

    fn combat_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }
}

/// Heal the standing tower with the lowest HP by [`HEAL_AMOUNT`].
///
/// Ties go to the lowest lane. Destroyed towers are never revived.
/// Returns the healed lane and its new HP.
pub fn heal_weakest(towers: &mut [Tower; 3]) -> Option<(Lane, u32)> {
    let lane = Lane::ALL
        .into_iter()
        .filter(|lane| !towers[lane.index()].is_destroyed())
        .min_by_key(|lane| towers[lane.index()].stats.hp)?;
    let tower = &mut towers[lane.index()];
    tower.stats.hp = tower.stats.hp.saturating_add(HEAL_AMOUNT);
    Some((lane, tower.stats.hp))
}
