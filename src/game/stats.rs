//! Combat stats shared by troops and towers, and level scaling.
//!
//! Scaling is applied exactly once per entity: towers when a session starts
//! (from the owning player's level), troops when they are summoned (from the
//! summoner's level). The multiplier is `1 + 0.1 × level`, computed in
//! integer tenths so results are exact and floor-rounded.

use serde::{Deserialize, Serialize};

/// Hit points, attack and defence.
///
/// Field names follow the stat data files (`HP`, `ATK`, `DEF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatStats {
    /// Hit points. Never negative; zero means dead or destroyed.
    #[serde(rename = "HP")]
    pub hp: u32,
    /// Attack.
    #[serde(rename = "ATK")]
    pub atk: u32,
    /// Defence.
    #[serde(rename = "DEF")]
    pub def: u32,
}

impl CombatStats {
    /// Create a stat block.
    #[must_use]
    pub const fn new(hp: u32, atk: u32, def: u32) -> Self {
        Self { hp, atk, def }
    }
}

/// Anything that fights: troops and towers.
pub trait HasCombatStats {
    /// Read the stat block.
    fn combat(&self) -> &CombatStats;

    /// Mutable access to the stat block.
    fn combat_mut(&mut self) -> &mut CombatStats;

    /// Current hit points.
    fn hp(&self) -> u32 {
        self.combat().hp
    }

    /// Attack value.
    fn atk(&self) -> u32 {
        self.combat().atk
    }

    /// Defence value.
    fn def(&self) -> u32 {
        self.combat().def
    }

    /// Whether hit points have reached zero.
    fn is_down(&self) -> bool {
        self.combat().hp == 0
    }

    /// Subtract `amount` from HP, flooring at zero. Returns the HP left.
    fn take_damage(&mut self, amount: u32) -> u32 {
        let stats = self.combat_mut();
        stats.hp = stats.hp.saturating_sub(amount);
        stats.hp
    }
}

/// Level multiplier in tenths: level 0 → 10 (×1.0), level 3 → 13 (×1.3).
const fn level_multiplier_tenths(level: u32) -> u64 {
    10 + level as u64
}

/// Scale a single stat by the level multiplier, floor-rounded.
#[must_use]
pub fn scale_value(value: u32, level: u32) -> u32 {
    let scaled = u64::from(value) * level_multiplier_tenths(level) / 10;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Scale HP, ATK and DEF of any combatant for the given level.
pub fn scale_for_level<T: HasCombatStats + ?Sized>(entity: &mut T, level: u32) {
    let stats = entity.combat_mut();
    stats.hp = scale_value(stats.hp, level);
    stats.atk = scale_value(stats.atk, level);
    stats.def = scale_value(stats.def, level);
}

/// Special abilities a troop may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Special {
    /// On summon, heal the owner's weakest standing tower.
    Heal,
}

/// Base troop stats as supplied by the stat provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroopTemplate {
    /// Troop name, as typed in `summon` commands.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Base combat stats.
    #[serde(flatten)]
    pub stats: CombatStats,
    /// Base mana cost, scaled by the summoner's level.
    #[serde(rename = "Mana")]
    pub mana: u32,
    /// Experience value.
    #[serde(rename = "EXP", default)]
    pub exp: u32,
    /// Optional special ability.
    #[serde(rename = "Special", default, with = "special_field")]
    pub special: Option<Special>,
}

impl TroopTemplate {
    /// Create a plain troop template with no special.
    #[must_use]
    pub fn new(name: impl Into<String>, stats: CombatStats, mana: u32) -> Self {
        Self {
            name: name.into(),
            stats,
            mana,
            exp: 0,
            special: None,
        }
    }

    /// Mana a player of `level` pays for this troop.
    #[must_use]
    pub fn cost_for_level(&self, level: u32) -> u32 {
        scale_value(self.mana, level)
    }

    /// Attach a special ability.
    #[must_use]
    pub fn with_special(mut self, special: Special) -> Self {
        self.special = Some(special);
        self
    }
}

/// Base tower stats as supplied by the stat provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerTemplate {
    /// Tower name.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Base combat stats.
    #[serde(flatten)]
    pub stats: CombatStats,
    /// Probability in `[0, 1]` that a hit on this tower is critical.
    #[serde(rename = "CRIT", default)]
    pub crit: f64,
    /// Experience value.
    #[serde(rename = "EXPValue", default)]
    pub exp_value: u32,
}

/// The two tower templates every session is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct TowerTemplates {
    /// Template for both guard towers.
    pub guard: TowerTemplate,
    /// Template for the king tower.
    pub king: TowerTemplate,
}

/// Lookup contract for base stats.
///
/// Must be ready before a session starts. An unknown troop name is a
/// command rejection, not an error.
pub trait StatProvider {
    /// Base stats for a troop, if the name is known.
    fn troop(&self, name: &str) -> Option<TroopTemplate>;

    /// Base stats for guard and king towers.
    fn towers(&self) -> TowerTemplates;
}

/// Data files write "no special" as an empty string.
mod special_field {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Special;

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S: Serializer>(
        special: &Option<Special>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match special {
            Some(Special::Heal) => serializer.serialize_str("heal"),
            None => serializer.serialize_str(""),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Special>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(None),
            "heal" => Ok(Some(Special::Heal)),
            other => Err(serde::de::Error::unknown_variant(other, &["heal"])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(CombatStats);

    impl HasCombatStats for Dummy {
        fn combat(&self) -> &CombatStats {
            &self.0
        }

        fn combat_mut(&mut self) -> &mut CombatStats {
            &mut self.0
        }
    }

    #[test]
    fn test_level_zero_is_identity() {
        let mut d = Dummy(CombatStats::new(1000, 300, 100));
        scale_for_level(&mut d, 0);
        assert_eq!(d.0, CombatStats::new(1000, 300, 100));
    }

    #[test]
    fn test_scaling_is_monotonic() {
        let mut previous = 0;
        for level in 0..20 {
            let value = scale_value(250, level);
            assert!(value >= previous);
            previous = value;
        }
        assert_eq!(scale_value(250, 3), 325);
        assert_eq!(scale_value(55, 1), 60); // 60.5 floors
    }

    #[test]
    fn test_cost_scales_with_level() {
        let pawn = TroopTemplate::new("Pawn", CombatStats::new(50, 150, 100), 3);
        assert_eq!(pawn.cost_for_level(0), 3);
        assert_eq!(pawn.cost_for_level(3), 3); // 3.9 floors
        assert_eq!(pawn.cost_for_level(5), 4);
    }

    #[test]
    fn test_take_damage_floors_at_zero() {
        let mut d = Dummy(CombatStats::new(30, 10, 0));
        assert_eq!(d.take_damage(20), 10);
        assert_eq!(d.take_damage(50), 0);
        assert!(d.is_down());
    }

    #[test]
    fn test_template_parses_data_file_format() {
        let json = r#"{"Name":"Queen","HP":50,"ATK":0,"DEF":0,"Mana":5,"EXP":30,"Special":"heal"}"#;
        let t: TroopTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(t.stats, CombatStats::new(50, 0, 0));
        assert_eq!(t.special, Some(Special::Heal));

        let json = r#"{"Name":"Pawn","HP":50,"ATK":150,"DEF":100,"Mana":3,"Special":""}"#;
        let t: TroopTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(t.special, None);
        assert_eq!(t.exp, 0);
    }
}
