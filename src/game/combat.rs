//! Lane combat resolution.
//!
//! Each round every lane is resolved once, front troop against front troop,
//! and a surviving attacker then trades blows with the defending tower.
//!
//! # Damage rules
//!
//! - Troop vs troop: HP minus the other troop's ATK, no DEF.
//! - Troop vs tower: ATK, ×1.2 on a critical hit (chance set by the tower).
//!   DEF soaks damage first, the excess reaches HP.
//! - Tower vs troop: tower ATK minus troop DEF, never negative.
//!
//! All HP and DEF values floor at zero.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::game::{
    Event, HasCombatStats, Lane, Mode, Outcome, Player, PlayerId, Tower, Troop, TroopId,
};

/// Source of critical-hit rolls.
///
/// [`SeededCrits`] in play, [`FixedCrits`] in tests.
pub trait CritSource {
    /// Roll once; `true` with probability `chance`.
    fn is_critical(&mut self, chance: f64) -> bool;
}

/// Seeded ChaCha8 crit rolls. The same seed always yields the same match.
#[derive(Debug, Clone)]
pub struct SeededCrits {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededCrits {
    /// Create from a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create from a freshly drawn seed. Read it back with [`Self::seed`].
    #[must_use]
    pub fn random() -> Self {
        Self::new(rand::random())
    }

    /// The seed this source was built from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl CritSource for SeededCrits {
    fn is_critical(&mut self, chance: f64) -> bool {
        // Always draw so the stream position does not depend on tower stats.
        let roll = self.rng.gen_range(0.0..1.0);
        roll < chance
    }
}

/// Crit rolls that always (or never) land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCrits(pub bool);

impl CritSource for FixedCrits {
    fn is_critical(&mut self, _chance: f64) -> bool {
        self.0
    }
}

/// Result of one troop hitting a tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowerHit {
    /// Total damage dealt, after any critical multiplier.
    pub damage: u32,
    /// Whether the hit was critical.
    pub critical: bool,
    /// DEF before the hit.
    pub def_before: u32,
    /// DEF after the hit.
    pub def_after: u32,
    /// HP before the hit.
    pub hp_before: u32,
    /// HP after the hit.
    pub hp_after: u32,
}

impl TowerHit {
    /// Whether this hit brought the tower to zero HP.
    #[must_use]
    pub const fn destroyed(&self) -> bool {
        self.hp_after == 0 && self.hp_before > 0
    }
}

/// Apply `atk` to a tower: crit roll, then DEF absorbs before HP.
pub fn damage_tower(atk: u32, tower: &mut Tower, crits: &mut dyn CritSource) -> TowerHit {
    let critical = crits.is_critical(tower.crit);
    // ×1.2, floor-rounded
    let damage = if critical {
        atk.saturating_mul(6) / 5
    } else {
        atk
    };

    let def_before = tower.def();
    let hp_before = tower.hp();

    let absorbed = damage.min(def_before);
    tower.stats.def = def_before - absorbed;
    let hp_after = tower.take_damage(damage - absorbed);

    TowerHit {
        damage,
        critical,
        def_before,
        def_after: tower.stats.def,
        hp_before,
        hp_after,
    }
}

/// A tower's counter-attack: tower ATK minus troop DEF, never negative.
///
/// Returns the damage dealt.
pub fn tower_strikes_troop(tower: &Tower, troop: &mut Troop) -> u32 {
    let damage = tower.atk().saturating_sub(troop.def());
    troop.take_damage(damage);
    damage
}

/// Resolve one round of combat in `lane`.
///
/// Returns the match outcome if this lane's king tower fell.
pub fn resolve_lane(
    players: &mut [Player; 2],
    lane: Lane,
    crits: &mut dyn CritSource,
    events: &mut Vec<Event>,
) -> Option<Outcome> {
    let front = |p: &Player| p.lane(lane).front().map(|t| (t.id, t.atk()));

    match (front(&players[0]), front(&players[1])) {
        (Some(first), Some(second)) => duel(players, lane, [first, second], crits, events),
        (Some((id, _)), None) => advance(players, 0, lane, id, crits, events),
        (None, Some((id, _))) => advance(players, 1, lane, id, crits, events),
        (None, None) => None,
    }
}

/// Front troops exchange blows simultaneously.
fn duel(
    players: &mut [Player; 2],
    lane: Lane,
    fronts: [(TroopId, u32); 2],
    crits: &mut dyn CritSource,
    events: &mut Vec<Event>,
) -> Option<Outcome> {
    let [(id0, atk0), (id1, atk1)] = fronts;

    let dead0 = wound(&mut players[0], lane, id0, atk1) == 0;
    let dead1 = wound(&mut players[1], lane, id1, atk0) == 0;
    if dead0 {
        bury(&mut players[0], lane, id0, events);
    }
    if dead1 {
        bury(&mut players[1], lane, id1, events);
    }

    let (winner, winner_troop, loser_atk) = match (dead0, dead1) {
        (false, true) => (0, id0, atk1),
        (true, false) => (1, id1, atk0),
        // Both fell, or both still stand: nothing reaches the towers.
        _ => return None,
    };

    // The fallen troop's parting blow.
    if wound(&mut players[winner], lane, winner_troop, loser_atk) == 0 {
        bury(&mut players[winner], lane, winner_troop, events);
        return None;
    }

    advance(players, winner, lane, winner_troop, crits, events)
}

/// An attack-mode troop strikes the opposing tower; defenders hold.
fn advance(
    players: &mut [Player; 2],
    attacker: PlayerId,
    lane: Lane,
    troop: TroopId,
    crits: &mut dyn CritSource,
    events: &mut Vec<Event>,
) -> Option<Outcome> {
    let attacking = players[attacker]
        .lane(lane)
        .get(troop)
        .is_some_and(|t| t.mode == Mode::Attack);
    if !attacking {
        return None;
    }
    assault(players, attacker, lane, troop, crits, events)
}

/// Troop hits tower, tower hits back.
fn assault(
    players: &mut [Player; 2],
    attacker_id: PlayerId,
    lane: Lane,
    troop_id: TroopId,
    crits: &mut dyn CritSource,
    events: &mut Vec<Event>,
) -> Option<Outcome> {
    let (attacker, defender) = split_pair(players, attacker_id);

    if lane == Lane::Guard2 && !defender.is_destroyed(Lane::Guard1) {
        debug!(player = %attacker.username, %lane, "guard tower 2 still locked, attack skipped");
        return None;
    }
    if defender.tower(lane).is_destroyed() {
        return None;
    }

    let (troop_name, atk) = {
        let troop = attacker.lane(lane).get(troop_id)?;
        (troop.name.clone(), troop.atk())
    };

    let hit = damage_tower(atk, defender.tower_mut(lane), crits);
    if hit.critical {
        info!(player = %attacker.username, troop = %troop_name, %lane, damage = hit.damage, "critical hit");
    }
    events.push(Event::TowerStruck {
        attacker: attacker.username.clone(),
        troop: troop_name,
        lane,
        critical: hit.critical,
        def_before: hit.def_before,
        def_after: hit.def_after,
        hp_before: hit.hp_before,
        hp_after: hit.hp_after,
    });

    if hit.destroyed() {
        defender.mark_destroyed(lane);
        info!(owner = %defender.username, %lane, "tower destroyed");
        events.push(Event::TowerDestroyed {
            owner: defender.username.clone(),
            lane,
        });
        if lane.is_king() {
            return Some(Outcome {
                winner: attacker.id,
                loser: defender.id,
            });
        }
        attacker.lane_mut(lane).clear();
        defender.lane_mut(lane).clear();
        events.push(Event::LaneCleared { lane });
        return None;
    }

    let tower = defender.tower(lane);
    let retaliation = attacker.lane_mut(lane).get_mut(troop_id).map(|troop| {
        let damage = tower_strikes_troop(tower, troop);
        (damage, troop.hp(), troop.name.clone())
    });
    if let Some((damage, hp, name)) = retaliation {
        events.push(Event::TowerRetaliated {
            owner: attacker.username.clone(),
            troop: name,
            lane,
            damage,
            hp,
        });
        if hp == 0 {
            bury(attacker, lane, troop_id, events);
        }
    }
    None
}

/// Damage a queued troop by identity. Returns its HP afterwards.
fn wound(player: &mut Player, lane: Lane, troop: TroopId, amount: u32) -> u32 {
    player
        .lane_mut(lane)
        .get_mut(troop)
        .map_or(0, |t| t.take_damage(amount))
}

/// Remove a fallen troop from its queue and announce it.
fn bury(player: &mut Player, lane: Lane, troop: TroopId, events: &mut Vec<Event>) {
    if let Some(fallen) = player.lane_mut(lane).remove(troop) {
        debug!(owner = %player.username, troop = %fallen.name, %lane, "troop defeated");
        events.push(Event::TroopDefeated {
            owner: player.username.clone(),
            troop: fallen.name,
            lane,
        });
    }
}

/// Borrow both players mutably, `first` in the first position.
fn split_pair(players: &mut [Player; 2], first: PlayerId) -> (&mut Player, &mut Player) {
    let [a, b] = players;
    if first == 0 { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::game::{CombatStats, StatProvider, TroopTemplate, STARTING_MANA};

    fn players() -> [Player; 2] {
        let towers = Catalog::builtin().towers();
        [
            Player::new(0, "alice", 0, &towers, STARTING_MANA),
            Player::new(1, "bob", 0, &towers, STARTING_MANA),
        ]
    }

    fn place(player: &mut Player, id: u64, lane: Lane, mode: Mode, hp: u32, atk: u32, def: u32) {
        let template = TroopTemplate::new("Grunt", CombatStats::new(hp, atk, def), 1);
        let owner = player.id;
        player
            .lane_mut(lane)
            .push(Troop::summon(TroopId(id), &template, owner, 0, lane, mode));
    }

    fn resolve(players: &mut [Player; 2], lane: Lane) -> (Option<Outcome>, Vec<Event>) {
        let mut events = Vec::new();
        let outcome = resolve_lane(players, lane, &mut FixedCrits(false), &mut events);
        (outcome, events)
    }

    #[test]
    fn test_seeded_crits_are_reproducible() {
        let mut a = SeededCrits::new(99);
        let mut b = SeededCrits::new(99);
        for _ in 0..100 {
            assert_eq!(a.is_critical(0.5), b.is_critical(0.5));
        }
        assert!(!SeededCrits::new(1).is_critical(0.0));
        assert!(SeededCrits::new(1).is_critical(1.0));
    }

    #[test]
    fn test_def_absorbs_before_hp() {
        let mut p = players();
        let tower = p[1].tower_mut(Lane::Guard1);
        let hit = damage_tower(50, tower, &mut FixedCrits(false));
        assert_eq!((hit.def_after, hit.hp_after), (50, 1000));

        let hit = damage_tower(80, tower, &mut FixedCrits(false));
        assert_eq!((hit.def_before, hit.def_after), (50, 0));
        assert_eq!(hit.hp_after, 970);

        let hit = damage_tower(80, tower, &mut FixedCrits(false));
        assert_eq!((hit.def_after, hit.hp_after), (0, 890));
    }

    #[test]
    fn test_critical_hit_multiplies_damage() {
        let mut p = players();
        let tower = p[1].tower_mut(Lane::Guard1);
        let hit = damage_tower(100, tower, &mut FixedCrits(true));
        assert!(hit.critical);
        assert_eq!(hit.damage, 120);
        assert_eq!((hit.def_after, hit.hp_after), (0, 980));
    }

    #[test]
    fn test_tower_hp_floors_at_zero() {
        let mut p = players();
        let tower = p[1].tower_mut(Lane::Guard1);
        tower.stats = CombatStats::new(10, 300, 0);
        let hit = damage_tower(500, tower, &mut FixedCrits(false));
        assert_eq!(hit.hp_after, 0);
        assert!(hit.destroyed());
    }

    #[test]
    fn test_tower_retaliation_respects_troop_def() {
        let p = players();
        let template = TroopTemplate::new("Rook", CombatStats::new(250, 200, 200), 5);
        let mut troop = Troop::summon(TroopId(1), &template, 0, 0, Lane::Guard1, Mode::Attack);
        assert_eq!(tower_strikes_troop(p[1].tower(Lane::Guard1), &mut troop), 100);
        assert_eq!(troop.hp(), 150);

        let template = TroopTemplate::new("Wall", CombatStats::new(250, 0, 900), 5);
        let mut troop = Troop::summon(TroopId(2), &template, 0, 0, Lane::Guard1, Mode::Attack);
        assert_eq!(tower_strikes_troop(p[1].tower(Lane::Guard1), &mut troop), 0);
        assert_eq!(troop.hp(), 250);
    }

    #[test]
    fn test_front_troops_both_survive() {
        let mut p = players();
        place(&mut p[0], 1, Lane::Guard1, Mode::Attack, 30, 40, 0);
        place(&mut p[1], 2, Lane::Guard1, Mode::Attack, 50, 20, 0);

        let (outcome, events) = resolve(&mut p, Lane::Guard1);
        assert!(outcome.is_none());
        assert_eq!(p[0].lane(Lane::Guard1).front().map(Troop::hp), Some(10));
        assert_eq!(p[1].lane(Lane::Guard1).front().map(Troop::hp), Some(10));
        assert!(events.is_empty());
        assert_eq!(p[0].tower(Lane::Guard1).stats, CombatStats::new(1000, 300, 100));
        assert_eq!(p[1].tower(Lane::Guard1).stats, CombatStats::new(1000, 300, 100));
    }

    #[test]
    fn test_both_front_troops_die() {
        let mut p = players();
        place(&mut p[0], 1, Lane::Guard1, Mode::Attack, 20, 50, 0);
        place(&mut p[1], 2, Lane::Guard1, Mode::Attack, 20, 50, 0);

        let (_, events) = resolve(&mut p, Lane::Guard1);
        assert!(p[0].lane(Lane::Guard1).is_empty());
        assert!(p[1].lane(Lane::Guard1).is_empty());
        let defeats = events
            .iter()
            .filter(|e| matches!(e, Event::TroopDefeated { .. }))
            .count();
        assert_eq!(defeats, 2);
    }

    #[test]
    fn test_survivor_takes_counter_attack_then_strikes() {
        let mut p = players();
        place(&mut p[0], 1, Lane::Guard1, Mode::Attack, 100, 50, 0);
        place(&mut p[1], 2, Lane::Guard1, Mode::Attack, 40, 20, 0);

        let (_, events) = resolve(&mut p, Lane::Guard1);
        assert!(p[1].lane(Lane::Guard1).is_empty());
        // 100 - 20 exchange - 20 counter, then tower 300 - 0 DEF kills it.
        assert!(p[0].lane(Lane::Guard1).is_empty());
        assert_eq!(p[1].tower(Lane::Guard1).stats.def, 50);
        assert!(events.iter().any(|e| matches!(e, Event::TowerRetaliated { damage: 300, .. })));
    }

    #[test]
    fn test_counter_attack_can_kill_survivor() {
        let mut p = players();
        place(&mut p[0], 1, Lane::Guard1, Mode::Attack, 30, 50, 0);
        place(&mut p[1], 2, Lane::Guard1, Mode::Attack, 40, 20, 0);

        let (_, events) = resolve(&mut p, Lane::Guard1);
        assert!(p[0].lane(Lane::Guard1).is_empty());
        assert!(p[1].lane(Lane::Guard1).is_empty());
        assert_eq!(p[1].tower(Lane::Guard1).stats.def, 100);
        assert!(!events.iter().any(|e| matches!(e, Event::TowerStruck { .. })));
    }

    #[test]
    fn test_defending_winner_does_not_strike() {
        let mut p = players();
        place(&mut p[0], 1, Lane::Guard1, Mode::Defend, 500, 50, 0);
        place(&mut p[1], 2, Lane::Guard1, Mode::Attack, 40, 20, 0);

        resolve(&mut p, Lane::Guard1);
        assert_eq!(p[0].lane(Lane::Guard1).front().map(Troop::hp), Some(460));
        assert_eq!(p[1].tower(Lane::Guard1).stats.def, 100);
    }

    #[test]
    fn test_lone_defender_holds() {
        let mut p = players();
        place(&mut p[0], 1, Lane::Guard1, Mode::Defend, 100, 500, 0);
        let (_, events) = resolve(&mut p, Lane::Guard1);
        assert!(events.is_empty());
        assert_eq!(p[1].tower(Lane::Guard1).stats.hp, 1000);
        assert_eq!(p[0].lane(Lane::Guard1).front().map(Troop::hp), Some(100));
    }

    #[test]
    fn test_lone_attacker_hits_tower_and_takes_retaliation() {
        let mut p = players();
        place(&mut p[1], 1, Lane::Guard1, Mode::Attack, 400, 150, 100);

        resolve(&mut p, Lane::Guard1);
        let tower = p[0].tower(Lane::Guard1);
        assert_eq!((tower.stats.def, tower.stats.hp), (0, 950));
        assert_eq!(p[1].lane(Lane::Guard1).front().map(Troop::hp), Some(200));
    }

    #[test]
    fn test_retaliation_removes_by_identity() {
        let mut p = players();
        place(&mut p[0], 1, Lane::Guard1, Mode::Attack, 10, 50, 0);
        place(&mut p[0], 2, Lane::Guard1, Mode::Attack, 10, 50, 0);

        resolve(&mut p, Lane::Guard1);
        let ids: Vec<_> = p[0].lane(Lane::Guard1).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TroopId(2)]);
    }

    #[test]
    fn test_guard_tower_destruction_clears_lane() {
        let mut p = players();
        p[1].tower_mut(Lane::Guard1).stats = CombatStats::new(30, 300, 0);
        place(&mut p[0], 1, Lane::Guard1, Mode::Attack, 100, 50, 0);
        place(&mut p[0], 2, Lane::Guard1, Mode::Attack, 100, 50, 0);

        let (outcome, events) = resolve(&mut p, Lane::Guard1);
        assert!(outcome.is_none());
        assert!(p[1].is_destroyed(Lane::Guard1));
        assert!(!p[0].is_destroyed(Lane::Guard1));
        assert!(p[0].lane(Lane::Guard1).is_empty());
        assert!(p[1].lane(Lane::Guard1).is_empty());
        assert!(events.contains(&Event::LaneCleared { lane: Lane::Guard1 }));
    }

    #[test]
    fn test_guard2_locked_while_guard1_stands() {
        let mut p = players();
        place(&mut p[0], 1, Lane::Guard2, Mode::Attack, 100, 500, 0);
        let (_, events) = resolve(&mut p, Lane::Guard2);
        assert!(events.is_empty());
        assert_eq!(p[1].tower(Lane::Guard2).stats.hp, 1000);

        p[1].tower_mut(Lane::Guard1).stats.hp = 0;
        p[1].mark_destroyed(Lane::Guard1);
        resolve(&mut p, Lane::Guard2);
        assert!(p[1].tower(Lane::Guard2).stats.hp < 1000);
    }

    #[test]
    fn test_king_destruction_ends_match() {
        let mut p = players();
        p[0].tower_mut(Lane::King).stats = CombatStats::new(50, 500, 0);
        place(&mut p[1], 1, Lane::King, Mode::Attack, 100, 60, 0);

        let (outcome, events) = resolve(&mut p, Lane::King);
        assert_eq!(outcome, Some(Outcome { winner: 1, loser: 0 }));
        assert!(p[0].is_destroyed(Lane::King));
        assert!(!events.iter().any(|e| matches!(e, Event::TowerRetaliated { .. })));
    }

    #[test]
    fn test_empty_lane_is_noop() {
        let mut p = players();
        let (outcome, events) = resolve(&mut p, Lane::King);
        assert!(outcome.is_none());
        assert!(events.is_empty());
    }
}
