//! Property-based tests for the match engine.
//!
//! Random command streams are played against a session and the engine's
//! invariants are checked after every submission.
//! Run with: cargo test --release prop_engine

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use lanewar::game::{
    CombatStats, FixedCrits, HasCombatStats, Lane, Lobby, MAX_MANA, SeededCrits, Tower, TowerKind,
    damage_tower, invariants::check_invariants,
};
use lanewar::{Catalog, Session, StatProvider};

const TROOPS: [&str; 7] = ["Pawn", "Bishop", "Rook", "Knight", "Prince", "Queen", "Dragon"];

fn command() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just("end".to_string()),
        1 => Just(String::new()),
        6 => (
            0..TROOPS.len(),
            prop::bool::ANY,
            0u8..4,
            prop::bool::ANY,
        )
            .prop_map(|(troop, king, slot, attack)| {
                format!(
                    "summon {} {} {slot} {}",
                    TROOPS[troop],
                    if king { "king" } else { "guard" },
                    if attack { "attack" } else { "defend" },
                )
            }),
    ]
}

fn session(seed: u64, exp: (u32, u32)) -> Session {
    let mut lobby = Lobby::new();
    lobby.join("alice", exp.0).unwrap();
    lobby.join("bob", exp.1).unwrap();
    lobby.start(Catalog::builtin(), SeededCrits::new(seed)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Invariants hold and turns flip only on accepted commands.
    #[test]
    fn prop_random_matches_keep_invariants(
        seed in any::<u64>(),
        exp in (0u32..2_000, 0u32..2_000),
        commands in prop::collection::vec(command(), 1..300)
    ) {
        let mut s = session(seed, exp);

        for input in &commands {
            if s.is_over() {
                break;
            }
            let turn = s.current_turn();
            let mana_before = s.player(turn).mana;
            let rounds_before = s.rounds();

            match s.submit(turn, input) {
                Ok(sub) => {
                    prop_assert_ne!(s.current_turn(), turn);
                    prop_assert_eq!(sub.round_resolved, s.rounds() == rounds_before + 1);
                    if !sub.round_resolved {
                        prop_assert!(s.pending(turn).is_some());
                    }
                }
                Err(_) => {
                    prop_assert_eq!(s.current_turn(), turn);
                    prop_assert_eq!(s.player(turn).mana, mana_before);
                    prop_assert_eq!(s.rounds(), rounds_before);
                }
            }

            for player in s.players() {
                prop_assert!(player.mana <= MAX_MANA);
                for lane in Lane::ALL {
                    prop_assert!(player.lane(lane).iter().all(|t| t.hp() > 0));
                }
            }
            let violations = check_invariants(&s);
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }

    /// Input from the seat not holding the turn never changes anything.
    #[test]
    fn prop_out_of_turn_input_rejected(
        commands in prop::collection::vec(command(), 1..50)
    ) {
        let mut s = session(7, (0, 0));
        for input in &commands {
            let idle = 1 - s.current_turn();
            prop_assert!(s.submit(idle, input).is_err());
            prop_assert_eq!(s.current_turn(), 1 - idle);
            prop_assert!(s.pending(idle).is_none() || s.pending(1 - idle).is_none());
        }
    }

    /// DEF soaks damage before HP and neither drops below zero.
    #[test]
    fn prop_def_absorbs_before_hp(
        hp in 0u32..5_000,
        def in 0u32..1_000,
        atk in 0u32..5_000,
        critical in prop::bool::ANY
    ) {
        let templates = Catalog::builtin().towers();
        let mut tower = Tower::from_template(TowerKind::Guard, &templates.guard, 0);
        tower.stats = CombatStats::new(hp, 300, def);

        let hit = damage_tower(atk, &mut tower, &mut FixedCrits(critical));
        let damage = if critical { atk * 6 / 5 } else { atk };

        prop_assert_eq!(hit.damage, damage);
        prop_assert_eq!(hit.def_after, def.saturating_sub(damage));
        let overflow = damage.saturating_sub(def);
        prop_assert_eq!(hit.hp_after, hp.saturating_sub(overflow));
        if damage <= def {
            prop_assert_eq!(tower.hp(), hp);
        }
    }
}
