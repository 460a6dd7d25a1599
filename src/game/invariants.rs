//! Session invariants - sanity checks that detect bugs.
//!
//! These should never trigger in a correctly implemented engine. They run
//! after every resolved round in debug builds.

use std::collections::HashSet;

use crate::game::{HasCombatStats, Lane, MAX_MANA, Session};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all session invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(session: &Session) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();

    for player in session.players() {
        if player.mana > MAX_MANA {
            violations.push(InvariantViolation {
                message: format!(
                    "Player {} has mana {} > max {MAX_MANA}",
                    player.username, player.mana
                ),
            });
        }

        for lane in Lane::ALL {
            let tower = player.tower(lane);
            if player.is_destroyed(lane) != tower.is_down() {
                violations.push(InvariantViolation {
                    message: format!(
                        "Player {} tower in {lane} has HP {} but destroyed flag {}",
                        player.username,
                        tower.hp(),
                        player.is_destroyed(lane)
                    ),
                });
            }

            for troop in player.lane(lane).iter() {
                if troop.is_down() {
                    violations.push(InvariantViolation {
                        message: format!(
                            "Dead troop {} ({:?}) still queued in {lane}",
                            troop.name, troop.id
                        ),
                    });
                }
                if troop.lane != lane || troop.owner != player.id {
                    violations.push(InvariantViolation {
                        message: format!(
                            "Troop {:?} filed under player {} {lane} but belongs to player {} {}",
                            troop.id, player.id, troop.owner, troop.lane
                        ),
                    });
                }
                if !seen.insert(troop.id) {
                    violations.push(InvariantViolation {
                        message: format!("Troop {:?} queued twice", troop.id),
                    });
                }
            }
        }
    }

    if !session.is_over() && (session.pending(0).is_some() && session.pending(1).is_some()) {
        violations.push(InvariantViolation {
            message: "Both commands pending after round resolution".to_string(),
        });
    }

    violations
}

/// Assert all session invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(session: &Session) {
    let violations = check_invariants(session);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Session invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_session: &Session) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::game::{FixedCrits, Lobby};

    fn create_valid_session() -> Session {
        let mut lobby = Lobby::new();
        lobby.join("alice", 0).unwrap();
        lobby.join("bob", 0).unwrap();
        lobby.start(Catalog::builtin(), FixedCrits(false)).unwrap()
    }

    #[test]
    fn test_valid_session_passes() {
        let mut session = create_valid_session();
        assert!(check_invariants(&session).is_empty());

        session.submit(0, "summon Knight guard 1 defend").unwrap();
        session.submit(1, "summon Pawn guard 2 defend").unwrap();
        let violations = check_invariants(&session);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_violation_display() {
        let v = InvariantViolation {
            message: "Troop TroopId(3) queued twice".into(),
        };
        assert_eq!(v.to_string(), "Invariant violation: Troop TroopId(3) queued twice");
    }
}
