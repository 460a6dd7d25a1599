//! Player state management.

use crate::game::{Lane, LaneQueue, Tower, TowerTemplates, Troop};

/// Session slot of a player: 0 or 1.
pub type PlayerId = usize;

/// Mana cap.
pub const MAX_MANA: u32 = 10;

/// Mana gained by each player after every resolved round.
pub const MANA_REGEN: u32 = 2;

/// Mana each player starts a session with.
pub const STARTING_MANA: u32 = 5;

/// Experience needed to leave level 0. Each later level needs 10% more
/// than the previous one, unrounded; a player must reach the floor of it:
/// 100, 110, 121, 133, 146, 161, ...
const BASE_LEVEL_THRESHOLD: u128 = 100;

/// Fixed-point scale for thresholds, so the 1.1 growth is never rounded
/// between levels.
const THRESHOLD_SCALE: u128 = 1_000_000_000;

/// The other seat.
#[must_use]
pub const fn opponent(id: PlayerId) -> PlayerId {
    1 - id
}

/// Level reached with `experience` points on the accelerating threshold curve.
///
/// 0–99 XP is level 0, 100–209 is level 1, 210–330 is level 2, and so on.
#[must_use]
pub fn level_for_experience(experience: u32) -> u32 {
    let mut remaining = u128::from(experience);
    let mut required = BASE_LEVEL_THRESHOLD * THRESHOLD_SCALE;
    let mut level = 0;
    loop {
        let step = required / THRESHOLD_SCALE;
        if remaining < step {
            return level;
        }
        remaining -= step;
        required = required * 11 / 10;
        level += 1;
    }
}

/// State for a single player.
#[derive(Debug, Clone)]
pub struct Player {
    /// Seat in the session.
    pub id: PlayerId,
    /// Login name.
    pub username: String,
    /// Experience at session start.
    pub experience: u32,
    /// Level derived from experience.
    pub level: u32,
    /// Current mana, always within `0..=MAX_MANA`.
    pub mana: u32,
    lanes: [LaneQueue; 3],
    towers: [Tower; 3],
    destroyed: [bool; 3],
}

impl Player {
    /// Create a player with level-scaled towers.
    #[must_use]
    pub fn new(
        id: PlayerId,
        username: impl Into<String>,
        experience: u32,
        towers: &TowerTemplates,
        starting_mana: u32,
    ) -> Self {
        let level = level_for_experience(experience);
        Self {
            id,
            username: username.into(),
            experience,
            level,
            mana: starting_mana.min(MAX_MANA),
            lanes: Default::default(),
            towers: Tower::standard_set(towers, level),
            destroyed: [false; 3],
        }
    }

    /// Troop queue for a lane.
    #[must_use]
    pub fn lane(&self, lane: Lane) -> &LaneQueue {
        &self.lanes[lane.index()]
    }

    /// Mutable troop queue for a lane.
    pub fn lane_mut(&mut self, lane: Lane) -> &mut LaneQueue {
        &mut self.lanes[lane.index()]
    }

    /// The tower this player defends in a lane.
    #[must_use]
    pub fn tower(&self, lane: Lane) -> &Tower {
        &self.towers[lane.index()]
    }

    /// Mutable tower for a lane.
    pub fn tower_mut(&mut self, lane: Lane) -> &mut Tower {
        &mut self.towers[lane.index()]
    }

    /// All three towers, indexed by lane.
    #[must_use]
    pub fn towers(&self) -> &[Tower; 3] {
        &self.towers
    }

    /// Mutable access to all three towers.
    pub fn towers_mut(&mut self) -> &mut [Tower; 3] {
        &mut self.towers
    }

    /// Whether this player's tower in `lane` has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self, lane: Lane) -> bool {
        self.destroyed[lane.index()]
    }

    /// Record the loss of this player's tower in `lane`.
    pub fn mark_destroyed(&mut self, lane: Lane) {
        self.destroyed[lane.index()] = true;
    }

    /// Both guard towers are gone, exposing the king.
    #[must_use]
    pub fn guards_down(&self) -> bool {
        self.is_destroyed(Lane::Guard1) && self.is_destroyed(Lane::Guard2)
    }

    /// Number of towers lost so far.
    #[must_use]
    pub fn towers_lost(&self) -> usize {
        self.destroyed.iter().filter(|d| **d).count()
    }

    /// Debit mana. Returns `false` and leaves mana untouched if unaffordable.
    pub fn spend_mana(&mut self, cost: u32) -> bool {
        match self.mana.checked_sub(cost) {
            Some(left) => {
                self.mana = left;
                true
            }
            None => false,
        }
    }

    /// End-of-round mana regeneration, clamped to [`MAX_MANA`].
    pub fn regenerate_mana(&mut self) -> u32 {
        self.mana = self.mana.saturating_add(MANA_REGEN).min(MAX_MANA);
        self.mana
    }

    /// Iterate every queued troop across all lanes.
    pub fn troops(&self) -> impl Iterator<Item = &Troop> {
        self.lanes.iter().flat_map(LaneQueue::iter)
    }
}
