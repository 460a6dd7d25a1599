//! Lanes and per-lane troop queues.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::game::{Troop, TroopId};

/// Number of lanes per side.
pub const LANE_COUNT: usize = 3;

/// One of the three combat columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Lane {
    /// First guard tower lane (`guard 1`).
    Guard1,
    /// Second guard tower lane (`guard 2`), locked until guard 1 falls.
    Guard2,
    /// King tower lane.
    King,
}

impl Lane {
    /// All lanes in resolution order: guard lanes first, king last.
    pub const ALL: [Self; LANE_COUNT] = [Self::Guard1, Self::Guard2, Self::King];

    /// Array index of this lane (0, 1, 2).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Guard1 => 0,
            Self::Guard2 => 1,
            Self::King => 2,
        }
    }

    /// Human-facing lane number (1, 2, 3).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Guard1 => 1,
            Self::Guard2 => 2,
            Self::King => 3,
        }
    }

    /// Lane for a `guard <slot>` placement.
    #[must_use]
    pub const fn from_guard_slot(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(Self::Guard1),
            2 => Some(Self::Guard2),
            _ => None,
        }
    }

    /// Whether this is the king lane.
    #[must_use]
    pub const fn is_king(self) -> bool {
        matches!(self, Self::King)
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lane {}", self.number())
    }
}

/// Ordered troops of one player in one lane. The front is the oldest troop.
///
/// Pops from the front are O(1). Removal by [`TroopId`] is O(n) and matches
/// on identity, never on field values: two troops can be otherwise identical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneQueue {
    troops: VecDeque<Troop>,
}

impl LaneQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a troop at the back.
    pub fn push(&mut self, troop: Troop) {
        self.troops.push_back(troop);
    }

    /// The front troop, if any.
    #[must_use]
    pub fn front(&self) -> Option<&Troop> {
        self.troops.front()
    }

    /// Mutable front troop.
    pub fn front_mut(&mut self) -> Option<&mut Troop> {
        self.troops.front_mut()
    }

    /// Remove and return the front troop.
    pub fn pop_front(&mut self) -> Option<Troop> {
        self.troops.pop_front()
    }

    /// Look up a troop by identity.
    #[must_use]
    pub fn get(&self, id: TroopId) -> Option<&Troop> {
        self.troops.iter().find(|t| t.id == id)
    }

    /// Mutable lookup by identity.
    pub fn get_mut(&mut self, id: TroopId) -> Option<&mut Troop> {
        self.troops.iter_mut().find(|t| t.id == id)
    }

    /// Splice a troop out by identity, wherever it sits in the queue.
    pub fn remove(&mut self, id: TroopId) -> Option<Troop> {
        let pos = self.troops.iter().position(|t| t.id == id)?;
        self.troops.remove(pos)
    }

    /// Drop every troop.
    pub fn clear(&mut self) {
        self.troops.clear();
    }

    /// Number of queued troops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.troops.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.troops.is_empty()
    }

    /// Iterate front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Troop> {
        self.troops.iter()
    }
}
