//! Player commands: parsing and placement rules.
//!
//! Accepted input:
//!
//! ```text
//! summon <troop> <guard|king> <slot> <attack|defend>
//! end
//! ```
//!
//! Guard slots 1 and 2 map to lanes 1 and 2. The king lane takes `king 1`
//! to attack the enemy king and `king 0` to defend one's own.

use std::str::FromStr;

use crate::error::{CommandError, CommandResult};
use crate::game::{Lane, Mode, Player, StatProvider, TroopTemplate};

/// Highest slot number accepted by the parser.
const MAX_SLOT: u32 = 2;

/// Tower family a summon targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A guard tower lane.
    Guard,
    /// The king lane.
    King,
}

impl Target {
    fn parse(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("guard") {
            Some(Self::Guard)
        } else if word.eq_ignore_ascii_case("king") {
            Some(Self::King)
        } else {
            None
        }
    }
}

/// A parsed, not yet validated, `summon`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummonOrder {
    /// Troop name as typed.
    pub troop: String,
    /// Guard or king.
    pub target: Target,
    /// Slot number, 0..=2.
    pub slot: u8,
    /// Requested stance.
    pub mode: Mode,
}

/// A command issued by a player during their turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Place a troop.
    Summon(SummonOrder),
    /// Commit nothing this round.
    End,
}

impl Command {
    /// Tokenize and parse a line of player input.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Blank`] for whitespace-only input and a
    /// malformed-input error for anything else that does not parse.
    pub fn parse(input: &str) -> CommandResult<Self> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts.as_slice() {
            [] => Err(CommandError::Blank),
            [word] if word.eq_ignore_ascii_case("end") => Ok(Self::End),
            [word, args @ ..] if word.eq_ignore_ascii_case("summon") => {
                parse_summon(args).map(Self::Summon)
            }
            [word, ..] => Err(CommandError::UnknownCommand((*word).to_string())),
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_summon(args: &[&str]) -> CommandResult<SummonOrder> {
    let [troop, target, slot, mode] = args else {
        return Err(CommandError::Usage);
    };

    let slot_number: u32 = slot
        .parse()
        .map_err(|_| CommandError::InvalidSlot((*slot).to_string()))?;
    if slot_number > MAX_SLOT {
        return Err(CommandError::SlotOutOfRange(slot_number));
    }
    let slot = u8::try_from(slot_number).map_err(|_| CommandError::SlotOutOfRange(slot_number))?;

    let target =
        Target::parse(target).ok_or_else(|| CommandError::InvalidTarget((*target).to_string()))?;
    let mode = Mode::parse(mode).ok_or_else(|| CommandError::InvalidMode((*mode).to_string()))?;

    Ok(SummonOrder {
        troop: (*troop).to_string(),
        target,
        slot,
        mode,
    })
}

/// A summon that passed every check and may be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Base stats of the troop to create.
    pub template: TroopTemplate,
    /// Lane the troop joins.
    pub lane: Lane,
    /// Stance.
    pub mode: Mode,
}

/// Check a summon against the catalog, the player's mana and the lane rules.
///
/// Nothing is mutated; on success the caller applies the [`Placement`].
///
/// # Errors
///
/// Unknown troop, insufficient mana, or any lane rule violation.
pub fn validate_summon(
    order: &SummonOrder,
    stats: &dyn StatProvider,
    player: &Player,
    opponent: &Player,
) -> CommandResult<Placement> {
    let template = stats
        .troop(&order.troop)
        .ok_or_else(|| CommandError::UnknownTroop(order.troop.clone()))?;

    let cost = template.cost_for_level(player.level);
    if player.mana < cost {
        return Err(CommandError::NotEnoughMana {
            required: cost,
            available: player.mana,
        });
    }

    let lane = placement_lane(order, player, opponent)?;
    Ok(Placement {
        template,
        lane,
        mode: order.mode,
    })
}

/// Apply the lane-unlock rules and pick the lane.
///
/// # Errors
///
/// Returns the rule that blocks the placement.
pub(crate) fn placement_lane(order: &SummonOrder, player: &Player, opponent: &Player) -> CommandResult<Lane> {
    match order.target {
        Target::Guard => {
            let lane = Lane::from_guard_slot(order.slot).ok_or(CommandError::InvalidGuardSlot)?;
            match order.mode {
                Mode::Attack => {
                    if lane == Lane::Guard2 && !opponent.is_destroyed(Lane::Guard1) {
                        return Err(CommandError::LaneLocked);
                    }
                    if opponent.is_destroyed(lane) {
                        return Err(CommandError::TargetDestroyed(lane.number()));
                    }
                }
                Mode::Defend => {
                    if player.is_destroyed(lane) {
                        return Err(CommandError::OwnTowerDestroyed(lane.number()));
                    }
                }
            }
            Ok(lane)
        }
        Target::King => match (order.slot, order.mode) {
            (1, Mode::Attack) if !opponent.guards_down() => Err(CommandError::KingSealed),
            (0, Mode::Defend) if !player.guards_down() => Err(CommandError::KingNotExposed),
            (1, Mode::Attack) | (0, Mode::Defend) => Ok(Lane::King),
            _ => Err(CommandError::InvalidKingSlot),
        },
    }
}
