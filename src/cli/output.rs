//! Output formatting utilities for CLI.

use lanewar::game::{Audience, Event, HasCombatStats, Lane, TroopTemplate};
use lanewar::{Catalog, CommandError, Session};
use serde::Serialize;
use std::fmt::Write as _;

use super::OutputFormat;

/// JSON-serializable command rejection.
#[derive(Debug, Serialize)]
pub(super) struct JsonRejection<'a> {
    /// Always `"rejected"`, matching the `event` tag of [`Event`].
    pub(super) event: &'static str,
    /// Script line number.
    pub(super) line: usize,
    /// Player whose command was refused.
    pub(super) player: &'a str,
    /// The command as written.
    pub(super) command: &'a str,
    /// Rejection message.
    pub(super) error: String,
}

/// JSON-serializable tower state.
#[derive(Debug, Serialize)]
pub(super) struct JsonTower {
    pub(super) lane: Lane,
    pub(super) hp: u32,
    pub(super) def: u32,
    pub(super) destroyed: bool,
}

/// JSON-serializable player state.
#[derive(Debug, Serialize)]
pub(super) struct JsonPlayer {
    pub(super) name: String,
    pub(super) level: u32,
    pub(super) mana: u32,
    pub(super) towers: Vec<JsonTower>,
    pub(super) troops: usize,
}

/// JSON-serializable match summary.
#[derive(Debug, Serialize)]
pub(super) struct JsonSummary {
    /// Always `"summary"`.
    pub(super) event: &'static str,
    /// Crit seed.
    pub(super) seed: u64,
    /// Resolved rounds.
    pub(super) rounds: u32,
    /// Winner's name (null while unfinished).
    pub(super) winner: Option<String>,
    /// Per-player state.
    pub(super) players: Vec<JsonPlayer>,
}

impl JsonSummary {
    /// Create from a session.
    pub(super) fn from_session(session: &Session, seed: u64) -> Self {
        Self {
            event: "summary",
            seed,
            rounds: session.rounds(),
            winner: session
                .outcome()
                .map(|o| session.player(o.winner).username.clone()),
            players: session
                .players()
                .iter()
                .map(|p| JsonPlayer {
                    name: p.username.clone(),
                    level: p.level,
                    mana: p.mana,
                    towers: Lane::ALL
                        .iter()
                        .map(|&lane| JsonTower {
                            lane,
                            hp: p.tower(lane).hp(),
                            def: p.tower(lane).def(),
                            destroyed: p.is_destroyed(lane),
                        })
                        .collect(),
                    troops: p.troops().count(),
                })
                .collect(),
        }
    }
}

/// Render one event.
pub(super) fn render_event(
    session: &Session,
    event: &Event,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string(event),
        OutputFormat::Text => Ok(match event.audience() {
            Audience::Everyone => event.to_string(),
            Audience::Player(seat) => format!("[{}] {event}", session.player(seat).username),
        }),
    }
}

/// Render a rejected script line.
pub(super) fn render_rejection(
    line: usize,
    player: &str,
    command: &str,
    error: &CommandError,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string(&JsonRejection {
            event: "rejected",
            line,
            player,
            command,
            error: error.to_string(),
        }),
        OutputFormat::Text => Ok(format!("line {line}: {player}: `{command}` rejected: {error}")),
    }
}

/// Format the final board as human-readable text.
pub(super) fn format_summary(session: &Session, seed: u64) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Match Summary (seed: {seed})");
    match session.outcome() {
        Some(outcome) => {
            let _ = writeln!(output, "  Winner: {}", session.player(outcome.winner).username);
        }
        None => output.push_str("  Winner: none (unfinished)\n"),
    }
    let _ = writeln!(output, "  Rounds: {}\n", session.rounds());

    for player in session.players() {
        let _ = writeln!(
            output,
            "  {} (level {}, mana {})",
            player.username, player.level, player.mana
        );
        for lane in Lane::ALL {
            let tower = player.tower(lane);
            let state = if player.is_destroyed(lane) {
                "destroyed".to_string()
            } else {
                format!("HP {} DEF {}", tower.hp(), tower.def())
            };
            let queued = player.lane(lane).len();
            let _ = writeln!(output, "    {lane}: {state}, {queued} troop(s) queued");
        }
    }

    output
}

/// JSON-serializable catalog.
#[derive(Debug, Serialize)]
pub(super) struct JsonCatalog<'a> {
    pub(super) troops: Vec<&'a TroopTemplate>,
    pub(super) guard_tower: &'a lanewar::game::TowerTemplate,
    pub(super) king_tower: &'a lanewar::game::TowerTemplate,
}

impl<'a> JsonCatalog<'a> {
    /// Create from a catalog.
    pub(super) fn from_catalog(catalog: &'a Catalog) -> Self {
        Self {
            troops: catalog.troops(),
            guard_tower: &catalog.tower_templates().guard,
            king_tower: &catalog.tower_templates().king,
        }
    }
}

/// Format the roster as a text table.
pub(super) fn format_catalog(catalog: &Catalog) -> String {
    let mut output = String::new();

    output.push_str("Troops\n");
    let _ = writeln!(
        output,
        "  {:<10} {:>5} {:>5} {:>5} {:>5}  Special",
        "Name", "HP", "ATK", "DEF", "Mana"
    );
    for troop in catalog.troops() {
        let special = troop.special.map_or("-", |_| "heal");
        let _ = writeln!(
            output,
            "  {:<10} {:>5} {:>5} {:>5} {:>5}  {special}",
            troop.name, troop.stats.hp, troop.stats.atk, troop.stats.def, troop.mana
        );
    }

    output.push_str("\nTowers\n");
    let towers = catalog.tower_templates();
    for tower in [&towers.guard, &towers.king] {
        let _ = writeln!(
            output,
            "  {:<10} HP {:>5} ATK {:>4} DEF {:>4} CRIT {:>3.0}%",
            tower.name,
            tower.stats.hp,
            tower.stats.atk,
            tower.stats.def,
            tower.crit * 100.0
        );
    }

    output
}
