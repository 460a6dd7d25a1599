//! Script command implementation: an offline, deterministic match.

use super::output::{JsonSummary, format_summary, render_event, render_rejection};
use super::{CliError, OutputFormat};
use lanewar::game::Lobby;
use lanewar::{Catalog, Event, MemoryPlayerStore, SeededCrits, Session};
use std::fs;
use std::path::PathBuf;

/// Flags for `script`.
#[derive(Debug)]
pub(crate) struct ScriptArgs {
    pub(crate) file: PathBuf,
    pub(crate) seed: Option<u64>,
    pub(crate) players: [(String, u32); 2],
    pub(crate) troops: Option<PathBuf>,
    pub(crate) towers: Option<PathBuf>,
    pub(crate) format: OutputFormat,
}

/// Execute the script command.
///
/// Every non-blank line not starting with `#` is submitted on behalf of
/// whoever holds the turn. Rejected lines are reported and skipped.
///
/// # Errors
///
/// Returns an error if the script or stat files cannot be read.
pub(crate) fn execute(args: &ScriptArgs) -> Result<(), CliError> {
    let script = fs::read_to_string(&args.file).map_err(|e| {
        CliError::new(format!("Failed to read {}: {e}", args.file.display()))
    })?;
    let catalog = Catalog::from_paths(args.troops.as_deref(), args.towers.as_deref())?;
    let crits = args.seed.map_or_else(SeededCrits::random, SeededCrits::new);
    let seed = crits.seed();

    let store = MemoryPlayerStore::new();
    let mut lobby = Lobby::new();
    for (name, exp) in &args.players {
        store.insert(name.as_str(), "", *exp);
        lobby.join(name.as_str(), *exp)?;
    }
    let mut session = lobby.start(catalog, crits)?;
    let format = args.format;

    print_events(&session, &session.opening_events(), format)?;

    for (index, raw) in script.lines().enumerate() {
        let command = raw.trim();
        if command.is_empty() || command.starts_with('#') {
            continue;
        }
        if session.is_over() {
            break;
        }
        let seat = session.current_turn();
        match session.submit(seat, command) {
            Ok(submission) => print_events(&session, &submission.events, format)?,
            Err(err) => println!(
                "{}",
                render_rejection(
                    index + 1,
                    &session.player(seat).username,
                    command,
                    &err,
                    format
                )?
            ),
        }
    }

    let closing = session.settle(&store);
    print_events(&session, &closing, format)?;

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_summary(&session, seed));
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&JsonSummary::from_session(&session, seed))?
            );
        }
    }
    Ok(())
}

fn print_events(session: &Session, events: &[Event], format: OutputFormat) -> Result<(), CliError> {
    for event in events {
        println!("{}", render_event(session, event, format)?);
    }
    Ok(())
}
