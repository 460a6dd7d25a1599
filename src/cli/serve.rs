//! Serve command implementation.

use super::CliError;
use lanewar::{Catalog, JsonPlayerStore, Server, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Flags for `serve`; each one overrides the config file.
#[derive(Debug)]
pub(crate) struct ServeArgs {
    pub(crate) config: Option<PathBuf>,
    pub(crate) bind: Option<SocketAddr>,
    pub(crate) players: Option<PathBuf>,
    pub(crate) troops: Option<PathBuf>,
    pub(crate) towers: Option<PathBuf>,
    pub(crate) turn_timeout: Option<u64>,
    pub(crate) seed: Option<u64>,
}

impl ServeArgs {
    fn resolve(&self) -> Result<ServerConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(players) = &self.players {
            config.players.clone_from(players);
        }
        if self.troops.is_some() {
            config.troops.clone_from(&self.troops);
        }
        if self.towers.is_some() {
            config.towers.clone_from(&self.towers);
        }
        if let Some(secs) = self.turn_timeout {
            config.turn_timeout_secs = secs;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

/// Execute the serve command.
///
/// # Errors
///
/// Returns an error if the config or stat files cannot be loaded, or the
/// server cannot listen.
pub(crate) fn execute(args: &ServeArgs) -> Result<(), CliError> {
    let config = args.resolve()?;
    let catalog = Catalog::from_paths(config.troops.as_deref(), config.towers.as_deref())?;
    let store = Arc::new(JsonPlayerStore::new(&config.players));

    println!("Server listening on {}", config.bind);
    let server = Server::new(&config, store, catalog);
    let report = server.run(config.bind)?;

    match report.outcome {
        Some(outcome) => println!(
            "Match finished after {} rounds: seat {} won (seed {}).",
            report.rounds,
            outcome.winner + 1,
            report.seed
        ),
        None => println!(
            "Match abandoned after {} rounds (seed {}).",
            report.rounds, report.seed
        ),
    }
    Ok(())
}
