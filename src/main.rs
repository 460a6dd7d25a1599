//! Lanewar CLI - host, join or script lane combat matches.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

/// Lanewar - two-player lane combat over TCP
#[derive(Parser, Debug)]
#[command(name = "lanewar")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log filter, e.g. `info` or `lanewar=debug` (default: $RUST_LOG or info)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Host one match
    Serve {
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address (default: 0.0.0.0:9000)
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Player accounts file (default: data/players.json)
        #[arg(short, long)]
        players: Option<PathBuf>,

        /// Troop stat file (requires --towers)
        #[arg(long, requires = "towers")]
        troops: Option<PathBuf>,

        /// Tower stat file (requires --troops)
        #[arg(long, requires = "troops")]
        towers: Option<PathBuf>,

        /// Seconds per turn, 0 to disable (default: 120)
        #[arg(short, long)]
        turn_timeout: Option<u64>,

        /// Crit seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Connect to a server as a player
    Connect {
        /// Server address
        #[arg(default_value = "127.0.0.1:9000")]
        addr: String,
    },

    /// Play a scripted match offline
    Script {
        /// Command file, one command per line, `#` for comments
        #[arg(required = true)]
        file: PathBuf,

        /// Crit seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// First player's name
        #[arg(long, default_value = "player1")]
        first: String,

        /// Second player's name
        #[arg(long, default_value = "player2")]
        second: String,

        /// First player's experience
        #[arg(long, default_value = "0")]
        first_exp: u32,

        /// Second player's experience
        #[arg(long, default_value = "0")]
        second_exp: u32,

        /// Troop stat file (requires --towers)
        #[arg(long, requires = "towers")]
        troops: Option<PathBuf>,

        /// Tower stat file (requires --troops)
        #[arg(long, requires = "troops")]
        towers: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Show the troop and tower roster
    Catalog {
        /// Troop stat file (requires --towers)
        #[arg(long, requires = "towers")]
        troops: Option<PathBuf>,

        /// Tower stat file (requires --troops)
        #[arg(long, requires = "troops")]
        towers: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_logging(args.log_level.as_deref());

    let result = match args.command {
        Commands::Serve {
            config,
            bind,
            players,
            troops,
            towers,
            turn_timeout,
            seed,
        } => cli::serve::execute(&cli::serve::ServeArgs {
            config,
            bind,
            players,
            troops,
            towers,
            turn_timeout,
            seed,
        }),

        Commands::Connect { addr } => cli::connect::execute(&addr),

        Commands::Script {
            file,
            seed,
            first,
            second,
            first_exp,
            second_exp,
            troops,
            towers,
            format,
        } => cli::script::execute(&cli::script::ScriptArgs {
            file,
            seed,
            players: [(first, first_exp), (second, second_exp)],
            troops,
            towers,
            format,
        }),

        Commands::Catalog {
            troops,
            towers,
            format,
        } => cli::catalog::execute(troops.as_deref(), towers.as_deref(), format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
