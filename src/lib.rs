// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Lanewar: a two-player, turn-based lane combat engine.
//!
//! Each player defends two guard towers and a king tower, one per lane, and
//! summons troops into lanes to attack or defend. Destroying the enemy king
//! wins the match.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   TCP server / CLI script runner    │
//! ├─────────────────────────────────────┤
//! │   Session (turns, rounds, rewards)  │
//! ├─────────────────────────────────────┤
//! │   Lane combat + command validation  │
//! ├──────────────────┬──────────────────┤
//! │   Stat catalog   │   Player store   │
//! └──────────────────┴──────────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod game;
pub mod server;
pub mod store;

pub use catalog::{Catalog, CatalogError};
pub use config::{ConfigError, ServerConfig};
pub use error::{CommandError, CommandResult, Rejection};

// Re-export key game types at crate root for convenience
pub use game::{
    Command, Event, Lane, Lobby, Mode, Outcome, Player, PlayerId, SeededCrits, Session,
    StatProvider, Submission,
};
pub use server::{MatchReport, Server, ServerError};
pub use store::{JsonPlayerStore, MemoryPlayerStore, PlayerStore, StoreError};
