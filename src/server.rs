//! Line-oriented TCP server hosting one match.
//!
//! ```text
//! accept + login (sequential)     reader thread per seat
//!          │                              │
//!          ▼                              ▼
//!        Lobby ──► Session ◄── turn loop ◄── crossbeam channel
//!                                 │
//!                                 └──► best-effort writes to both seats
//! ```
//!
//! The turn loop is the single consumer of player input, so commands are
//! applied one at a time in arrival order.

mod connection;

pub use connection::{Connection, Inbound};

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, unbounded};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogError};
use crate::config::ServerConfig;
use crate::error::CommandError;
use crate::game::{
    Event, Lobby, LobbyError, Outcome, PlayerId, SEATS, SeededCrits, Session, opponent,
};
use crate::store::{PlayerStore, experience_or_default};

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address is unavailable.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        source: io::Error,
    },
    /// Accepting or setting up a connection failed.
    #[error("network error: {0}")]
    Io(#[from] io::Error),
    /// Stat files could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The match could not be assembled.
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

/// How a hosted match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchReport {
    /// Winner and loser, or `None` if a player disconnected first.
    pub outcome: Option<Outcome>,
    /// Fully resolved rounds.
    pub rounds: u32,
    /// Crit seed, for replaying the match offline.
    pub seed: u64,
}

/// Hosts a single two-player match.
pub struct Server {
    store: Arc<dyn PlayerStore>,
    catalog: Catalog,
    turn_timeout: Option<Duration>,
    seed: Option<u64>,
    starting_mana: u32,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("turn_timeout", &self.turn_timeout)
            .field("seed", &self.seed)
            .field("starting_mana", &self.starting_mana)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Create a server from config, an account store and a stat catalog.
    #[must_use]
    pub fn new(config: &ServerConfig, store: Arc<dyn PlayerStore>, catalog: Catalog) -> Self {
        Self {
            store,
            catalog,
            turn_timeout: config.turn_timeout(),
            seed: config.seed,
            starting_mana: config.starting_mana,
        }
    }

    /// Override the turn deadline.
    #[must_use]
    pub const fn with_turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Bind `addr` and host one match.
    ///
    /// # Errors
    ///
    /// See [`ServerError`].
    pub fn run(&self, addr: SocketAddr) -> Result<MatchReport, ServerError> {
        let listener =
            TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(&listener)
    }

    /// Host one match on an already bound listener.
    ///
    /// # Errors
    ///
    /// See [`ServerError`].
    pub fn serve(&self, listener: &TcpListener) -> Result<MatchReport, ServerError> {
        info!(addr = %listener.local_addr()?, "waiting for players");
        let (lobby, mut seats) = self.admit(listener)?;

        let crits = self.seed.map_or_else(SeededCrits::random, SeededCrits::new);
        let seed = crits.seed();
        info!(seed, "crit seed");
        let mut session = lobby.start(self.catalog.clone(), crits)?;

        let (tx, rx) = unbounded();
        for (seat, connection) in seats.iter_mut().enumerate() {
            connection.spawn_reader(seat, tx.clone())?;
        }
        drop(tx);

        deliver(&mut seats, &session.opening_events());
        prompt(&mut seats, &session);

        let mut deadline = self.next_deadline();
        let outcome = loop {
            let message = match deadline {
                Some(at) => rx.recv_deadline(at),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            let turn_before = session.current_turn();
            let reprompt = match message {
                Ok(Inbound::Line { seat, line }) => match session.submit(seat, &line) {
                    Ok(submission) => {
                        deliver(&mut seats, &submission.events);
                        if submission.outcome.is_some() {
                            break submission.outcome;
                        }
                        true
                    }
                    Err(CommandError::Blank) => seat == turn_before,
                    Err(err) => {
                        debug!(seat, %line, error = %err, "command rejected");
                        seats[seat].send_line(&format!("Error: {err}"));
                        seat == turn_before
                    }
                },
                Ok(Inbound::Closed { seat }) => {
                    let username = session.player(seat).username.clone();
                    warn!(%username, "player disconnected, match abandoned");
                    seats[opponent(seat)].send_line(&format!(
                        "{username} disconnected. Match ended without a winner."
                    ));
                    break None;
                }
                Err(RecvTimeoutError::Timeout) => match session.time_out(turn_before) {
                    Ok(submission) => {
                        deliver(&mut seats, &submission.events);
                        if submission.outcome.is_some() {
                            break submission.outcome;
                        }
                        true
                    }
                    Err(err) => {
                        debug!(seat = turn_before, error = %err, "timeout ignored");
                        false
                    }
                },
                Err(RecvTimeoutError::Disconnected) => break None,
            };

            if session.current_turn() != turn_before {
                deadline = self.next_deadline();
            }
            if reprompt {
                prompt(&mut seats, &session);
            }
        };

        if outcome.is_some() {
            deliver(&mut seats, &session.settle(self.store.as_ref()));
        }
        for connection in &seats {
            connection.close();
        }

        Ok(MatchReport {
            outcome,
            rounds: session.rounds(),
            seed,
        })
    }

    /// Accept and authenticate connections until both seats are taken.
    fn admit(&self, listener: &TcpListener) -> Result<(Lobby, [Connection; SEATS]), ServerError> {
        let mut lobby = Lobby::with_starting_mana(self.starting_mana);
        let mut connections = Vec::with_capacity(SEATS);

        while !lobby.is_full() {
            let (stream, addr) = listener.accept()?;
            info!(%addr, "connection accepted");
            let mut connection = match Connection::new(stream) {
                Ok(connection) => connection,
                Err(err) => {
                    warn!(%addr, error = %err, "connection setup failed");
                    continue;
                }
            };

            let Some(username) = self.login(&mut connection) else {
                connection.close();
                continue;
            };
            let experience = experience_or_default(self.store.as_ref(), &username);
            match lobby.join(username.as_str(), experience) {
                Ok(_) => {
                    connection.send_line(&format!("Welcome {username}! Waiting for other player..."));
                    connections.push(connection);
                }
                Err(err) => {
                    warn!(%username, error = %err, "lobby refused player");
                    connection.send_line(&format!("Error: {err}"));
                    connection.close();
                }
            }
        }

        let seats = <[Connection; SEATS]>::try_from(connections)
            .map_err(|joined| LobbyError::NotReady(joined.len()))?;
        Ok((lobby, seats))
    }

    /// Prompt for credentials. `None` when the peer left or was refused.
    fn login(&self, connection: &mut Connection) -> Option<String> {
        let peer = connection.peer();
        let mut ask = |label: &str| {
            connection.send(&format!("{label}: "));
            match connection.read_line() {
                Ok(line) => line,
                Err(err) => {
                    debug!(%peer, error = %err, "login read failed");
                    None
                }
            }
        };
        let username = ask("Username")?;
        let password = ask("Password")?;

        let accepted = self
            .store
            .authenticate(&username, &password)
            .unwrap_or_else(|err| {
                warn!(%username, error = %err, "authentication lookup failed");
                false
            });
        if accepted {
            info!(%username, %peer, "player authenticated");
            Some(username)
        } else {
            info!(%username, %peer, "authentication failed");
            connection.send_line("Authentication failed.");
            None
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.turn_timeout.map(|timeout| Instant::now() + timeout)
    }
}

/// Send each event to the seats in its audience.
fn deliver(seats: &mut [Connection; SEATS], events: &[Event]) {
    for event in events {
        let text = event.to_string();
        for (seat, connection) in seats.iter_mut().enumerate() {
            if event.audience().includes(seat) {
                connection.send_line(&text);
            }
        }
    }
}

/// Ask the turn holder for a command.
fn prompt(seats: &mut [Connection; SEATS], session: &Session) {
    if session.is_over() {
        return;
    }
    let seat: PlayerId = session.current_turn();
    let mana = session.player(seat).mana;
    seats[seat].send(&format!("Your turn (Mana: {mana}): "));
}
