//! One player's TCP connection.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::game::PlayerId;

/// Message from a reader thread to the turn loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A trimmed line of input.
    Line {
        /// Sending seat.
        seat: PlayerId,
        /// The line, without its terminator.
        line: String,
    },
    /// The peer closed the connection or reading failed.
    Closed {
        /// Seat that went away.
        seat: PlayerId,
    },
}

/// A line-oriented client connection.
///
/// Writes are best effort: failures are logged and dropped.
#[derive(Debug)]
pub struct Connection {
    peer: SocketAddr,
    reader: Option<BufReader<TcpStream>>,
    writer: TcpStream,
}

impl Connection {
    /// Wrap an accepted stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be cloned for reading.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let peer = stream.peer_addr()?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            peer,
            reader: Some(reader),
            writer: stream,
        })
    }

    /// Remote address.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Read one trimmed line synchronously. `None` on end of stream, or
    /// once the reader has moved to its own thread.
    ///
    /// # Errors
    ///
    /// Socket read failures.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Write `text` as is (prompts carry no newline).
    pub fn send(&mut self, text: &str) {
        let result = self
            .writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush());
        if let Err(err) = result {
            warn!(peer = %self.peer, error = %err, "delivery failed");
        }
    }

    /// Write `text` followed by a newline.
    pub fn send_line(&mut self, text: &str) {
        self.send(&format!("{text}\n"));
    }

    /// Move reading onto a thread that forwards lines as [`Inbound`]
    /// messages, ending with [`Inbound::Closed`].
    ///
    /// Returns `None` if the reader was already spawned.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn_reader(
        &mut self,
        seat: PlayerId,
        tx: Sender<Inbound>,
    ) -> io::Result<Option<JoinHandle<()>>> {
        let Some(mut reader) = self.reader.take() else {
            return Ok(None);
        };
        let peer = self.peer;
        let handle = thread::Builder::new()
            .name(format!("lanewar-reader-{seat}"))
            .spawn(move || {
                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) => {
                            let line = line.trim().to_string();
                            if tx.send(Inbound::Line { seat, line }).is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            debug!(%peer, error = %err, "read failed");
                            break;
                        }
                    }
                }
                debug!(%peer, seat, "connection closed");
                tx.send(Inbound::Closed { seat }).ok();
            })?;
        Ok(Some(handle))
    }

    /// Close both directions. Unblocks the reader thread.
    pub fn close(&self) {
        if let Err(err) = self.writer.shutdown(Shutdown::Both) {
            debug!(peer = %self.peer, error = %err, "shutdown failed");
        }
    }
}
