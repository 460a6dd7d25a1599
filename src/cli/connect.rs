//! Connect command implementation.

use super::CliError;
use std::io::{self, BufRead, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::thread;

/// Execute the connect command: stdin goes to the server, the server's
/// output goes to stdout. Returns when the server closes the connection.
///
/// # Errors
///
/// Returns an error if the connection cannot be made.
pub(crate) fn execute(addr: &str) -> Result<(), CliError> {
    let mut stream = TcpStream::connect(addr)
        .map_err(|e| CliError::new(format!("Failed to connect to {addr}: {e}")))?;
    let mut writer = stream.try_clone()?;

    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if writeln!(writer, "{line}").is_err() {
                break;
            }
        }
        writer.shutdown(Shutdown::Write).ok();
    });

    let mut out = io::stdout();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        out.flush()?;
    }
    println!();
    println!("Connection closed.");
    Ok(())
}
