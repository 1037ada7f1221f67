// ABOUTME: Line-oriented I/O over a modem link for AT command exchanges
// ABOUTME: Buffers incoming bytes and yields CR/LF-terminated lines as classified response lines

use crate::client::ModemLink;
use crate::frame::Line;
use bytes::{Buf, BytesMut};
use std::io;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Ctrl-Z, ends the text entry of `+CMGS`
pub const CTRL_Z: u8 = 0x1A;

/// AT command transport
///
/// Writes command lines and reads response lines. The modem talks
/// half-duplex: one command is in flight at a time and every answer line
/// ends with CR, LF or both. Empty lines carry no information and are
/// skipped.
///
/// `Connection` does not know which command a line answers; that is up to
/// the session in [`crate::client::Modem`].
#[derive(Debug)]
pub struct Connection<L> {
    link: L,

    // Bytes received but not yet returned as a line. A partial line stays
    // here across calls.
    buffer: BytesMut,

    write_timeout: Duration,
}

impl<L: ModemLink> Connection<L> {
    /// Create a new `Connection` over `link`
    pub fn new(link: L, write_timeout: Duration) -> Connection<L> {
        Connection {
            link,
            buffer: BytesMut::with_capacity(1024),
            write_timeout,
        }
    }

    /// Write `AT<command><options>` followed by CR.
    ///
    /// With `input`, the text is sent right after the command line and
    /// terminated by CR and Ctrl-Z.
    pub async fn write_command(
        &mut self,
        command: &str,
        options: Option<&str>,
        input: Option<&str>,
    ) -> io::Result<()> {
        let options = options.unwrap_or("");
        let line = format!("AT{command}{options}\r");
        if command == "+CPIN" && options.starts_with('=') {
            trace!(">> AT+CPIN=<pin>");
        } else {
            trace!(">> {}", line.trim_end());
        }
        self.link.send(line.as_bytes(), self.write_timeout).await?;

        if let Some(input) = input {
            trace!(">> {}<Ctrl-Z>", input);
            let mut data = Vec::with_capacity(input.len() + 2);
            data.extend_from_slice(input.as_bytes());
            data.push(b'\r');
            data.push(CTRL_Z);
            self.link.send(&data, self.write_timeout).await?;
        }
        Ok(())
    }

    /// Read the next non-empty line, waiting no later than `deadline`.
    ///
    /// # Returns
    ///
    /// `None` when the deadline passes or the link reaches end of stream
    /// before a complete line arrived. Other I/O errors are returned as is.
    pub async fn read_line(&mut self, deadline: Instant) -> io::Result<Option<Line>> {
        loop {
            if let Some(line) = self.parse_line() {
                trace!("<< {}", line);
                return Ok(Some(line));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }

            match self.link.recv(&mut self.buffer, remaining).await {
                Ok(0) => return Ok(None),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }

    /// Takes the first complete, non-empty line out of the buffer.
    fn parse_line(&mut self) -> Option<Line> {
        loop {
            let end = self.buffer.iter().position(|b| *b == b'\r' || *b == b'\n')?;
            let raw = self.buffer.split_to(end);
            self.buffer.advance(1);

            let text = String::from_utf8_lossy(&raw);
            let text = text.trim();
            if !text.is_empty() {
                return Some(Line::parse(text));
            }
        }
    }

    /// Drop any unread bytes, e.g. late answers to an abandoned command
    pub fn discard_input(&mut self) {
        self.buffer.clear();
    }

    /// Release the underlying link
    pub async fn close(mut self) -> io::Result<()> {
        self.link.close().await
    }
}
