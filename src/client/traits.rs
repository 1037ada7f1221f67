// ABOUTME: Core modem traits using native async functions, from raw byte link up to SMS sending
// ABOUTME: Lets the session run over a serial port in production and an in-memory pipe in tests

use crate::client::error::ModemResult;
use crate::client::types::{AtResponse, Operator, SignalQuality};
use bytes::BytesMut;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Raw byte channel to the modem
///
/// Both directions are bounded by a timeout. An expired timeout is reported
/// as an `io::ErrorKind::TimedOut` error.
pub trait ModemLink {
    /// Write all of `data`, waiting at most `timeout` for the device to accept it
    async fn send(&mut self, data: &[u8], timeout: Duration) -> io::Result<()>;

    /// Append whatever is available to `buf`, waiting at most `timeout` for it.
    ///
    /// Returns the number of bytes read, `0` at end of stream.
    async fn recv(&mut self, buf: &mut BytesMut, timeout: Duration) -> io::Result<usize>;

    /// Release the channel
    async fn close(&mut self) -> io::Result<()>;
}

impl<S> ModemLink for S
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    async fn send(&mut self, data: &[u8], timeout: Duration) -> io::Result<()> {
        let write = async {
            self.write_all(data).await?;
            self.flush().await
        };
        tokio::time::timeout(timeout, write)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "write to modem timed out"))?
    }

    async fn recv(&mut self, buf: &mut BytesMut, timeout: Duration) -> io::Result<usize> {
        tokio::time::timeout(timeout, self.read_buf(buf))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no answer from modem"))?
    }

    async fn close(&mut self) -> io::Result<()> {
        self.shutdown().await
    }
}

/// AT command round trips
///
/// Provides the half-duplex request/response exchange plus the start-up
/// sequence every caller runs before issuing domain commands.
pub trait AtSession {
    /// Run `AT<command><options>` and collect the answers to `command`
    ///
    /// A missing final result code is not an error: it comes back as
    /// `AtStatus::NoResponse` so callers can poll an idle modem.
    async fn command(&mut self, command: &str, options: Option<&str>) -> ModemResult<AtResponse>;

    /// Like [`command`](AtSession::command), then send `input` terminated by
    /// CR and Ctrl-Z (the text entry mode of `+CMGS`)
    async fn command_input(
        &mut self,
        command: &str,
        options: Option<&str>,
        input: &str,
    ) -> ModemResult<AtResponse>;

    /// Poll with a bare `AT` until the modem answers `OK`
    async fn wait_ready(&mut self) -> ModemResult<()>;

    /// Bring the SIM to the `READY` state, entering `pin` when asked
    async fn unlock_sim(&mut self, pin: Option<&str>) -> ModemResult<()>;
}

/// Network registration and radio status
pub trait NetworkStatus: AtSession {
    /// Received signal strength from `+CSQ`
    async fn signal_quality(&mut self) -> ModemResult<SignalQuality>;

    /// Registered operator from `+COPS?`, resolved to a name when the modem
    /// reports numeric codes
    async fn operator(&mut self) -> ModemResult<Operator>;
}

/// SMS sending in PDU mode
pub trait SmsTransmitter: AtSession {
    /// Send `text` to `number`, optionally through `smsc`
    ///
    /// Returns the message reference the network assigned.
    async fn send_sms(&mut self, smsc: Option<&str>, number: &str, text: &str)
    -> ModemResult<u8>;
}
