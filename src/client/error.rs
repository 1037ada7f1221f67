// ABOUTME: Modem session error types covering transport, modem rejections and SIM state
// ABOUTME: Provides structured error reporting with automatic conversion from I/O and codec errors

use crate::codec::CodecError;
use std::io;
use thiserror::Error;

/// Error type for modem session operations
///
/// Transport failures and SIM problems are terminal for the caller; the
/// session never retries anything except the start-up readiness poll.
#[derive(Debug, Error)]
pub enum ModemError {
    /// I/O error on the serial link (open, read, write)
    #[error("Connection error: {0}")]
    Connection(#[from] io::Error),

    /// No `OK` to the readiness poll
    #[error("Modem not ready after {attempts} attempts")]
    NotReady { attempts: u32 },

    /// The modem answered `ERROR`, `+CME ERROR` or `+CMS ERROR`
    #[error("Modem rejected AT{command}")]
    Rejected { command: String },

    /// No final result code before the timeout
    #[error("No answer to AT{command}")]
    NoResponse { command: String },

    /// `+CPIN?` itself failed
    #[error("Checking pin failed")]
    PinQueryFailed,

    /// The SIM wants a PIN and none was configured
    #[error("SIM ask for PIN")]
    PinRequired,

    /// The SIM was still locked after entering the PIN
    #[error("SIM unlock failed. Wrong PIN")]
    WrongPin,

    /// The SIM demands something other than the PIN (`SIM PUK`, ...)
    #[error("SIM ask for {0}")]
    SimDemand(String),

    /// Not registered with any operator
    #[error("Offline")]
    Offline,

    /// `+CSQ` reported a value outside 0..=31 (99 means unknown)
    #[error("Illegal signal quality reading '{0}'")]
    InvalidSignal(String),

    /// An information response could not be parsed
    #[error("Unexpected answer to AT{command}: '{answer}'")]
    UnexpectedAnswer { command: String, answer: String },

    /// The message could not be encoded
    #[error("Encoding error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type alias for modem operations
pub type ModemResult<T> = Result<T, ModemError>;
