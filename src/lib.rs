//! Sending SMS and checking network health through a GSM modem on a serial line.
//!
//! * [`codec`] turns a phone number and a text into the hex SMS-SUBMIT PDU a
//!   modem takes in PDU mode, with [`gsm7`] doing the 7-bit packing.
//! * [`client`] drives the AT command conversation: readiness poll, SIM
//!   unlock, signal and operator queries, and `AT+CMGS`.
//! * [`serial`] connects the session to a real device, [`check`] renders the
//!   result the way monitoring hosts expect.
//! * [`plugin`] holds what the two commands decide from the modem's answers.

pub mod check;
pub mod client;
pub mod codec;
pub mod connection;
pub mod datatypes;
pub mod frame;
pub mod gsm7;
pub mod plugin;
pub mod serial;

#[cfg(test)]
mod tests;

// Re-export codec types for direct access
pub use codec::{CodecError, Encodable, SubmitPdu, encode_number, encode_pdu, encode_text};

// Re-export the main client API for easy access
pub use client::{
    AtResponse, AtSession, AtStatus, Modem, ModemBuilder, ModemConfig, ModemError, ModemResult,
    NetworkStatus, SmsTransmitter,
};

/// Error returned by the binaries' top-level helpers.
///
/// The library itself reports typed errors (`CodecError`, `ModemError`);
/// anything can be boxed into this one at the edges.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A specialized `Result` type for the binaries.
///
/// # Examples
///
/// ```rust,no_run
/// use sms_modem::client::{ModemBuilder, ModemConfig, SmsTransmitter};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> sms_modem::Result<()> {
///     let config = ModemConfig::new("/dev/ttyUSB0").with_pin("1234");
///     let mut modem = ModemBuilder::open(&config).await?;
///
///     let reference = modem.send_sms(None, "+491721234567", "Testtext").await?;
///     println!("Message reference {reference}");
///
///     modem.close().await?;
///     Ok(())
/// }
/// ```
///
/// Encoding alone needs no modem:
///
/// ```rust
/// let pdu = sms_modem::encode_pdu(None, "+491721234567", "Testtext:€").unwrap();
/// assert_eq!(pdu, "0005000C9194711232547600000BD4F29C4E2FE3E9BA4D19");
/// ```
pub type Result<T> = std::result::Result<T, Error>;
