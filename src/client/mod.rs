// ABOUTME: Modem client module providing trait-based interfaces over an AT command session
// ABOUTME: Exports the session traits, the default modem, its builder, configuration and error types

//! Modem Client Module
//!
//! A GSM modem is driven through a half-duplex AT command conversation:
//!
//! * **Native async traits** - async fn in traits, no async_trait dependency
//! * **Layered design** - `ModemLink` moves bytes, `AtSession` runs commands,
//!   `NetworkStatus` and `SmsTransmitter` build on top
//! * **Start-up sequence** - readiness poll and SIM unlock before any domain command
//! * **Pluggable link** - a serial port in production, any tokio byte stream in tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sms_modem::client::{ModemBuilder, ModemConfig, NetworkStatus, SmsTransmitter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ModemConfig::new("/dev/ttyUSB0").with_pin("1234");
//! let mut modem = ModemBuilder::open(&config).await?;
//!
//! let signal = modem.signal_quality().await?;
//! println!("Signal {} dBm", signal.dbm());
//!
//! let reference = modem.send_sms(None, "+491721234567", "Hello!").await?;
//! println!("Sent, reference {reference}");
//!
//! modem.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Raw commands
//!
//! ```rust,no_run
//! # use sms_modem::client::{AtSession, AtStatus, ModemBuilder, ModemConfig};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let mut modem = ModemBuilder::open(&ModemConfig::new("/dev/ttyUSB0")).await?;
//! let response = modem.command("+CGMI", None).await?;
//! if response.status == AtStatus::Ok {
//!     println!("{:?}", response.answers);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod default;
pub mod error;
pub mod readiness;
pub mod traits;
pub mod types;

// Re-export the main types for easy access
pub use builder::ModemBuilder;
pub use default::Modem;
pub use error::{ModemError, ModemResult};
pub use readiness::{ReadinessConfig, ReadinessPoll};
pub use traits::{AtSession, ModemLink, NetworkStatus, SmsTransmitter};
pub use types::{
    AtResponse, AtStatus, ModemConfig, NetworkTechnology, Operator, OperatorFormat,
    OperatorSelection, SUPPORTED_BAUD_RATES, SignalQuality, lookup_operator_name,
    parse_baud_rate,
};
