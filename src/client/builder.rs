// ABOUTME: Modem factory that opens the device and runs the start-up sequence
// ABOUTME: Returns a session only once the modem answers and the SIM is unlocked

use crate::client::default::Modem;
use crate::client::error::ModemResult;
use crate::client::traits::{AtSession, ModemLink};
use crate::client::types::ModemConfig;
use crate::serial::SerialLink;
use tracing::{debug, warn};

/// Factory for ready-to-use modem sessions
///
/// Every session goes through the same start-up: poll until the modem
/// answers `OK`, then bring the SIM to `READY`. A failed start-up closes
/// the link before the error is returned.
pub struct ModemBuilder;

impl ModemBuilder {
    /// Open the serial device from `config` and prepare the modem
    pub async fn open(config: &ModemConfig) -> ModemResult<Modem<SerialLink>> {
        debug!("Opening {} at {} baud", config.device, config.baud_rate);
        let link = SerialLink::open(&config.device, config.baud_rate)?;
        Self::from_link(link, config).await
    }

    /// Prepare a modem reachable over an already open `link`
    pub async fn from_link<L: ModemLink>(link: L, config: &ModemConfig) -> ModemResult<Modem<L>> {
        let mut modem = Modem::new(
            link,
            config.read_timeout,
            config.write_timeout,
            config.readiness.clone(),
        );

        let started = async {
            modem.wait_ready().await?;
            modem.unlock_sim(config.pin.as_deref()).await
        }
        .await;

        match started {
            Ok(()) => Ok(modem),
            Err(e) => {
                if let Err(close_err) = modem.close().await {
                    warn!("Closing modem after failed start-up: {}", close_err);
                }
                Err(e)
            }
        }
    }
}
