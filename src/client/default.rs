// ABOUTME: Default modem session implementing the AT command, network status and SMS traits
// ABOUTME: Drives readiness polling, SIM unlock and PDU-mode sending over any ModemLink

use crate::client::error::{ModemError, ModemResult};
use crate::client::readiness::{ReadinessConfig, ReadinessPoll};
use crate::client::traits::{AtSession, ModemLink, NetworkStatus, SmsTransmitter};
use crate::client::types::{
    AtResponse, AtStatus, Operator, OperatorFormat, OperatorSelection, SignalQuality,
    lookup_operator_name,
};
use crate::codec::{Encodable, SubmitPdu};
use crate::connection::Connection;
use crate::frame::Line;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Modem session
///
/// Owns the link for its whole lifetime and keeps one command in flight at a
/// time. Each command gets `read_timeout` in total to produce its final
/// result code.
#[derive(Debug)]
pub struct Modem<L> {
    connection: Connection<L>,
    read_timeout: Duration,
    readiness: ReadinessConfig,
}

impl<L: ModemLink> Modem<L> {
    pub fn new(
        link: L,
        read_timeout: Duration,
        write_timeout: Duration,
        readiness: ReadinessConfig,
    ) -> Self {
        Modem {
            connection: Connection::new(link, write_timeout),
            read_timeout,
            readiness,
        }
    }

    async fn exchange(
        &mut self,
        command: &str,
        options: Option<&str>,
        input: Option<&str>,
    ) -> ModemResult<AtResponse> {
        self.connection.write_command(command, options, input).await?;

        let deadline = Instant::now() + self.read_timeout;
        let mut answers = Vec::new();

        loop {
            let status = match self.connection.read_line(deadline).await? {
                None => AtStatus::NoResponse,
                Some(Line::Ok) => AtStatus::Ok,
                Some(line @ (Line::Error | Line::CmeError(_) | Line::CmsError(_))) => {
                    debug!("AT{} failed: {}", command, line);
                    AtStatus::Error
                }
                Some(line) => {
                    if let Some(answer) = line.answer_to(command) {
                        answers.push(answer.to_string());
                    }
                    continue;
                }
            };
            if status == AtStatus::NoResponse {
                debug!("AT{} got no final result code", command);
            }
            return Ok(AtResponse { status, answers });
        }
    }

    /// Release the link
    pub async fn close(self) -> ModemResult<()> {
        self.connection.close().await?;
        Ok(())
    }
}

impl<L: ModemLink> AtSession for Modem<L> {
    async fn command(&mut self, command: &str, options: Option<&str>) -> ModemResult<AtResponse> {
        self.exchange(command, options, None).await
    }

    async fn command_input(
        &mut self,
        command: &str,
        options: Option<&str>,
        input: &str,
    ) -> ModemResult<AtResponse> {
        self.exchange(command, options, Some(input)).await
    }

    async fn wait_ready(&mut self) -> ModemResult<()> {
        let mut poll = ReadinessPoll::new(self.readiness.clone());

        while poll.should_attempt() {
            if self.command("", None).await?.is_ok() {
                poll.on_ready();
                break;
            }
            poll.on_failure();
            self.connection.discard_input();

            if poll.should_attempt() {
                tokio::time::sleep(poll.interval()).await;
            }
        }

        if poll.is_ready() {
            Ok(())
        } else {
            Err(ModemError::NotReady {
                attempts: poll.attempts(),
            })
        }
    }

    async fn unlock_sim(&mut self, pin: Option<&str>) -> ModemResult<()> {
        let response = self.command("+CPIN", Some("?")).await?;
        if !response.is_ok() {
            return Err(ModemError::PinQueryFailed);
        }

        match response.first() {
            // Some modems answer a bare OK once the SIM is unlocked
            None | Some("READY") => Ok(()),
            Some("SIM PIN") => {
                let pin = pin.ok_or(ModemError::PinRequired)?;
                self.command("+CPIN", Some(&format!("=\"{pin}\""))).await?;

                let response = self.command("+CPIN", Some("?")).await?;
                if response.first() == Some("READY") {
                    info!("SIM unlocked");
                    Ok(())
                } else {
                    Err(ModemError::WrongPin)
                }
            }
            Some(demand) => Err(ModemError::SimDemand(demand.to_string())),
        }
    }
}

impl<L: ModemLink> NetworkStatus for Modem<L> {
    async fn signal_quality(&mut self) -> ModemResult<SignalQuality> {
        let response = self.command("+CSQ", None).await?.into_ok("+CSQ")?;
        let answer = response.first().ok_or_else(|| ModemError::UnexpectedAnswer {
            command: "+CSQ".to_string(),
            answer: String::new(),
        })?;
        SignalQuality::parse(answer)
    }

    async fn operator(&mut self) -> ModemResult<Operator> {
        let response = self.command("+COPS", Some("?")).await?.into_ok("+COPS")?;
        let selection = OperatorSelection::parse(response.first().unwrap_or(""))?;

        let name = if selection.format == OperatorFormat::Numeric {
            let names = self.command("+COPN", None).await?;
            lookup_operator_name(&names.answers, &selection.operator)
                .unwrap_or(selection.operator)
        } else {
            selection.operator
        };

        Ok(Operator {
            name,
            technology: selection.technology,
        })
    }
}

impl<L: ModemLink> SmsTransmitter for Modem<L> {
    async fn send_sms(
        &mut self,
        smsc: Option<&str>,
        number: &str,
        text: &str,
    ) -> ModemResult<u8> {
        let pdu = SubmitPdu::parse(smsc, number, text)?;
        let hex = pdu.to_hex()?;
        debug!("PDU: {}", hex);

        self.command("+CMGF", Some("=0")).await?.into_ok("+CMGF")?;

        let length = format!("={}", pdu.tpdu_len());
        let response = self
            .command_input("+CMGS", Some(&length), &hex)
            .await?
            .into_ok("+CMGS")?;

        let answer = response.first().unwrap_or("");
        let reference = answer
            .split(',')
            .next()
            .and_then(|mr| mr.trim().parse::<u8>().ok())
            .ok_or_else(|| ModemError::UnexpectedAnswer {
                command: "+CMGS".to_string(),
                answer: answer.to_string(),
            })?;

        info!("SMS to {} accepted, reference {}", number, reference);
        Ok(reference)
    }
}
