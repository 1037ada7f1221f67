// ABOUTME: Decision logic of the two monitoring commands, run against any open modem session
// ABOUTME: Maps modem answers and session errors onto plugin states, messages and performance data

use crate::check::{CheckOutput, PerfData, Thresholds};
use crate::client::{Modem, ModemError, ModemLink, NetworkStatus, SmsTransmitter};
use tracing::{debug, info};

/// Plugin result for a failed start-up (readiness poll or SIM unlock)
pub fn startup_failure(error: ModemError) -> CheckOutput {
    match error {
        ModemError::NotReady { .. } => CheckOutput::critical("Modem not ready."),
        e => CheckOutput::critical(e.to_string()),
    }
}

/// Signal strength and registration check.
///
/// A missing operator only changes the message; being offline or losing
/// the link is CRITICAL and an unreadable `+CSQ` is UNKNOWN.
pub async fn check_signal<L: ModemLink>(
    modem: &mut Modem<L>,
    thresholds: Thresholds,
) -> CheckOutput {
    let operator = match modem.operator().await {
        Ok(operator) => Some(operator),
        Err(ModemError::Offline) => return CheckOutput::critical("Offline"),
        Err(e @ ModemError::Connection(_)) => return CheckOutput::critical(e.to_string()),
        Err(e) => {
            debug!("Operator unavailable: {}", e);
            None
        }
    };

    let signal = match modem.signal_quality().await {
        Ok(signal) => signal,
        Err(e @ ModemError::InvalidSignal(_)) => return CheckOutput::unknown(e.to_string()),
        Err(e) => {
            debug!("Signal query failed: {}", e);
            return CheckOutput::unknown("Can't read Signal quality");
        }
    };

    let dbm = signal.dbm();
    let message = match operator {
        Some(operator) => format!("{operator} {dbm}dBm"),
        None => format!("Signal Quality {dbm}dBm"),
    };

    CheckOutput::new(thresholds.status(f64::from(dbm)), message)
        .with_perfdata(PerfData::new("signal", f64::from(dbm), "dBm").with_thresholds(thresholds))
}

/// Send one notification; any failure is CRITICAL
pub async fn send_notification<L: ModemLink>(
    modem: &mut Modem<L>,
    smsc: Option<&str>,
    number: &str,
    text: &str,
) -> CheckOutput {
    match modem.send_sms(smsc, number, text).await {
        Ok(reference) => {
            info!("Message reference {}", reference);
            CheckOutput::ok(format!("SMS sent to {number} (ref {reference})"))
        }
        Err(e) => CheckOutput::critical(format!("Sending SMS to {number} failed: {e}")),
    }
}

/// Message body from exactly one of `--msg` and `--template`.
///
/// Template files are taken verbatim apart from trailing line breaks.
pub async fn message_text(msg: Option<&str>, template: Option<&str>) -> Result<String, String> {
    match (msg, template) {
        (Some(msg), None) => Ok(msg.to_string()),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .map(|text| text.trim_end_matches(['\r', '\n']).to_string())
            .map_err(|e| format!("Reading template '{path}' failed: {e}")),
        (Some(_), Some(_)) => Err("Use either --msg or --template, not both".to_string()),
        (None, None) => Err("Either --msg or --template is required".to_string()),
    }
}
