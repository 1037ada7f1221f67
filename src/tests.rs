//! Integration tests for the modem session against a scripted modem

use crate::check::{Range, Status, Thresholds};
use crate::client::*;
use crate::plugin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
use tokio::task::JoinHandle;

#[cfg(test)]
mod integration_tests {
    use super::*;

    const CTRL_Z_MARK: &str = "<Ctrl-Z>";

    /// Runs a fake modem on the far end of an in-memory link.
    ///
    /// `respond` sees every CR-terminated line (and `<Ctrl-Z>` for the end of
    /// text input) and returns the bytes the modem sends back. The handle
    /// yields everything received once the link is closed.
    fn spawn_modem<F>(mut respond: F) -> (DuplexStream, JoinHandle<Vec<String>>)
    where
        F: FnMut(&str) -> Option<String> + Send + 'static,
    {
        let (local, mut remote) = duplex(4096);
        let handle = tokio::spawn(async move {
            let mut received = Vec::new();
            let mut line = Vec::new();
            let mut byte = [0u8; 1];

            while let Ok(1) = remote.read(&mut byte).await {
                let text = match byte[0] {
                    b'\r' => String::from_utf8_lossy(&std::mem::take(&mut line)).into_owned(),
                    0x1A => CTRL_Z_MARK.to_string(),
                    other => {
                        line.push(other);
                        continue;
                    }
                };
                if let Some(reply) = respond(&text) {
                    if remote.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                }
                received.push(text);
            }
            received
        });
        (local, handle)
    }

    /// Lines framed the way modems send them
    fn reply(lines: &[&str]) -> Option<String> {
        Some(lines.iter().map(|line| format!("\r\n{line}\r\n")).collect())
    }

    fn test_config() -> ModemConfig {
        ModemConfig::new("/dev/null")
            .with_read_timeout(Duration::from_millis(200))
            .with_readiness(ReadinessConfig::new(Duration::from_millis(10)))
    }

    fn modem(link: DuplexStream) -> Modem<DuplexStream> {
        let config = test_config();
        Modem::new(
            link,
            config.read_timeout,
            config.write_timeout,
            config.readiness,
        )
    }

    #[tokio::test]
    async fn test_command_ok_without_answers() {
        let (link, handle) = spawn_modem(|_| reply(&["OK"]));
        let mut modem = modem(link);

        let response = modem.command("", None).await.unwrap();
        assert_eq!(response.status, AtStatus::Ok);
        assert_eq!(response.status.code(), 0);
        assert!(response.answers.is_empty());

        modem.close().await.unwrap();
        assert_eq!(handle.await.unwrap(), vec!["AT".to_string()]);
    }

    #[tokio::test]
    async fn test_command_error() {
        let (link, _handle) = spawn_modem(|_| reply(&["ERROR"]));
        let mut modem = modem(link);

        let response = modem.command("+CSQ", None).await.unwrap();
        assert_eq!(response.status, AtStatus::Error);
        assert_eq!(response.status.code(), 1);
    }

    #[tokio::test]
    async fn test_command_cme_error() {
        let (link, _handle) = spawn_modem(|_| reply(&["+CME ERROR: 10"]));
        let mut modem = modem(link);

        let response = modem.command("+CPIN", Some("?")).await.unwrap();
        assert_eq!(response.status, AtStatus::Error);
    }

    #[tokio::test]
    async fn test_command_silent_modem() {
        let (link, _handle) = spawn_modem(|_| None);
        let mut modem = modem(link);

        let response = modem.command("+CSQ", None).await.unwrap();
        assert_eq!(response.status, AtStatus::NoResponse);
        assert_eq!(response.status.code(), -1);
    }

    #[tokio::test]
    async fn test_command_closed_link() {
        let (link, remote) = duplex(64);
        drop(remote);
        let mut modem = modem(link);

        // Writing into a closed pipe is a transport failure
        let result = modem.command("+CSQ", None).await;
        assert!(matches!(result, Err(ModemError::Connection(_))));
    }

    #[tokio::test]
    async fn test_command_collects_answers() {
        let (link, _handle) = spawn_modem(|line| match line {
            "AT+COPN" => reply(&[
                "AT+COPN",
                "+COPN: \"26201\",\"T-Mobile D\"",
                "+COPN: \"26202\",\"Vodafone.de\"",
                "+CREG: 1",
                "OK",
            ]),
            _ => reply(&["ERROR"]),
        });
        let mut modem = modem(link);

        let response = modem.command("+COPN", None).await.unwrap();
        assert!(response.is_ok());
        assert_eq!(
            response.answers,
            vec![
                "\"26201\",\"T-Mobile D\"".to_string(),
                "\"26202\",\"Vodafone.de\"".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_command_captures_nothing() {
        let (link, _handle) = spawn_modem(|_| reply(&["RING", "OK"]));
        let mut modem = modem(link);

        let response = modem.command("", None).await.unwrap();
        assert!(response.is_ok());
        assert!(response.answers.is_empty());
    }

    #[tokio::test]
    async fn test_command_input_terminated_by_ctrl_z() {
        let (link, handle) = spawn_modem(|line| match line {
            CTRL_Z_MARK => reply(&["+CMGS: 7", "OK"]),
            _ => None,
        });
        let mut modem = modem(link);

        let response = modem
            .command_input("+CMGS", Some("=3"), "001100")
            .await
            .unwrap();
        assert!(response.is_ok());
        assert_eq!(response.answers, vec!["7".to_string()]);

        modem.close().await.unwrap();
        assert_eq!(
            handle.await.unwrap(),
            vec![
                "AT+CMGS=3".to_string(),
                "001100".to_string(),
                CTRL_Z_MARK.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_wait_ready_after_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let (link, _handle) = spawn_modem(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                reply(&["ERROR"])
            } else {
                reply(&["OK"])
            }
        });
        let mut modem = modem(link);

        modem.wait_ready().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_ready_gives_up_after_five_attempts() {
        let (link, handle) = spawn_modem(|_| None);
        let mut modem = modem(link);

        let result = modem.wait_ready().await;
        assert!(matches!(result, Err(ModemError::NotReady { attempts: 5 })));

        modem.close().await.unwrap();
        assert_eq!(handle.await.unwrap(), vec!["AT".to_string(); 5]);
    }

    #[tokio::test]
    async fn test_unlock_sim_already_ready() {
        let (link, handle) = spawn_modem(|_| reply(&["+CPIN: READY", "OK"]));
        let mut modem = modem(link);

        modem.unlock_sim(Some("1234")).await.unwrap();

        modem.close().await.unwrap();
        assert_eq!(handle.await.unwrap(), vec!["AT+CPIN?".to_string()]);
    }

    #[tokio::test]
    async fn test_unlock_sim_with_pin() {
        let mut unlocked = false;
        let (link, handle) = spawn_modem(move |line| match line {
            "AT+CPIN?" if unlocked => reply(&["+CPIN: READY", "OK"]),
            "AT+CPIN?" => reply(&["+CPIN: SIM PIN", "OK"]),
            "AT+CPIN=\"1234\"" => {
                unlocked = true;
                reply(&["OK"])
            }
            _ => reply(&["ERROR"]),
        });
        let mut modem = modem(link);

        modem.unlock_sim(Some("1234")).await.unwrap();

        modem.close().await.unwrap();
        assert_eq!(
            handle.await.unwrap(),
            vec![
                "AT+CPIN?".to_string(),
                "AT+CPIN=\"1234\"".to_string(),
                "AT+CPIN?".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_unlock_sim_wrong_pin() {
        let (link, _handle) = spawn_modem(|line| match line {
            "AT+CPIN?" => reply(&["+CPIN: SIM PIN", "OK"]),
            _ => reply(&["+CME ERROR: 16"]),
        });
        let mut modem = modem(link);

        let result = modem.unlock_sim(Some("0000")).await;
        assert!(matches!(result, Err(ModemError::WrongPin)));
    }

    #[tokio::test]
    async fn test_unlock_sim_without_pin() {
        let (link, handle) = spawn_modem(|_| reply(&["+CPIN: SIM PIN", "OK"]));
        let mut modem = modem(link);

        let result = modem.unlock_sim(None).await;
        assert!(matches!(result, Err(ModemError::PinRequired)));
        assert_eq!(result.unwrap_err().to_string(), "SIM ask for PIN");

        modem.close().await.unwrap();
        assert_eq!(handle.await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unlock_sim_other_demand() {
        let (link, _handle) = spawn_modem(|_| reply(&["+CPIN: SIM PUK", "OK"]));
        let mut modem = modem(link);

        let err = modem.unlock_sim(Some("1234")).await.unwrap_err();
        assert!(matches!(&err, ModemError::SimDemand(demand) if demand == "SIM PUK"));
        assert_eq!(err.to_string(), "SIM ask for SIM PUK");
    }

    #[tokio::test]
    async fn test_unlock_sim_query_fails() {
        let (link, _handle) = spawn_modem(|_| reply(&["ERROR"]));
        let mut modem = modem(link);

        let result = modem.unlock_sim(Some("1234")).await;
        assert!(matches!(result, Err(ModemError::PinQueryFailed)));
    }

    #[tokio::test]
    async fn test_signal_quality() {
        let (link, _handle) = spawn_modem(|_| reply(&["+CSQ: 21,99", "OK"]));
        let mut modem = modem(link);

        let signal = modem.signal_quality().await.unwrap();
        assert_eq!(signal.rssi, 21);
        assert_eq!(signal.dbm(), -71);
    }

    #[tokio::test]
    async fn test_signal_quality_unknown() {
        let (link, _handle) = spawn_modem(|_| reply(&["+CSQ: 99,99", "OK"]));
        let mut modem = modem(link);

        let result = modem.signal_quality().await;
        assert!(matches!(result, Err(ModemError::InvalidSignal(value)) if value == "99,99"));
    }

    #[tokio::test]
    async fn test_operator_long_name() {
        let (link, _handle) = spawn_modem(|_| reply(&["+COPS: 0,0,\"T-Mobile D\",7", "OK"]));
        let mut modem = modem(link);

        let operator = modem.operator().await.unwrap();
        assert_eq!(operator.name, "T-Mobile D");
        assert_eq!(operator.technology, NetworkTechnology::Lte);
        assert_eq!(operator.to_string(), "T-Mobile D [LTE]");
    }

    #[tokio::test]
    async fn test_operator_numeric_resolved() {
        let (link, _handle) = spawn_modem(|line| match line {
            "AT+COPS?" => reply(&["+COPS: 0,2,\"26202\",2", "OK"]),
            "AT+COPN" => reply(&[
                "+COPN: \"26201\",\"T-Mobile D\"",
                "+COPN: \"26202\",\"Vodafone.de\"",
                "OK",
            ]),
            _ => reply(&["ERROR"]),
        });
        let mut modem = modem(link);

        let operator = modem.operator().await.unwrap();
        assert_eq!(operator.name, "Vodafone.de");
        assert_eq!(operator.technology, NetworkTechnology::Umts);
    }

    #[tokio::test]
    async fn test_operator_offline() {
        let (link, _handle) = spawn_modem(|_| reply(&["+COPS: 0", "OK"]));
        let mut modem = modem(link);

        assert!(matches!(modem.operator().await, Err(ModemError::Offline)));
    }

    #[tokio::test]
    async fn test_send_sms_pdu_mode() {
        let (link, handle) = spawn_modem(|line| match line {
            "AT+CMGF=0" => reply(&["OK"]),
            "AT+CMGS=23" => Some("\r\n> ".to_string()),
            CTRL_Z_MARK => reply(&["+CMGS: 42", "OK"]),
            _ => None,
        });
        let mut modem = modem(link);

        let reference = modem
            .send_sms(None, "+491721234567", "Testtext:€")
            .await
            .unwrap();
        assert_eq!(reference, 42);

        modem.close().await.unwrap();
        assert_eq!(
            handle.await.unwrap(),
            vec![
                "AT+CMGF=0".to_string(),
                "AT+CMGS=23".to_string(),
                "0005000C9194711232547600000BD4F29C4E2FE3E9BA4D19".to_string(),
                CTRL_Z_MARK.to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_send_sms_rejected() {
        let (link, _handle) = spawn_modem(|line| match line {
            "AT+CMGF=0" => reply(&["OK"]),
            CTRL_Z_MARK => reply(&["+CMS ERROR: 500"]),
            _ => None,
        });
        let mut modem = modem(link);

        let result = modem.send_sms(None, "+491721234567", "Hello").await;
        assert!(matches!(result, Err(ModemError::Rejected { command }) if command == "+CMGS"));
    }

    #[tokio::test]
    async fn test_send_sms_invalid_number_sends_nothing() {
        let (link, handle) = spawn_modem(|_| reply(&["OK"]));
        let mut modem = modem(link);

        let result = modem.send_sms(None, "+49 172", "Hello").await;
        assert!(matches!(result, Err(ModemError::Codec(_))));

        modem.close().await.unwrap();
        assert!(handle.await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_builder_start_up() {
        let (link, handle) = spawn_modem(|line| match line {
            "AT" => reply(&["OK"]),
            "AT+CPIN?" => reply(&["+CPIN: READY", "OK"]),
            _ => reply(&["ERROR"]),
        });

        let modem = ModemBuilder::from_link(link, &test_config()).await.unwrap();
        modem.close().await.unwrap();
        assert_eq!(
            handle.await.unwrap(),
            vec!["AT".to_string(), "AT+CPIN?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_builder_closes_link_on_failure() {
        let (link, handle) = spawn_modem(|line| match line {
            "AT" => reply(&["OK"]),
            _ => reply(&["+CPIN: SIM PIN", "OK"]),
        });

        let result = ModemBuilder::from_link(link, &test_config()).await;
        assert!(matches!(result, Err(ModemError::PinRequired)));

        // The fake modem only finishes once the link is shut down
        let received = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.len(), 2);
    }

    fn signal_thresholds() -> Thresholds {
        Thresholds::new(
            Some("-90:".parse::<Range>().unwrap()),
            Some("-100:".parse::<Range>().unwrap()),
        )
    }

    /// Answers `+COPS?` and `+CSQ` the given way
    fn network(
        cops: &'static [&'static str],
        csq: &'static [&'static str],
    ) -> (DuplexStream, JoinHandle<Vec<String>>) {
        spawn_modem(move |line| match line {
            "AT+COPS?" => reply(cops),
            "AT+CSQ" => reply(csq),
            _ => reply(&["ERROR"]),
        })
    }

    #[tokio::test]
    async fn test_check_signal_with_operator() {
        let (link, _handle) = network(
            &["+COPS: 0,0,\"T-Mobile D\",7", "OK"],
            &["+CSQ: 21,99", "OK"],
        );
        let mut modem = modem(link);

        let output = plugin::check_signal(&mut modem, signal_thresholds()).await;
        assert_eq!(output.status, Status::Ok);
        assert_eq!(
            output.to_string(),
            "OK - T-Mobile D [LTE] -71dBm | signal=-71dBm;-90:;-100:"
        );
    }

    #[tokio::test]
    async fn test_check_signal_without_operator() {
        let (link, _handle) = network(&["ERROR"], &["+CSQ: 21,99", "OK"]);
        let mut modem = modem(link);

        let output = plugin::check_signal(&mut modem, signal_thresholds()).await;
        assert_eq!(
            output.to_string(),
            "OK - Signal Quality -71dBm | signal=-71dBm;-90:;-100:"
        );
    }

    #[tokio::test]
    async fn test_check_signal_offline() {
        let (link, handle) = network(&["+COPS: 0", "OK"], &["+CSQ: 21,99", "OK"]);
        let mut modem = modem(link);

        let output = plugin::check_signal(&mut modem, signal_thresholds()).await;
        assert_eq!(output.to_string(), "CRITICAL - Offline");

        // Signal is not queried once the modem is known to be offline
        modem.close().await.unwrap();
        assert_eq!(handle.await.unwrap(), vec!["AT+COPS?".to_string()]);
    }

    #[tokio::test]
    async fn test_check_signal_link_lost() {
        let (link, remote) = duplex(64);
        drop(remote);
        let mut modem = modem(link);

        let output = plugin::check_signal(&mut modem, signal_thresholds()).await;
        assert_eq!(output.status, Status::Critical);
        assert!(output.message.starts_with("Connection error"));
        assert!(output.perfdata.is_empty());
    }

    #[tokio::test]
    async fn test_check_signal_unreadable() {
        let (link, _handle) = network(
            &["+COPS: 0,0,\"T-Mobile D\",7", "OK"],
            &["ERROR"],
        );
        let mut modem = modem(link);

        let output = plugin::check_signal(&mut modem, signal_thresholds()).await;
        assert_eq!(output.to_string(), "UNKNOWN - Can't read Signal quality");

        let (link, _handle) = network(
            &["+COPS: 0,0,\"T-Mobile D\",7", "OK"],
            &["+CSQ: 99,99", "OK"],
        );
        let mut modem = self::modem(link);

        let output = plugin::check_signal(&mut modem, signal_thresholds()).await;
        assert_eq!(output.status, Status::Unknown);
        assert_eq!(output.message, "Illegal signal quality reading '99,99'");
    }

    #[tokio::test]
    async fn test_check_signal_thresholds() {
        // rssi 10 is -93 dBm, below the warning range
        let (link, _handle) = network(
            &["+COPS: 0,0,\"T-Mobile D\",2", "OK"],
            &["+CSQ: 10,99", "OK"],
        );
        let mut modem = modem(link);

        let output = plugin::check_signal(&mut modem, signal_thresholds()).await;
        assert_eq!(output.status, Status::Warning);
        assert_eq!(
            output.to_string(),
            "WARNING - T-Mobile D [UMTS] -93dBm | signal=-93dBm;-90:;-100:"
        );

        // rssi 5 is -103 dBm, below the critical range
        let (link, _handle) = network(
            &["+COPS: 0,0,\"T-Mobile D\",2", "OK"],
            &["+CSQ: 5,99", "OK"],
        );
        let mut modem = self::modem(link);

        let output = plugin::check_signal(&mut modem, signal_thresholds()).await;
        assert_eq!(output.status, Status::Critical);
        assert_eq!(output.status.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_send_notification() {
        let (link, _handle) = spawn_modem(|line| match line {
            "AT+CMGF=0" => reply(&["OK"]),
            CTRL_Z_MARK => reply(&["+CMGS: 7", "OK"]),
            _ => None,
        });
        let mut modem = modem(link);

        let output =
            plugin::send_notification(&mut modem, None, "+491721234567", "Disk full").await;
        assert_eq!(output.to_string(), "OK - SMS sent to +491721234567 (ref 7)");
    }

    #[tokio::test]
    async fn test_send_notification_rejected() {
        let (link, _handle) = spawn_modem(|line| match line {
            "AT+CMGF=0" => reply(&["OK"]),
            CTRL_Z_MARK => reply(&["+CMS ERROR: 500"]),
            _ => None,
        });
        let mut modem = modem(link);

        let output =
            plugin::send_notification(&mut modem, None, "+491721234567", "Disk full").await;
        assert_eq!(output.status, Status::Critical);
        assert_eq!(
            output.message,
            "Sending SMS to +491721234567 failed: Modem rejected AT+CMGS"
        );
    }
}
