// ABOUTME: Notification command that sends one SMS through a serial GSM modem in PDU mode
// ABOUTME: Takes the text from --msg or a template file and reports the outcome as a status line

use argh::FromArgs;
use sms_modem::check::CheckOutput;
use sms_modem::client::{ModemBuilder, ModemConfig, parse_baud_rate};
use sms_modem::codec::{Encodable, SubmitPdu};
use sms_modem::plugin;
use std::time::Duration;
use tracing::{Level, warn};
use tracing_subscriber::FmtSubscriber;

/// Send a notification SMS through a serial GSM modem
#[derive(FromArgs)]
struct CliArgs {
    /// serial device the modem is attached to
    #[argh(option, short = 'S')]
    serial: String,

    /// line speed (default: 9600)
    #[argh(option, short = 's', default = "String::from(\"9600\")")]
    speed: String,

    /// the SIM PIN, used only when the SIM asks for it
    #[argh(option, short = 'P')]
    pin: Option<String>,

    /// recipient phone number, international numbers with a leading +
    #[argh(option, short = 'n')]
    number: String,

    /// message text
    #[argh(option, short = 'm')]
    msg: Option<String>,

    /// file holding the message text
    #[argh(option, short = 'T')]
    template: Option<String>,

    /// service centre number overriding the one stored on the SIM
    #[argh(option)]
    smsc: Option<String>,

    /// seconds before giving up (default: 10)
    #[argh(option, short = 't', default = "10")]
    timeout: u64,

    /// increase log verbosity, repeatable
    #[argh(switch, short = 'v')]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli_args: CliArgs = argh::from_env();
    init_tracing(cli_args.verbose);

    run(cli_args).await.exit()
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("setting default subscriber failed");
    }
}

async fn run(cli_args: CliArgs) -> CheckOutput {
    let baud_rate = match parse_baud_rate(&cli_args.speed) {
        Ok(baud_rate) => baud_rate,
        Err(e) => return CheckOutput::unknown(e),
    };
    let text = plugin::message_text(cli_args.msg.as_deref(), cli_args.template.as_deref());
    let text = match text.await {
        Ok(text) => text,
        Err(e) => return CheckOutput::unknown(e),
    };

    // Validate before touching the device
    let encoded = SubmitPdu::parse(cli_args.smsc.as_deref(), &cli_args.number, &text)
        .and_then(|pdu| pdu.to_hex());
    if let Err(e) = encoded {
        return CheckOutput::unknown(e.to_string());
    }

    let mut config = ModemConfig::new(cli_args.serial.clone()).with_baud_rate(baud_rate);
    if let Some(pin) = &cli_args.pin {
        config = config.with_pin(pin.clone());
    }

    let timeout = Duration::from_secs(cli_args.timeout);
    let send = send_sms(&config, cli_args.smsc.as_deref(), &cli_args.number, &text);
    match tokio::time::timeout(timeout, send).await {
        Ok(output) => output,
        Err(_) => CheckOutput::critical(format!(
            "Plugin timed out after {} seconds",
            cli_args.timeout
        )),
    }
}

async fn send_sms(
    config: &ModemConfig,
    smsc: Option<&str>,
    number: &str,
    text: &str,
) -> CheckOutput {
    let mut modem = match ModemBuilder::open(config).await {
        Ok(modem) => modem,
        Err(e) => return plugin::startup_failure(e),
    };

    let output = plugin::send_notification(&mut modem, smsc, number, text).await;

    if let Err(e) = modem.close().await {
        warn!("Closing modem: {}", e);
    }
    output
}
