// ABOUTME: Monitoring check for the signal strength and network registration of a serial GSM modem
// ABOUTME: Unlocks the SIM if needed, queries operator and signal, and reports against dBm thresholds

use argh::FromArgs;
use sms_modem::check::{CheckOutput, Range, Thresholds};
use sms_modem::client::{ModemBuilder, ModemConfig, parse_baud_rate};
use sms_modem::plugin;
use std::time::Duration;
use tracing::{Level, warn};
use tracing_subscriber::FmtSubscriber;

/// Check GSM signal quality and network registration of a serial modem
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

    /// warning range in dBm (default: -90:)
    #[argh(option, short = 'w', default = "String::from(\"-90:\")")]
    warning: String,

    /// critical range in dBm (default: -100:)
    #[argh(option, short = 'c', default = "String::from(\"-100:\")")]
    critical: String,

    /// seconds before the check gives up (default: 10)
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
    let thresholds = match (
        cli_args.warning.parse::<Range>(),
        cli_args.critical.parse::<Range>(),
    ) {
        (Ok(warning), Ok(critical)) => Thresholds::new(Some(warning), Some(critical)),
        (Err(e), _) | (_, Err(e)) => return CheckOutput::unknown(e.to_string()),
    };
    let baud_rate = match parse_baud_rate(&cli_args.speed) {
        Ok(baud_rate) => baud_rate,
        Err(e) => return CheckOutput::unknown(e),
    };

    let mut config = ModemConfig::new(cli_args.serial).with_baud_rate(baud_rate);
    if let Some(pin) = cli_args.pin {
        config = config.with_pin(pin);
    }

    let timeout = Duration::from_secs(cli_args.timeout);
    match tokio::time::timeout(timeout, check_signal(&config, thresholds)).await {
        Ok(output) => output,
        Err(_) => CheckOutput::critical(format!(
            "Plugin timed out after {} seconds",
            cli_args.timeout
        )),
    }
}

async fn check_signal(config: &ModemConfig, thresholds: Thresholds) -> CheckOutput {
    let mut modem = match ModemBuilder::open(config).await {
        Ok(modem) => modem,
        Err(e) => return plugin::startup_failure(e),
    };

    let output = plugin::check_signal(&mut modem, thresholds).await;

    if let Err(e) = modem.close().await {
        warn!("Closing modem: {}", e);
    }
    output
}
