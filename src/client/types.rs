// ABOUTME: Supporting types for modem sessions: configuration, AT responses and network status
// ABOUTME: Parses the information responses of +CSQ, +COPS and +COPN into typed values

use crate::client::error::{ModemError, ModemResult};
use crate::client::readiness::ReadinessConfig;
use std::fmt;
use std::time::Duration;

/// Line speeds the serial link accepts
pub const SUPPORTED_BAUD_RATES: [u32; 8] = [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200];

/// Parse a `--speed` argument
pub fn parse_baud_rate(value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .ok()
        .filter(|speed| SUPPORTED_BAUD_RATES.contains(speed))
        .ok_or_else(|| format!("Unknown speed value '{value}'"))
}

/// Everything needed to open and unlock a modem
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// Serial device, e.g. `/dev/ttyUSB0`
    pub device: String,
    /// Line speed (default 9600)
    pub baud_rate: u32,
    /// SIM PIN, entered only when the SIM asks for it
    pub pin: Option<String>,
    /// Budget for the answer to one command
    pub read_timeout: Duration,
    /// Budget for the device to accept one command
    pub write_timeout: Duration,
    pub readiness: ReadinessConfig,
}

impl ModemConfig {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            baud_rate: 9600,
            pin: None,
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            readiness: ReadinessConfig::default(),
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }
}

/// How an AT command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtStatus {
    /// `OK`
    Ok,
    /// `ERROR`, `+CME ERROR` or `+CMS ERROR`
    Error,
    /// No final result code before the timeout, or the link closed
    NoResponse,
}

impl AtStatus {
    /// Numeric form: 0 success, 1 modem rejection, -1 transport failure
    pub fn code(self) -> i8 {
        match self {
            AtStatus::Ok => 0,
            AtStatus::Error => 1,
            AtStatus::NoResponse => -1,
        }
    }
}

/// Outcome of one command round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtResponse {
    pub status: AtStatus,
    /// Information responses to the command, prefix stripped, in arrival order
    pub answers: Vec<String>,
}

impl AtResponse {
    pub fn is_ok(&self) -> bool {
        self.status == AtStatus::Ok
    }

    pub fn first(&self) -> Option<&str> {
        self.answers.first().map(String::as_str)
    }

    /// Turn anything but `OK` into an error naming `command`
    pub fn into_ok(self, command: &str) -> ModemResult<Self> {
        match self.status {
            AtStatus::Ok => Ok(self),
            AtStatus::Error => Err(ModemError::Rejected {
                command: command.to_string(),
            }),
            AtStatus::NoResponse => Err(ModemError::NoResponse {
                command: command.to_string(),
            }),
        }
    }
}

/// Received signal strength indication from `+CSQ`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalQuality {
    /// 0..=31
    pub rssi: u8,
}

impl SignalQuality {
    /// Parses the `<rssi>,<ber>` answer; 99 ("not known") and anything
    /// outside 0..=31 is rejected.
    pub fn parse(answer: &str) -> ModemResult<Self> {
        let rssi = answer
            .split(',')
            .next()
            .map(str::trim)
            .and_then(|value| value.parse::<u8>().ok())
            .filter(|rssi| *rssi <= 31)
            .ok_or_else(|| ModemError::InvalidSignal(answer.to_string()))?;
        Ok(Self { rssi })
    }

    /// Signal level in dBm, -113 to -51
    pub fn dbm(self) -> i32 {
        i32::from(self.rssi) * 2 - 113
    }
}

/// Radio access technology reported by `+COPS?`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkTechnology {
    Gsm,
    Umts,
    Edge,
    Hsdpa,
    Hsupa,
    Hspa,
    Lte,
    FiveGOrNewer,
}

impl NetworkTechnology {
    /// Maps the `<AcT>` field; a modem that omits it only speaks GSM
    pub fn from_act(act: Option<&str>) -> Self {
        match act.map(str::trim) {
            None | Some("") | Some("0") | Some("1") => NetworkTechnology::Gsm,
            Some("2") => NetworkTechnology::Umts,
            Some("3") => NetworkTechnology::Edge,
            Some("4") => NetworkTechnology::Hsdpa,
            Some("5") => NetworkTechnology::Hsupa,
            Some("6") => NetworkTechnology::Hspa,
            Some("7") => NetworkTechnology::Lte,
            Some(_) => NetworkTechnology::FiveGOrNewer,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NetworkTechnology::Gsm => "GSM",
            NetworkTechnology::Umts => "UMTS",
            NetworkTechnology::Edge => "EDGE",
            NetworkTechnology::Hsdpa => "HSDPA",
            NetworkTechnology::Hsupa => "HSUPA",
            NetworkTechnology::Hspa => "HSPA",
            NetworkTechnology::Lte => "LTE",
            NetworkTechnology::FiveGOrNewer => "5G or newer",
        }
    }
}

impl fmt::Display for NetworkTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `<format>` of the `+COPS?` answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFormat {
    LongAlphanumeric,
    ShortAlphanumeric,
    Numeric,
}

impl OperatorFormat {
    fn from_field(field: &str) -> Option<Self> {
        match field.trim() {
            "0" => Some(OperatorFormat::LongAlphanumeric),
            "1" => Some(OperatorFormat::ShortAlphanumeric),
            "2" => Some(OperatorFormat::Numeric),
            _ => None,
        }
    }
}

/// Parsed `+COPS: <mode>[,<format>,<oper>[,<AcT>]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSelection {
    pub format: OperatorFormat,
    /// Operator as reported, quotes removed
    pub operator: String,
    pub technology: NetworkTechnology,
}

impl OperatorSelection {
    /// `Offline` when only the mode is reported
    pub fn parse(answer: &str) -> ModemResult<Self> {
        let fields = split_fields(answer);
        if fields.len() < 3 {
            return Err(ModemError::Offline);
        }

        let format =
            OperatorFormat::from_field(&fields[1]).ok_or_else(|| ModemError::UnexpectedAnswer {
                command: "+COPS".to_string(),
                answer: answer.to_string(),
            })?;

        Ok(Self {
            format,
            operator: fields[2].clone(),
            technology: NetworkTechnology::from_act(fields.get(3).map(String::as_str)),
        })
    }
}

/// Registered operator, resolved to a display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub name: String,
    pub technology: NetworkTechnology,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.technology)
    }
}

/// Finds the long name for a numeric operator code in `+COPN` answers
/// (`"26201","T-Mobile D"`).
pub fn lookup_operator_name(answers: &[String], numeric: &str) -> Option<String> {
    answers.iter().find_map(|answer| {
        let fields = split_fields(answer);
        match fields.as_slice() {
            [code, name, ..] if code == numeric => Some(name.clone()),
            _ => None,
        }
    })
}

/// Splits a comma-separated answer, honouring double quotes and removing them.
fn split_fields(answer: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in answer.chars() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
