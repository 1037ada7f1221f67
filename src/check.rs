// ABOUTME: Monitoring plugin conventions: service states, threshold ranges and performance data
// ABOUTME: Renders the single status line and exit code a monitoring host expects from a check

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Plugin-level errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("Invalid range '{0}'")]
    InvalidRange(String),
}

/// Service state, ordered by severity except for `Unknown`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Threshold range in the usual plugin syntax `[@][start|~]:[end]`
///
/// * `10` means `0:10`
/// * `10:` means 10 to infinity
/// * `~:10` means negative infinity to 10
/// * `@10:20` alerts inside the range instead of outside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub start: f64,
    pub end: f64,
    pub inside: bool,
}

impl Range {
    /// True when `value` should raise this range's state
    pub fn alerts(&self, value: f64) -> bool {
        let within = self.start <= value && value <= self.end;
        within == self.inside
    }
}

impl FromStr for Range {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CheckError::InvalidRange(s.to_string());
        let text = s.trim();
        let (inside, text) = match text.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if text.is_empty() {
            return Err(invalid());
        }

        let (start, end) = match text.split_once(':') {
            Some((start, end)) => {
                let start = match start {
                    "~" => f64::NEG_INFINITY,
                    "" => 0.0,
                    value => value.parse().map_err(|_| invalid())?,
                };
                let end = match end {
                    "" => f64::INFINITY,
                    value => value.parse().map_err(|_| invalid())?,
                };
                (start, end)
            }
            None => (0.0, text.parse().map_err(|_| invalid())?),
        };

        if start.is_nan() || end.is_nan() || start > end {
            return Err(invalid());
        }
        Ok(Range { start, end, inside })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inside {
            f.write_str("@")?;
        }
        match (self.start == f64::NEG_INFINITY, self.end == f64::INFINITY) {
            (true, true) => write!(f, "~:"),
            (true, false) => write!(f, "~:{}", self.end),
            (false, true) => write!(f, "{}:", self.start),
            (false, false) if self.start == 0.0 => write!(f, "{}", self.end),
            (false, false) => write!(f, "{}:{}", self.start, self.end),
        }
    }
}

/// Warning and critical ranges of one metric
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thresholds {
    pub warning: Option<Range>,
    pub critical: Option<Range>,
}

impl Thresholds {
    pub fn new(warning: Option<Range>, critical: Option<Range>) -> Self {
        Self { warning, critical }
    }

    /// Critical wins over warning
    pub fn status(&self, value: f64) -> Status {
        if self.critical.is_some_and(|range| range.alerts(value)) {
            Status::Critical
        } else if self.warning.is_some_and(|range| range.alerts(value)) {
            Status::Warning
        } else {
            Status::Ok
        }
    }
}

/// One performance data item, `label=VALUEunit;warn;crit`
#[derive(Debug, Clone, PartialEq)]
pub struct PerfData {
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub thresholds: Thresholds,
}

impl PerfData {
    pub fn new(label: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            unit: unit.into(),
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.contains(['\'', '=', ' ']) {
            write!(f, "'{}'", self.label.replace('\'', "''"))?;
        } else {
            f.write_str(&self.label)?;
        }
        write!(f, "={}{};", self.value, self.unit)?;
        if let Some(warning) = self.thresholds.warning {
            write!(f, "{warning}")?;
        }
        f.write_str(";")?;
        if let Some(critical) = self.thresholds.critical {
            write!(f, "{critical}")?;
        }
        Ok(())
    }
}

/// Final result of a check run
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutput {
    pub status: Status,
    pub message: String,
    pub perfdata: Vec<PerfData>,
}

impl CheckOutput {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            perfdata: Vec::new(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Status::Ok, message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Status::Critical, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(Status::Unknown, message)
    }

    pub fn with_perfdata(mut self, perfdata: PerfData) -> Self {
        self.perfdata.push(perfdata);
        self
    }

    /// Print the status line to stdout and terminate with the status code
    pub fn exit(self) -> ! {
        println!("{self}");
        std::process::exit(self.status.exit_code())
    }
}

impl fmt::Display for CheckOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.status, self.message)?;
        if !self.perfdata.is_empty() {
            f.write_str(" |")?;
            for perfdata in &self.perfdata {
                write!(f, " {perfdata}")?;
            }
        }
        Ok(())
    }
}
