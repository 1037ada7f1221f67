//! AT response line classification
//!
//! A modem answers every command with zero or more information lines
//! followed by exactly one final result code. `Line` tells the two apart.

use std::fmt;

/// One non-empty line received from the modem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Final result `OK`
    Ok,
    /// Final result `ERROR`
    Error,
    /// Final result `+CME ERROR: <err>` (equipment/SIM failure)
    CmeError(String),
    /// Final result `+CMS ERROR: <err>` (message service failure)
    CmsError(String),
    /// Anything else: echoes, information responses, unsolicited codes
    Data(String),
}

impl Line {
    pub fn parse(line: &str) -> Line {
        if line == "OK" {
            return Line::Ok;
        }
        if line == "ERROR" {
            return Line::Error;
        }
        if let Some(reason) = line.strip_prefix("+CME ERROR:") {
            return Line::CmeError(reason.trim().to_string());
        }
        if let Some(reason) = line.strip_prefix("+CMS ERROR:") {
            return Line::CmsError(reason.trim().to_string());
        }
        Line::Data(line.to_string())
    }

    /// True for the result codes that end a command
    pub fn is_final(&self) -> bool {
        !matches!(self, Line::Data(_))
    }

    /// Payload of an information response to `command`, with the command
    /// name, its colon and any following blanks removed.
    ///
    /// `+CSQ: 17,99` for `+CSQ` yields `17,99`. An empty command never
    /// matches since every line would.
    pub fn answer_to(&self, command: &str) -> Option<&str> {
        let Line::Data(text) = self else {
            return None;
        };
        if command.is_empty() {
            return None;
        }
        let rest = text.strip_prefix(command)?;
        let rest = rest.strip_prefix(':').unwrap_or(rest);
        Some(rest.trim_start())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Ok => write!(f, "OK"),
            Line::Error => write!(f, "ERROR"),
            Line::CmeError(reason) => write!(f, "+CME ERROR: {reason}"),
            Line::CmsError(reason) => write!(f, "+CMS ERROR: {reason}"),
            Line::Data(text) => write!(f, "{text}"),
        }
    }
}
