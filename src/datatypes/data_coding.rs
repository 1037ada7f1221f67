// ABOUTME: TP-PID and TP-DCS octets written after the destination address of an SMS-SUBMIT
// ABOUTME: Only the GSM 7-bit default alphabet is produced by this crate

use std::fmt;

/// TP-Data-Coding-Scheme octet
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum DataCoding {
    /// GSM 7-bit default alphabet, no message class
    #[default]
    Gsm7Default = 0x00,
}

impl DataCoding {
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Maximum number of septets (or octets for 8-bit schemes) in one SMS
    pub fn max_single_sms_length(self) -> usize {
        match self {
            DataCoding::Gsm7Default => 160,
        }
    }

    pub fn charset_name(self) -> &'static str {
        match self {
            DataCoding::Gsm7Default => "GSM 7-bit Default",
        }
    }
}

/// TP-Protocol-Identifier octet
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum ProtocolId {
    /// Plain short message, no interworking
    #[default]
    Default = 0x00,
}

impl fmt::Display for DataCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.charset_name(), self.to_byte())
    }
}
