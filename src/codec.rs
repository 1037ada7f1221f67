// SMS-SUBMIT PDU codec - separates the wire format from the domain types
//
// Each PDU part (address, user data, the SUBMIT itself) implements Encodable
// and writes raw octets into a BytesMut. The modem takes the PDU as
// uppercase hex text, which `to_hex` produces from those octets.

use crate::datatypes::{
    AddressError, DataCoding, PhoneNumber, ProtocolId, TypeOfAddress,
};
use crate::gsm7;
use bytes::{BufMut, BytesMut};
use thiserror::Error;

/// SMS-SUBMIT first octet: TP-MTI = SUBMIT, TP-RD set, no validity period
pub const FIRST_OCTET_SUBMIT: u8 = 0x05;

/// TP-MR; zero lets the modem assign the reference
pub const MESSAGE_REFERENCE: u8 = 0x00;

/// Trait for PDU parts that can be encoded to octets
pub trait Encodable {
    /// Encode this part to the buffer
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError>;

    /// Calculate the encoded size without keeping the encoding
    fn encoded_size(&self) -> usize {
        let mut buf = BytesMut::new();
        self.encode(&mut buf).map(|_| buf.len()).unwrap_or(0)
    }

    /// Encode to the uppercase hex text the modem expects
    fn to_hex(&self) -> Result<String, CodecError> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(hex::encode_upper(&buf))
    }
}

/// Codec errors with detailed context for debugging
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("Message too long for {coding}: {septets} septets (max {max})")]
    TextTooLong {
        coding: DataCoding,
        septets: usize,
        max: usize,
    },

    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Unknown type of address: {0:#04x}")]
    UnknownTypeOfAddress(u8),
}

/// Type octet followed by semi-octet digits; the length field is written by
/// whoever embeds the address since SMSC and destination count differently.
impl Encodable for PhoneNumber {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        buf.put_u8(self.type_of_address() as u8);
        buf.put_slice(&self.semi_octets());
        Ok(())
    }
}

/// GSM-7 user data: septet count followed by the packed septets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    data_coding: DataCoding,
    septets: Vec<u8>,
}

impl UserData {
    /// Characters with no GSM-7 representation are dropped.
    pub fn from_text(text: &str) -> Self {
        Self {
            data_coding: DataCoding::Gsm7Default,
            septets: gsm7::to_septets(text),
        }
    }

    pub fn data_coding(&self) -> DataCoding {
        self.data_coding
    }

    /// The TP-UDL value: septets, escapes counted separately
    pub fn septet_count(&self) -> usize {
        self.septets.len()
    }

    pub fn packed(&self) -> BytesMut {
        let mut out = BytesMut::with_capacity(self.septets.len() * 7 / 8 + 1);
        gsm7::pack_septets(&self.septets, &mut out);
        out
    }
}

impl Encodable for UserData {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let max = self.data_coding.max_single_sms_length();
        if self.septets.len() > max {
            return Err(CodecError::TextTooLong {
                coding: self.data_coding,
                septets: self.septets.len(),
                max,
            });
        }
        buf.put_u8(self.septets.len() as u8);
        buf.put_slice(&self.packed());
        Ok(())
    }
}

/// An SMS-SUBMIT as handed to `AT+CMGS` in PDU mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitPdu {
    /// Service centre; `None` uses the one stored on the SIM
    pub smsc: Option<PhoneNumber>,
    pub destination: PhoneNumber,
    pub protocol_id: ProtocolId,
    pub user_data: UserData,
}

impl SubmitPdu {
    pub fn new(smsc: Option<PhoneNumber>, destination: PhoneNumber, text: &str) -> Self {
        Self {
            smsc,
            destination,
            protocol_id: ProtocolId::default(),
            user_data: UserData::from_text(text),
        }
    }

    /// Parses the textual numbers, rejecting anything that is not a digit.
    pub fn parse(smsc: Option<&str>, destination: &str, text: &str) -> Result<Self, CodecError> {
        let smsc = smsc.map(PhoneNumber::parse).transpose()?;
        let destination = PhoneNumber::parse(destination)?;
        Ok(Self::new(smsc, destination, text))
    }

    /// Octets of the SMSC information field, length octet included
    pub fn smsc_len(&self) -> usize {
        1 + self.smsc.as_ref().map_or(0, Encodable::encoded_size)
    }

    /// Length argument for `AT+CMGS`: the TPDU without the SMSC field
    pub fn tpdu_len(&self) -> usize {
        self.encoded_size().saturating_sub(self.smsc_len())
    }
}

impl Encodable for SubmitPdu {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        match &self.smsc {
            Some(smsc) => {
                buf.put_u8(smsc.encoded_size() as u8);
                smsc.encode(buf)?;
            }
            None => buf.put_u8(0x00),
        }

        buf.put_u8(FIRST_OCTET_SUBMIT);
        buf.put_u8(MESSAGE_REFERENCE);

        buf.put_u8(self.destination.len() as u8);
        self.destination.encode(buf)?;

        buf.put_u8(self.protocol_id as u8);
        buf.put_u8(self.user_data.data_coding().to_byte());

        self.user_data.encode(buf)
    }
}

/// Encode a phone number per TS 24.011: type octet plus semi-octet digits.
///
/// `+49172123456` becomes `919471123254F6`.
pub fn encode_number(number: &str) -> Result<String, CodecError> {
    PhoneNumber::parse(number)?.to_hex()
}

/// Encode text as GSM-7 with a leading septet-count octet.
///
/// Unmappable characters are skipped rather than reported. Text that does
/// not fit a single SMS fails with [`CodecError::TextTooLong`].
pub fn encode_text(text: &str) -> Result<String, CodecError> {
    UserData::from_text(text).to_hex()
}

/// Encode a complete SMS-SUBMIT PDU as uppercase hex.
pub fn encode_pdu(smsc: Option<&str>, number: &str, text: &str) -> Result<String, CodecError> {
    SubmitPdu::parse(smsc, number, text)?.to_hex()
}

/// Reverse of [`encode_number`], returning the number with `+` when international.
pub fn decode_number(encoded: &str) -> Result<String, CodecError> {
    let octets =
        hex::decode(encoded).map_err(|e| CodecError::InvalidHex(format!("'{encoded}' ({e})")))?;
    let (&type_octet, digits) = octets
        .split_first()
        .ok_or_else(|| CodecError::InvalidHex(format!("'{encoded}' (no type octet)")))?;

    let mut number = String::with_capacity(digits.len() * 2 + 1);
    match TypeOfAddress::try_from(type_octet) {
        Ok(TypeOfAddress::International) => number.push('+'),
        Ok(TypeOfAddress::Unknown) => {}
        Err(_) => return Err(CodecError::UnknownTypeOfAddress(type_octet)),
    }

    for octet in digits {
        for nibble in [octet & 0x0F, octet >> 4] {
            match nibble {
                0..=9 => number.push(char::from(b'0' + nibble)),
                0x0F => break,
                _ => return Err(CodecError::InvalidHex(format!("'{encoded}' (bad digit)"))),
            }
        }
    }
    Ok(number)
}
