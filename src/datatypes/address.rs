// ABOUTME: Strongly-typed GSM phone numbers with digit validation and type-of-address selection
// ABOUTME: Provides the semi-octet representation used by the SMSC and destination address fields

use crate::datatypes::TypeOfAddress;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest address TP-DA can carry (10 octets of semi-octets).
pub const MAX_DIGITS: usize = 20;

/// A validated phone number: decimal digits, optionally in international form.
///
/// The leading `+` is not stored; it only selects [`TypeOfAddress::International`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhoneNumber {
    digits: [u8; MAX_DIGITS],
    length: u8,
    international: bool,
}

impl PhoneNumber {
    /// Parses `+4917...` or `0172...` style numbers.
    ///
    /// Anything other than ASCII digits after the optional `+` is rejected,
    /// so a typo never turns into a silently corrupted address.
    pub fn parse(number: &str) -> Result<Self, AddressError> {
        let (international, body) = match number.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, number),
        };

        if body.is_empty() {
            return Err(AddressError::Empty);
        }

        if body.len() > MAX_DIGITS {
            return Err(AddressError::TooLong {
                max_len: MAX_DIGITS,
                actual_len: body.len(),
            });
        }

        let mut digits = [0u8; MAX_DIGITS];
        for (position, c) in body.chars().enumerate() {
            let digit = c
                .to_digit(10)
                .ok_or(AddressError::InvalidDigit { position, found: c })?;
            digits[position] = digit as u8;
        }

        Ok(Self {
            digits,
            length: body.len() as u8,
            international,
        })
    }

    /// Returns the digit values (0-9), without the `+`
    pub fn digits(&self) -> &[u8] {
        &self.digits[..self.length as usize]
    }

    /// Number of digits, which is what the address-length field counts
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Always false for a parsed number; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_international(&self) -> bool {
        self.international
    }

    pub fn type_of_address(&self) -> TypeOfAddress {
        if self.international {
            TypeOfAddress::International
        } else {
            TypeOfAddress::Unknown
        }
    }

    /// Digits packed two per octet, low nibble first, odd tail padded with `0xF`.
    pub fn semi_octets(&self) -> Vec<u8> {
        self.digits()
            .chunks(2)
            .map(|pair| {
                let high = pair.get(1).copied().unwrap_or(0x0F);
                (high << 4) | pair[0]
            })
            .collect()
    }
}

/// Errors that can occur when parsing a phone number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Phone number contains no digits")]
    Empty,

    #[error("Phone number too long: {actual_len} digits (max {max_len})")]
    TooLong { max_len: usize, actual_len: usize },

    #[error("Invalid character '{found}' at position {position} in phone number")]
    InvalidDigit { position: usize, found: char },
}

impl FromStr for PhoneNumber {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.international {
            write!(f, "+")?;
        }
        for digit in self.digits() {
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhoneNumber(\"{self}\")")
    }
}
