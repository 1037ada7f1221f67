use num_enum::TryFromPrimitive;

/// Type-of-address octet preceding the semi-octet digits (TS 24.008 10.5.4.7),
/// extension bit set, numbering plan ISDN/E.164.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeOfAddress {
    Unknown = 0x81,
    International = 0x91,
}
