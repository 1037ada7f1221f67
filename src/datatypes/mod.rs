mod address;
mod data_coding;
mod type_of_number;

pub use address::{AddressError, MAX_DIGITS, PhoneNumber};
pub use data_coding::{DataCoding, ProtocolId};
pub use type_of_number::TypeOfAddress;
