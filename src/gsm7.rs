// ABOUTME: GSM 7-bit default alphabet and extension table from 3GPP TS 23.038
// ABOUTME: Maps Unicode text to septets and packs them little-endian into octets

use bytes::{BufMut, BytesMut};

/// Septet that switches the next septet to the extension table
pub const ESCAPE: u8 = 0x1B;

/// Default alphabet, indexed by septet value. Slot 0x1B is the escape code and
/// never matches input text.
const DEFAULT_ALPHABET: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å', // 0x00
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{1B}', 'Æ', 'æ', 'ß', 'É', // 0x10
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', // 0x20
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?', // 0x30
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', // 0x40
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§', // 0x50
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', // 0x60
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à', // 0x70
];

/// Where a character lives in GSM-7
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Septet {
    /// One septet from the default alphabet
    Default(u8),
    /// Escape followed by this extension table index
    Extended(u8),
}

impl Septet {
    /// Number of septets this character occupies on the wire
    pub fn width(self) -> usize {
        match self {
            Septet::Default(_) => 1,
            Septet::Extended(_) => 2,
        }
    }
}

/// Looks `c` up in the default alphabet first, then in the extension table.
pub fn lookup(c: char) -> Option<Septet> {
    if let Some(index) = DEFAULT_ALPHABET
        .iter()
        .position(|&entry| entry == c)
        .filter(|&index| index != ESCAPE as usize)
    {
        return Some(Septet::Default(index as u8));
    }

    extension_index(c).map(Septet::Extended)
}

fn extension_index(c: char) -> Option<u8> {
    let index = match c {
        '\u{0C}' => 0x0A,
        '^' => 0x14,
        '{' => 0x28,
        '}' => 0x29,
        '\\' => 0x2F,
        '[' => 0x3C,
        '~' => 0x3D,
        ']' => 0x3E,
        '|' => 0x40,
        '€' => 0x65,
        _ => return None,
    };
    Some(index)
}

/// True if `c` has a GSM-7 representation
pub fn is_encodable(c: char) -> bool {
    lookup(c).is_some()
}

/// Converts text to septet values. Characters without a GSM-7 representation
/// are dropped; the result is lossy for such input.
pub fn to_septets(text: &str) -> Vec<u8> {
    let mut septets = Vec::with_capacity(text.len());
    for c in text.chars() {
        match lookup(c) {
            Some(Septet::Default(value)) => septets.push(value),
            Some(Septet::Extended(value)) => {
                septets.push(ESCAPE);
                septets.push(value);
            }
            None => {}
        }
    }
    septets
}

/// Septets `text` occupies once encoded, skipped characters excluded
pub fn septet_count(text: &str) -> usize {
    text.chars().filter_map(lookup).map(Septet::width).sum()
}

/// Accumulates septets and emits octets as soon as eight bits are available.
#[derive(Debug)]
pub struct SeptetPacker<'a> {
    out: &'a mut BytesMut,
    bits: u32,
    pending: u32,
}

impl<'a> SeptetPacker<'a> {
    pub fn new(out: &'a mut BytesMut) -> Self {
        Self {
            out,
            bits: 0,
            pending: 0,
        }
    }

    pub fn push(&mut self, septet: u8) {
        self.bits |= u32::from(septet & 0x7F) << self.pending;
        self.pending += 7;
        while self.pending >= 8 {
            self.out.put_u8((self.bits & 0xFF) as u8);
            self.bits >>= 8;
            self.pending -= 8;
        }
    }

    /// Writes the trailing partial octet, high bits zero.
    pub fn finish(self) {
        if self.pending > 0 {
            self.out.put_u8((self.bits & 0xFF) as u8);
        }
    }
}

/// Packs septets into octets, little-endian bit order.
pub fn pack_septets(septets: &[u8], out: &mut BytesMut) {
    let mut packer = SeptetPacker::new(out);
    for &septet in septets {
        packer.push(septet);
    }
    packer.finish();
}
