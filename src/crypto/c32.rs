//! Base-32 text codec used for address payloads.
//!
//! The alphabet omits the visually ambiguous characters I, L, O and U. A
//! byte string is treated as a single big-endian unsigned integer: encoding
//! repeatedly divides it by 32 and left-pads with the zero symbol to
//! `ceil(8n/5)` characters; decoding folds the characters back and emits
//! `floor(5c/8)` bytes. The two length rules are inverses of each other, so
//! `decode(encode(b)) == b` holds for every byte string, leading zero bytes
//! included.

use std::fmt;

/// The 32-character alphabet, in value order.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Decoding failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum C32Error {
    /// A character outside the alphabet (decoding is case-sensitive)
    InvalidCharacter { character: char, position: usize },
}

impl fmt::Display for C32Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            C32Error::InvalidCharacter {
                character,
                position,
            } => {
                write!(
                    f,
                    "invalid c32 character {character:?} at position {position}"
                )
            }
        }
    }
}

impl std::error::Error for C32Error {}

/// Returns true if `character` belongs to the c32 alphabet.
pub fn is_valid_symbol(character: char) -> bool {
    symbol_value(character).is_some()
}

fn symbol_value(character: char) -> Option<u32> {
    ALPHABET
        .iter()
        .position(|&symbol| symbol as char == character)
        .map(|index| index as u32)
}

/// Encode bytes as c32 text.
///
/// The output length is `ceil(len * 8 / 5)` characters; an empty input
/// encodes to an empty string.
///
/// # Example
/// ```rust
/// use stacks_auth::crypto::c32;
///
/// assert_eq!(c32::encode(&[0xff]), "7Z");
/// assert_eq!(c32::decode("7Z").unwrap(), vec![0xff]);
/// ```
pub fn encode(data: &[u8]) -> String {
    let encoded_len = (data.len() * 8).div_ceil(5);
    let mut out = String::with_capacity(encoded_len);
    // Zero pad bits at the top make the total bit count divisible by 5.
    let mut bits = (encoded_len * 5 - data.len() * 8) as u32;
    let mut acc: u32 = 0;
    for &byte in data {
        acc = (acc << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((acc >> bits) & 0x1f) as usize] as char);
        }
        acc &= (1u32 << bits) - 1;
    }
    out
}

/// Decode c32 text back to bytes.
///
/// The output length is `floor(len * 5 / 8)` bytes. Fails on any character
/// outside the alphabet; lowercase input is rejected rather than folded.
pub fn decode(text: &str) -> Result<Vec<u8>, C32Error> {
    let mut out = vec![0u8; text.len() * 5 / 8];
    for (position, character) in text.chars().enumerate() {
        let value = symbol_value(character).ok_or(C32Error::InvalidCharacter {
            character,
            position,
        })?;
        // Multiply the accumulated integer by 32 and add the new symbol.
        let mut carry = value;
        for byte in out.iter_mut().rev() {
            carry += u32::from(*byte) << 5;
            *byte = carry as u8;
            carry >>= 8;
        }
    }
    Ok(out)
}
