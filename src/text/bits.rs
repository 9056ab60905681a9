//! Bit packing for the zero-width codec.
//!
//! Every character becomes exactly one octet, most significant bit first, so a
//! sequence built from text is always `8 * chars` long. Only code points up to
//! U+00FF fit in an octet; anything wider is reported back to the caller
//! instead of being silently truncated.

use thiserror::Error;

use crate::{BITS_PER_CHAR, MAX_CODE_POINT};

/// Errors produced while packing text into bits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    #[error("character {ch:?} (U+{code:04X}) at position {index} does not fit in 8 bits")]
    OutOfRange { ch: char, code: u32, index: usize },
}

/// Ordered sequence of single bits.
///
/// # Invariants
/// - `len()` is always a multiple of 8
/// - bit `i` of octet `n` lives at index `n * 8 + i`, MSB first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSequence {
    bits: Vec<bool>,
}

impl BitSequence {
    /// Packs text, one octet per character.
    ///
    /// # Errors
    /// Returns `BitError::OutOfRange` for the first character above U+00FF.
    pub fn from_text(text: &str) -> Result<Self, BitError> {
        let mut bits = Vec::with_capacity(text.len() * BITS_PER_CHAR);

        for (index, ch) in text.chars().enumerate() {
            let code = ch as u32;
            if code > MAX_CODE_POINT {
                return Err(BitError::OutOfRange { ch, code, index });
            }
            push_octet(&mut bits, code as u8);
        }

        Ok(Self { bits })
    }

    /// Packs raw octets.
    pub fn from_octets(octets: &[u8]) -> Self {
        let mut bits = Vec::with_capacity(octets.len() * BITS_PER_CHAR);
        for &octet in octets {
            push_octet(&mut bits, octet);
        }
        Self { bits }
    }

    /// Number of bits in the sequence.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True if the sequence holds no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Iterates over the bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Regroups the bits into octets.
    pub fn to_octets(&self) -> Vec<u8> {
        self.bits
            .chunks(BITS_PER_CHAR)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
            .collect()
    }

    /// Reads every octet back as a code point in U+0000..=U+00FF.
    pub fn to_text(&self) -> String {
        self.to_octets().into_iter().map(char::from).collect()
    }

    /// Renders the bits as `0`/`1` digits with a space between octets.
    pub fn to_binary_string(&self) -> String {
        self.bits
            .chunks(BITS_PER_CHAR)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|&bit| if bit { '1' } else { '0' })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromIterator<bool> for BitSequence {
    /// Collects bits as-is. Callers keep the multiple-of-8 invariant by
    /// mapping over an existing sequence.
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

fn push_octet(bits: &mut Vec<bool>, octet: u8) {
    for shift in (0..BITS_PER_CHAR).rev() {
        bits.push((octet >> shift) & 1 == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_msb_first() {
        let bits = BitSequence::from_text("Hi").unwrap();
        assert_eq!(bits.len(), 16);
        assert_eq!(bits.to_binary_string(), "01001000 01101001");
    }

    #[test]
    fn test_length_is_eight_per_char() {
        let text = "héllo wörld ÿ";
        let bits = BitSequence::from_text(text).unwrap();
        assert_eq!(bits.len(), 8 * text.chars().count());
    }

    #[test]
    fn test_rejects_wide_characters() {
        let err = BitSequence::from_text("ok€").unwrap_err();
        assert_eq!(
            err,
            BitError::OutOfRange {
                ch: '€',
                code: 0x20AC,
                index: 2
            }
        );
    }

    #[test]
    fn test_latin1_upper_bound_is_accepted() {
        let bits = BitSequence::from_text("\u{FF}").unwrap();
        assert_eq!(bits.to_octets(), vec![0xFF]);
    }

    #[test]
    fn test_octets_back_to_text() {
        let bits = BitSequence::from_octets(&[0x48, 0x69, 0xE9]);
        assert_eq!(bits.to_text(), "Hié");
    }

    #[test]
    fn test_empty_text() {
        let bits = BitSequence::from_text("").unwrap();
        assert!(bits.is_empty());
        assert_eq!(bits.to_text(), "");
    }
}
