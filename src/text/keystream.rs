//! Salt-derived XOR keystream.
//!
//! The salt is packed into bits exactly like message text and repeated
//! cyclically over the message. This masks the bit pattern; it is not a cipher
//! (no nonce, no authentication, same salt gives the same output).

use std::time::{SystemTime, UNIX_EPOCH};

use super::bits::{BitError, BitSequence};

/// A repeating bit keystream.
///
/// # Invariants
/// - never empty (an empty salt yields no keystream at all)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystream {
    key: BitSequence,
}

impl Keystream {
    /// Builds a keystream from a salt.
    ///
    /// Returns `Ok(None)` for an empty salt, which disables obfuscation.
    pub fn from_salt(salt: &str) -> Result<Option<Self>, BitError> {
        let key = BitSequence::from_text(salt)?;
        Ok((!key.is_empty()).then_some(Self { key }))
    }

    /// Builds a keystream keeping only the low octet of each salt character.
    ///
    /// Used on the decode side, which never fails: a salt that could not have
    /// been used for encoding simply produces garbage.
    pub fn from_salt_lossy(salt: &str) -> Option<Self> {
        let octets: Vec<u8> = salt.chars().map(|ch| (ch as u32 & 0xFF) as u8).collect();
        let key = BitSequence::from_octets(&octets);
        (!key.is_empty()).then_some(Self { key })
    }

    /// Length of one keystream period in bits.
    pub fn period(&self) -> usize {
        self.key.len()
    }

    /// XORs `message` against the keystream repeated to its length.
    ///
    /// Applying the same keystream twice restores the original bits.
    pub fn apply(&self, message: &BitSequence) -> BitSequence {
        let period = self.key.len();
        message
            .iter()
            .enumerate()
            .map(|(i, bit)| bit ^ self.key.get(i % period).unwrap_or(false))
            .collect()
    }
}

/// Time-varying default salt: current Unix time in milliseconds.
pub fn time_salt() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}
