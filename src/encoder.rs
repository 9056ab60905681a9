//! Message encoding into a zero-width carrier.
//!
//! This module orchestrates the encoding process:
//! 1. Pack the message into bits (one octet per character)
//! 2. Optionally XOR the bits with a salt-derived keystream
//! 3. Map every bit to the alphabet's zero or one symbol

use thiserror::Error;
use tracing::debug;

use crate::text::bits::{BitError, BitSequence};
use crate::text::{Keystream, SymbolAlphabet};

/// Errors that can occur during encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncoderError {
    #[error("Message character {ch:?} (U+{code:04X}) at {index} is outside the 8-bit range")]
    UnrepresentableChar { ch: char, code: u32, index: usize },

    #[error("Salt character {ch:?} (U+{code:04X}) at {index} is outside the 8-bit range")]
    UnrepresentableSalt { ch: char, code: u32, index: usize },
}

impl EncoderError {
    fn message(err: BitError) -> Self {
        let BitError::OutOfRange { ch, code, index } = err;
        Self::UnrepresentableChar { ch, code, index }
    }

    fn salt(err: BitError) -> Self {
        let BitError::OutOfRange { ch, code, index } = err;
        Self::UnrepresentableSalt { ch, code, index }
    }
}

/// Configuration for the encoder.
#[derive(Debug, Clone, Default)]
pub struct EncoderConfig {
    /// Symbol pair used for the carrier.
    pub alphabet: SymbolAlphabet,
    /// Keystream salt. `None` or an empty string leaves the bits unmasked.
    pub salt: Option<String>,
}

impl EncoderConfig {
    pub fn new(alphabet: SymbolAlphabet) -> Self {
        Self {
            alphabet,
            salt: None,
        }
    }

    /// Enables keystream obfuscation with the given salt.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }
}

/// Result of encoding a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    /// The invisible carrier string - this is what gets transmitted.
    pub carrier: String,
    /// Number of carrier symbols (always 8 per message character).
    pub symbol_count: usize,
    /// Whether a keystream was applied.
    pub obfuscated: bool,
}

/// Encodes `text` as a carrier string.
///
/// With `obfuscate` set and a non-empty `salt`, the bits are XORed with the
/// salt keystream first. An empty salt turns obfuscation into a no-op.
///
/// # Errors
/// Fails if `text` (or the salt, when used) contains a character above U+00FF.
///
/// # Example
/// ```
/// use nullsms::{decode, encode, SymbolAlphabet};
///
/// let carrier = encode("Hi", SymbolAlphabet::Zwsp, false, "").unwrap();
/// assert_eq!(carrier.chars().count(), 16);
/// assert_eq!(decode(&carrier, SymbolAlphabet::Zwsp), "Hi");
/// ```
pub fn encode(
    text: &str,
    alphabet: SymbolAlphabet,
    obfuscate: bool,
    salt: &str,
) -> Result<String, EncoderError> {
    let mut config = EncoderConfig::new(alphabet);
    if obfuscate {
        config = config.with_salt(salt);
    }
    encode_with_config(text, &config).map(|encoded| encoded.carrier)
}

/// Encodes a message with custom configuration.
pub fn encode_with_config(
    text: &str,
    config: &EncoderConfig,
) -> Result<EncodedMessage, EncoderError> {
    let bits = BitSequence::from_text(text).map_err(EncoderError::message)?;

    let keystream = match config.salt.as_deref() {
        Some(salt) => Keystream::from_salt(salt).map_err(EncoderError::salt)?,
        None => None,
    };

    let bits = match &keystream {
        Some(ks) => ks.apply(&bits),
        None => bits,
    };

    debug!(
        alphabet = %config.alphabet,
        bits = bits.len(),
        obfuscated = keystream.is_some(),
        "encoded message"
    );

    let carrier: String = bits.iter().map(|bit| config.alphabet.symbol(bit)).collect();

    Ok(EncodedMessage {
        symbol_count: bits.len(),
        carrier,
        obfuscated: keystream.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::alphabet::{ZWNJ, ZWSP};

    #[test]
    fn test_encode_hi_zwsp() {
        let carrier = encode("Hi", SymbolAlphabet::Zwsp, false, "").unwrap();
        let symbols: Vec<char> = carrier.chars().collect();
        assert_eq!(symbols.len(), 16);
        // 'H' = 01001000
        assert_eq!(
            &symbols[..8],
            &[ZWSP, ZWNJ, ZWSP, ZWSP, ZWNJ, ZWSP, ZWSP, ZWSP]
        );
    }

    #[test]
    fn test_encode_length() {
        for alphabet in SymbolAlphabet::ALL {
            let carrier = encode("invisible ink", alphabet, false, "").unwrap();
            assert_eq!(carrier.chars().count(), 8 * 13);
            assert!(carrier
                .chars()
                .all(|c| c == alphabet.zero() || c == alphabet.one()));
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = encode("same", SymbolAlphabet::Braille, true, "salt").unwrap();
        let b = encode("same", SymbolAlphabet::Braille, true, "salt").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_obfuscation_changes_carrier() {
        let plain = encode("hello", SymbolAlphabet::Zwsp, false, "").unwrap();
        let masked = encode("hello", SymbolAlphabet::Zwsp, true, "k3y").unwrap();
        assert_ne!(plain, masked);
        assert_eq!(plain.chars().count(), masked.chars().count());
    }

    #[test]
    fn test_obfuscate_with_empty_salt_is_noop() {
        let plain = encode("hello", SymbolAlphabet::Zwnj, false, "").unwrap();
        let masked = encode("hello", SymbolAlphabet::Zwnj, true, "").unwrap();
        assert_eq!(plain, masked);

        let encoded =
            encode_with_config("hello", &EncoderConfig::new(SymbolAlphabet::Zwnj).with_salt(""))
                .unwrap();
        assert!(!encoded.obfuscated);
    }

    #[test]
    fn test_salt_ignored_without_obfuscate() {
        let a = encode("hello", SymbolAlphabet::Zwsp, false, "").unwrap();
        let b = encode("hello", SymbolAlphabet::Zwsp, false, "ignored").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_rejects_wide_message() {
        let err = encode("smile 🙂", SymbolAlphabet::Zwsp, false, "").unwrap_err();
        assert!(matches!(
            err,
            EncoderError::UnrepresentableChar { ch: '🙂', index: 6, .. }
        ));
    }

    #[test]
    fn test_encode_rejects_wide_salt() {
        let err = encode("ok", SymbolAlphabet::Zwsp, true, "€uro").unwrap_err();
        assert!(matches!(
            err,
            EncoderError::UnrepresentableSalt { ch: '€', index: 0, .. }
        ));
    }

    #[test]
    fn test_encode_empty_message() {
        let encoded = encode_with_config("", &EncoderConfig::default()).unwrap();
        assert_eq!(encoded.carrier, "");
        assert_eq!(encoded.symbol_count, 0);
    }
}
