//! Carrier decoding back into text.
//!
//! Decoding is best-effort and NEVER returns an error:
//! 1. Scan the input for groups of exactly 8 consecutive alphabet symbols
//! 2. Any other character breaks the current group; partial groups are dropped
//! 3. Each group becomes one octet (zero symbol = 0, MSB first)
//! 4. Optionally XOR the octets' bits with the salt keystream
//! 5. Read every octet as a code point in U+0000..=U+00FF
//!
//! A malformed carrier yields a partial or empty message, not corrupted state.

use tracing::debug;

use crate::text::{BitSequence, Keystream, SymbolAlphabet};
use crate::BITS_PER_CHAR;

/// Result of decoding a carrier.
/// Note: This is ALWAYS returned, even for input with no recognizable groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// The recovered text.
    pub message: String,
    /// Number of complete 8-symbol groups found.
    pub groups: usize,
    /// Number of alphabet symbols that were left over in incomplete groups.
    pub dropped_symbols: usize,
}

/// Configuration for the decoder.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Symbol pair the carrier was written with.
    pub alphabet: SymbolAlphabet,
    /// Keystream salt to reverse. `None` leaves the bits as found.
    pub salt: Option<String>,
}

/// Decodes a carrier string. Never reverses a keystream.
///
/// Carriers produced with obfuscation come back masked; use
/// [`decode_with_salt`] to undo the keystream.
pub fn decode(carrier: &str, alphabet: SymbolAlphabet) -> String {
    decode_with_config(
        carrier,
        &DecoderConfig {
            alphabet,
            salt: None,
        },
    )
    .message
}

/// Decodes a carrier and reverses the keystream derived from `salt`.
///
/// With the wrong salt the output is garbage, not an error.
pub fn decode_with_salt(carrier: &str, alphabet: SymbolAlphabet, salt: &str) -> String {
    decode_with_config(
        carrier,
        &DecoderConfig {
            alphabet,
            salt: Some(salt.to_string()),
        },
    )
    .message
}

/// Decodes a carrier with custom configuration.
/// NEVER returns an error - always produces output.
pub fn decode_with_config(carrier: &str, config: &DecoderConfig) -> DecodedMessage {
    let (octets, dropped_symbols) = extract_octets(carrier, config.alphabet);
    let groups = octets.len();

    let bits = BitSequence::from_octets(&octets);
    let bits = match config.salt.as_deref().and_then(Keystream::from_salt_lossy) {
        Some(ks) => ks.apply(&bits),
        None => bits,
    };

    debug!(
        alphabet = %config.alphabet,
        groups,
        dropped_symbols,
        "decoded carrier"
    );

    DecodedMessage {
        message: bits.to_text(),
        groups,
        dropped_symbols,
    }
}

/// Collects complete symbol groups as octets.
///
/// Returns the octets and the count of symbols discarded from partial groups.
fn extract_octets(carrier: &str, alphabet: SymbolAlphabet) -> (Vec<u8>, usize) {
    let mut octets = Vec::new();
    let mut current = 0u8;
    let mut filled = 0usize;
    let mut dropped = 0usize;

    for ch in carrier.chars() {
        match alphabet.bit_for(ch) {
            Some(bit) => {
                current = (current << 1) | bit as u8;
                filled += 1;
                if filled == BITS_PER_CHAR {
                    octets.push(current);
                    current = 0;
                    filled = 0;
                }
            }
            None => {
                dropped += filled;
                current = 0;
                filled = 0;
            }
        }
    }
    dropped += filled;

    (octets, dropped)
}
