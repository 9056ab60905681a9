//! Text processing for the zero-width codec.
//!
//! This module provides:
//! - Bit packing (one octet per character, MSB first)
//! - Carrier symbol alphabets
//! - Salt-derived XOR keystream

pub mod alphabet;
pub mod bits;
pub mod keystream;

pub use alphabet::{AlphabetError, SymbolAlphabet};
pub use bits::{BitError, BitSequence};
pub use keystream::{time_salt, Keystream};
