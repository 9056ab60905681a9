//! # nullsms - invisible SMS
//!
//! nullsms turns a short text message into a run of zero-width characters that
//! shows up as a blank message on the recipient's phone, and sends it through
//! an SMS provider behind a small abuse guard.
//!
//! ## Overview
//!
//! - Each character becomes **8 carrier symbols** (one per bit, MSB first)
//! - Three **symbol alphabets**: ZWSP/ZWNJ, ZWNJ/ZWSP, blank/dot Braille cells
//! - Optional **keystream masking**: bits XORed with a salt, repeated cyclically
//! - **Best-effort decode**: unrecognized or partial groups are dropped, never errors
//! - **Abuse guard**: bot filter, per-client quota, password override
//!
//! Only characters up to U+00FF are representable; wider input is rejected.
//! The keystream is a mask, not a cipher.
//!
//! ## Example Usage
//!
//! ```rust
//! use nullsms::{decode, decode_with_salt, encode, SymbolAlphabet};
//!
//! let carrier = encode("meet at 6", SymbolAlphabet::Zwsp, false, "").unwrap();
//! assert_eq!(carrier.chars().count(), 8 * 9);
//! assert_eq!(decode(&carrier, SymbolAlphabet::Zwsp), "meet at 6");
//!
//! // Masked carriers need the salt to come back.
//! let masked = encode("meet at 6", SymbolAlphabet::Braille, true, "pepper").unwrap();
//! assert_eq!(decode_with_salt(&masked, SymbolAlphabet::Braille, "pepper"), "meet at 6");
//! ```
//!
//! ## Modules
//!
//! - [`text`]: bit packing, symbol alphabets, keystream
//! - [`encoder`]: text to carrier
//! - [`decoder`]: carrier to text (never fails)
//! - [`gateway`]: abuse guard, dispatch, providers, HTTP surface
//! - [`config`]: configuration file and environment

/// Carrier symbols per message character.
pub const BITS_PER_CHAR: usize = 8;

/// Highest code point that fits in one octet.
pub const MAX_CODE_POINT: u32 = 0xFF;

/// Sends allowed per client before the override password is needed.
pub const DEFAULT_QUOTA_LIMIT: u32 = 1;

/// Length ceiling for normal (visible) messages.
pub const DEFAULT_MAX_NORMAL_LEN: usize = 160;

/// Cookie carrying the per-browser identifier.
pub const BROWSER_ID_COOKIE: &str = "nullsms_id";

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod gateway;
pub mod text;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use decoder::{decode, decode_with_config, decode_with_salt, DecodedMessage, DecoderConfig};
pub use encoder::{encode, encode_with_config, EncodedMessage, EncoderConfig, EncoderError};
pub use gateway::{
    ClientContext, DispatchGateway, DispatchRequest, GatewayConfig, MessageProvider, Outcome,
    SendMode,
};
pub use text::{BitSequence, Keystream, SymbolAlphabet};
