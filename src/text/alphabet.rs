//! Carrier symbol alphabets.
//!
//! An alphabet is an ordered pair of code points that stand for bit 0 and
//! bit 1 in a carrier string. Three pairs ship:
//!
//! | Variant   | bit 0    | bit 1    |
//! |-----------|----------|----------|
//! | `zwsp`    | U+200B   | U+200C   |
//! | `zwnj`    | U+200C   | U+200B   |
//! | `braille` | U+2800   | U+2801   |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Zero width space.
pub const ZWSP: char = '\u{200B}';
/// Zero width non-joiner.
pub const ZWNJ: char = '\u{200C}';
/// Blank Braille pattern.
pub const BRAILLE_BLANK: char = '\u{2800}';
/// Braille pattern dots-1.
pub const BRAILLE_DOT1: char = '\u{2801}';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlphabetError {
    #[error("unknown encoder '{0}' (expected zwsp, zwnj or braille)")]
    Unknown(String),
}

/// The symbol pair used to carry bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SymbolAlphabet {
    /// ZWSP for 0, ZWNJ for 1.
    #[default]
    Zwsp,
    /// ZWNJ for 0, ZWSP for 1.
    Zwnj,
    /// Blank Braille cell for 0, dots-1 cell for 1.
    Braille,
}

impl SymbolAlphabet {
    /// Every shipped alphabet.
    pub const ALL: [SymbolAlphabet; 3] = [Self::Zwsp, Self::Zwnj, Self::Braille];

    /// Symbol carrying bit 0.
    pub const fn zero(self) -> char {
        match self {
            Self::Zwsp => ZWSP,
            Self::Zwnj => ZWNJ,
            Self::Braille => BRAILLE_BLANK,
        }
    }

    /// Symbol carrying bit 1.
    pub const fn one(self) -> char {
        match self {
            Self::Zwsp => ZWNJ,
            Self::Zwnj => ZWSP,
            Self::Braille => BRAILLE_DOT1,
        }
    }

    pub const fn symbol(self, bit: bool) -> char {
        if bit {
            self.one()
        } else {
            self.zero()
        }
    }

    /// Bit carried by `ch`, or `None` if `ch` is not part of this alphabet.
    pub fn bit_for(self, ch: char) -> Option<bool> {
        if ch == self.zero() {
            Some(false)
        } else if ch == self.one() {
            Some(true)
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Zwsp => "zwsp",
            Self::Zwnj => "zwnj",
            Self::Braille => "braille",
        }
    }
}

impl fmt::Display for SymbolAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SymbolAlphabet {
    type Err = AlphabetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zwsp" => Ok(Self::Zwsp),
            "zwnj" => Ok(Self::Zwnj),
            "braille" | "u+2800" => Ok(Self::Braille),
            other => Err(AlphabetError::Unknown(other.to_string())),
        }
    }
}

impl TryFrom<String> for SymbolAlphabet {
    type Error = AlphabetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_are_distinct() {
        for alphabet in SymbolAlphabet::ALL {
            assert_ne!(alphabet.zero(), alphabet.one(), "{alphabet}");
        }
    }

    #[test]
    fn test_zwnj_swaps_zwsp() {
        assert_eq!(SymbolAlphabet::Zwnj.zero(), SymbolAlphabet::Zwsp.one());
        assert_eq!(SymbolAlphabet::Zwnj.one(), SymbolAlphabet::Zwsp.zero());
    }

    #[test]
    fn test_bit_for() {
        let a = SymbolAlphabet::Braille;
        assert_eq!(a.bit_for('\u{2800}'), Some(false));
        assert_eq!(a.bit_for('\u{2801}'), Some(true));
        assert_eq!(a.bit_for('\u{200B}'), None);
        assert_eq!(a.bit_for('x'), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("ZWSP".parse::<SymbolAlphabet>(), Ok(SymbolAlphabet::Zwsp));
        assert_eq!(" zwnj ".parse::<SymbolAlphabet>(), Ok(SymbolAlphabet::Zwnj));
        assert_eq!("braille".parse::<SymbolAlphabet>(), Ok(SymbolAlphabet::Braille));
        assert!(matches!(
            "morse".parse::<SymbolAlphabet>(),
            Err(AlphabetError::Unknown(name)) if name == "morse"
        ));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&SymbolAlphabet::Braille).unwrap();
        assert_eq!(json, "\"braille\"");
        let back: SymbolAlphabet = serde_json::from_str("\"zwnj\"").unwrap();
        assert_eq!(back, SymbolAlphabet::Zwnj);
        let upper: SymbolAlphabet = serde_json::from_str("\"Braille\"").unwrap();
        assert_eq!(upper, SymbolAlphabet::Braille);
        assert!(serde_json::from_str::<SymbolAlphabet>("\"morse\"").is_err());
    }
}
