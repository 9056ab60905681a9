//! Encode command - turn text into an invisible carrier.

use anyhow::{Context, Result};
use clap::Args;

use nullsms::text::time_salt;
use nullsms::{encode_with_config, EncoderConfig, SymbolAlphabet};

use super::{read_arg_or_stdin, CommandExecutor};

/// Encode a message as zero-width characters.
///
/// The carrier is printed to stdout. It looks empty; pipe it or use
/// --escaped to see the code points.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Message to encode (reads from stdin if not provided)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Symbol alphabet: zwsp, zwnj or braille
    #[arg(short, long, default_value = "zwsp")]
    pub encoder: SymbolAlphabet,

    /// Mask the bits with a salt-derived keystream
    #[arg(long)]
    pub obfuscate: bool,

    /// Salt for --obfuscate (defaults to the current time in milliseconds)
    #[arg(long, requires = "obfuscate")]
    pub salt: Option<String>,

    /// Print \u{...} escapes instead of raw invisible characters
    #[arg(long)]
    pub escaped: bool,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self) -> Result<()> {
        let message = read_arg_or_stdin(self.message.as_deref())?;
        let message = message.trim_end_matches(['\r', '\n']);

        let mut config = EncoderConfig::new(self.encoder);
        if self.obfuscate {
            let salt = self.salt.clone().unwrap_or_else(time_salt);
            eprintln!("Salt: {salt}");
            config = config.with_salt(salt);
        }

        let encoded = encode_with_config(message, &config).context("Failed to encode message")?;

        if self.escaped {
            println!("{}", encoded.carrier.escape_unicode());
        } else {
            println!("{}", encoded.carrier);
        }
        eprintln!(
            "Encoded {} chars into {} {} symbols{}",
            message.chars().count(),
            encoded.symbol_count,
            self.encoder,
            if encoded.obfuscated { " (obfuscated)" } else { "" }
        );

        Ok(())
    }
}
