//! Decode command - reveal text hidden in a carrier.

use anyhow::Result;
use clap::Args;

use nullsms::{decode_with_config, DecoderConfig, SymbolAlphabet};

use super::{read_arg_or_stdin, CommandExecutor};

/// Decode a zero-width carrier back into text.
///
/// NOTE: This command never fails on bad input - unrecognized characters and
/// incomplete groups are skipped, so the result may be partial or empty.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Carrier string (reads from stdin if not provided)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Symbol alphabet the carrier was written with
    #[arg(short, long, default_value = "zwsp")]
    pub encoder: SymbolAlphabet,

    /// Salt used with --obfuscate when encoding
    #[arg(long)]
    pub salt: Option<String>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self) -> Result<()> {
        let carrier = read_arg_or_stdin(self.input.as_deref())?;

        let decoded = decode_with_config(
            &carrier,
            &DecoderConfig {
                alphabet: self.encoder,
                salt: self.salt.clone(),
            },
        );

        if decoded.groups == 0 {
            eprintln!("No hidden message found for encoder '{}'", self.encoder);
            return Ok(());
        }
        if decoded.dropped_symbols > 0 {
            eprintln!(
                "Skipped {} symbols from incomplete groups",
                decoded.dropped_symbols
            );
        }

        println!("{}", decoded.message);
        Ok(())
    }
}
