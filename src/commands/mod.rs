//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod decode;
mod encode;
mod send;
mod serve;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use send::SendCommand;
pub use serve::ServeCommand;

use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use nullsms::gateway::{DryRunProvider, MessageProvider, TwilioProvider};
use nullsms::Config;

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}

/// Loads configuration from `path`, or from `~/.nullsms/config.toml`.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().context("Failed to load config"),
    }
}

/// Picks the delivery backend.
fn build_provider(config: &Config, dry_run: bool) -> Result<Arc<dyn MessageProvider>> {
    if dry_run {
        return Ok(Arc::new(DryRunProvider::new()));
    }

    let Some(twilio) = config.twilio.clone() else {
        bail!(
            "No SMS provider configured. Add a [twilio] section to the config file, \
             set TWILIO_ACCOUNT_SID / TWILIO_AUTH_TOKEN / TWILIO_PHONE, or use --dry-run"
        );
    };

    let provider = TwilioProvider::new(twilio).context("Invalid Twilio configuration")?;
    Ok(Arc::new(provider))
}

/// Returns `value` or, if absent, everything on stdin.
fn read_arg_or_stdin(value: Option<&str>) -> Result<String> {
    match value {
        Some(value) => Ok(value.to_string()),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}
