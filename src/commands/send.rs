//! Send command - encode and dispatch a message through the gateway.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use nullsms::text::time_salt;
use nullsms::{
    encode_with_config, ClientContext, DispatchGateway, DispatchRequest, EncoderConfig, Outcome,
    SendMode, SymbolAlphabet,
};

use super::{build_provider, load_config, CommandExecutor};

/// Send a message as SMS (invisible or plain).
#[derive(Args, Debug)]
pub struct SendCommand {
    /// Destination phone number
    #[arg(short, long)]
    pub to: String,

    /// Message text
    #[arg(short, long)]
    pub message: String,

    /// normal (plain, max 160 chars) or invisible (zero-width carrier)
    #[arg(long, default_value = "invisible")]
    pub mode: SendMode,

    /// Symbol alphabet for invisible mode: zwsp, zwnj or braille
    #[arg(short, long, default_value = "zwsp")]
    pub encoder: SymbolAlphabet,

    /// Mask the bits with a salt-derived keystream (invisible mode)
    #[arg(long)]
    pub obfuscate: bool,

    /// Salt for --obfuscate (defaults to the current time in milliseconds)
    #[arg(long, requires = "obfuscate")]
    pub salt: Option<String>,

    /// Override password for the send quota
    #[arg(short, long)]
    pub password: Option<String>,

    /// Do not contact the provider, only log the message
    #[arg(long)]
    pub dry_run: bool,

    /// Path to config file (default: ~/.nullsms/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CommandExecutor for SendCommand {
    fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let provider = build_provider(&config, self.dry_run)?;
        let gateway = DispatchGateway::new(&config.gateway, provider);

        let body = match self.mode {
            SendMode::Normal => self.message.clone(),
            SendMode::Invisible => {
                let mut encoder = EncoderConfig::new(self.encoder);
                if self.obfuscate {
                    let salt = self.salt.clone().unwrap_or_else(time_salt);
                    eprintln!("Salt: {salt}");
                    encoder = encoder.with_salt(salt);
                }
                encode_with_config(&self.message, &encoder)
                    .context("Failed to encode message")?
                    .carrier
            }
        };

        let request = DispatchRequest {
            destination: self.to.clone(),
            body,
            mode: self.mode,
            override_credential: self.password.clone(),
            client: ClientContext {
                addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
                browser_id: "cli".to_string(),
                user_agent: concat!("nullsms-cli/", env!("CARGO_PKG_VERSION")).to_string(),
            },
        };

        let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
        let outcome = rt.block_on(gateway.submit(&request));

        match outcome {
            Outcome::Dispatched { .. } => {
                println!("{outcome}");
                Ok(())
            }
            Outcome::QuotaExceeded { .. } => bail!("{outcome} (use --password)"),
            other => bail!("{other}"),
        }
    }
}
