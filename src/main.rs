//! nullsms - invisible SMS
//!
//! CLI for encoding text as zero-width characters, decoding it back, and
//! sending it through the abuse-guarded gateway.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CommandExecutor, DecodeCommand, EncodeCommand, SendCommand, ServeCommand};

/// nullsms - send messages that look blank
///
/// Text is hidden in zero-width characters (8 per character). Only characters
/// up to U+00FF can be encoded.
#[derive(Parser)]
#[command(name = "nullsms")]
#[command(version)]
#[command(about = "Invisible-ink SMS: zero-width text encoding with an abuse-guarded gateway")]
#[command(long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a message as zero-width characters
    Encode(EncodeCommand),

    /// Decode a zero-width carrier back into text
    Decode(DecodeCommand),

    /// Encode (optionally) and send a message as SMS
    Send(SendCommand),

    /// Run the HTTP gateway
    Serve(ServeCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Encode(cmd) => cmd.execute(),
        Commands::Decode(cmd) => cmd.execute(),
        Commands::Send(cmd) => cmd.execute(),
        Commands::Serve(cmd) => cmd.execute(),
    }
}

/// Logs go to stderr so stdout only ever carries the carrier or message.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("nullsms=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nullsms=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
