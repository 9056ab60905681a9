//! Serve command - run the HTTP gateway.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use nullsms::gateway::http;
use nullsms::DispatchGateway;

use super::{build_provider, load_config, CommandExecutor};

/// Run the HTTP gateway (POST /api/sms, POST /api/decode).
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (overrides the config file)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Do not contact the provider, only log messages
    #[arg(long)]
    pub dry_run: bool,

    /// Path to config file (default: ~/.nullsms/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CommandExecutor for ServeCommand {
    fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let provider = build_provider(&config, self.dry_run)?;

        if config.gateway.override_password.is_none() {
            warn!("no override password configured; quota cannot be bypassed");
        }

        let mut server = config.server.clone();
        if let Some(bind) = &self.bind {
            server.bind = bind.clone();
        }
        let gateway = Arc::new(DispatchGateway::new(&config.gateway, provider));

        let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
        rt.block_on(http::serve(gateway, &server))
            .with_context(|| format!("Failed to serve on {}", server.bind))
    }
}
