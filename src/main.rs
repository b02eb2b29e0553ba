//! CarrierClip - clipboard hidden in a shared picture library
//!
//! This is the main entry point for the command line front end.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carrierclip::cli::{Cli, CliHandler};
use carrierclip::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_config(cli.config.as_deref())?;

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("carrierclip={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("CarrierClip v{}", carrierclip::VERSION);

    let mut handler = CliHandler::with_config(config, cli.config);
    let stdout = std::io::stdout();
    handler.handle_command(cli.command, &mut stdout.lock())?;

    Ok(())
}
