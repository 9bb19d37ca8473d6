//! Slack Export - archive a Slack workspace to local JSON files.
//!
//! Exports users, conversations, files and canvases, writing each
//! conversation's history as one JSON file per UTC day:
//!   slack-export --token xoxp-...                      # everything
//!   slack-export --token xoxp-... --publicChannels general random
//!   slack-export --token xoxp-... --groups --prompt     # pick groups interactively
//!   slack-export --token xoxp-... --dryRun              # list what would be exported
//!   slack-export --token xoxp-... --zip backup          # produce backup.zip

mod application;
mod cli;
mod domain;
mod infrastructure;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{format_selection, format_summary, Exporter};
use cli::Cli;
use infrastructure::{load_config, SlackClient, TerminalPicker};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let client = SlackClient::new(cli.token.as_str(), &config)?;
    let options = cli.export_options();

    let summary = Exporter::new(&client, &config)
        .run(&options, &mut TerminalPicker)
        .await?;

    if options.dry_run {
        println!("{}", format_selection(&summary));
    } else {
        println!();
        println!("{}", format_summary(&summary));
    }

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
