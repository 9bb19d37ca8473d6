//! CLI interface using clap.
//!
//! Flag names follow the established `slack-export` command line
//! (`--publicChannels`, `--dryRun`, ...).

use std::path::PathBuf;

use clap::Parser;

use crate::application::{ExportOptions, SelectionRequest};

/// Slack Export - export message history, files and canvases to a local archive.
#[derive(Parser, Debug)]
#[command(name = "slack-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Slack API token.
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Name of a zip file to output as.
    #[arg(long, value_name = "NAME")]
    pub zip: Option<String>,

    /// Output directory.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// List the conversations that will be exported without fetching or writing history.
    #[arg(long = "dryRun")]
    pub dry_run: bool,

    /// Export the given Public Channels (all of them when given without names).
    #[arg(long = "publicChannels", num_args = 0.., value_name = "CHANNEL_NAME")]
    pub public_channels: Option<Vec<String>>,

    /// Export the given Private Channels / Group DMs.
    #[arg(long, num_args = 0.., value_name = "GROUP_NAME")]
    pub groups: Option<Vec<String>>,

    /// Export 1:1 DMs with the given users (names or ids).
    #[arg(long = "directMessages", num_args = 0.., value_name = "USER_NAME")]
    pub direct_messages: Option<Vec<String>>,

    /// Prompt you to select the conversations to export.
    #[arg(long)]
    pub prompt: bool,

    /// Configuration file (defaults to ~/.slack-export/config.toml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Builds the export options from the parsed flags.
    #[must_use]
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            output_dir: self.output.clone(),
            zip_name: self.zip.clone(),
            dry_run: self.dry_run,
            selection: SelectionRequest {
                public_channels: self.public_channels.clone(),
                groups: self.groups.clone(),
                direct_messages: self.direct_messages.clone(),
                prompt: self.prompt,
            },
        }
    }
}
