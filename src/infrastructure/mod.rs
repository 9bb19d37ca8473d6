//! Infrastructure layer - external adapters (Slack API, filesystem, terminal).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod local_output;
pub mod picker;
pub mod slack_client;
pub mod zip_archive;

pub use config::load_config;
pub use picker::{Picker, TerminalPicker};
pub use slack_client::{FileQuery, SlackApi, SlackClient};
pub use zip_archive::zip_directory;
