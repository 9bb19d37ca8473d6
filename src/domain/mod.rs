//! Domain layer - core types, errors and configuration.
//!
//! This layer contains pure domain models and error types
//! without any I/O of its own.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;

pub use catalog::{Catalog, UserIndex};
pub use config::ExportConfig;
pub use error::{AppError, Result};
pub use models::{
    AuthIdentity, Conversation, ConversationKind, CursorPage, Message,
    NumberedPage, SlackFile, User,
};
