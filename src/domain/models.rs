//! Domain models for Slack workspace data.
//!
//! Every payload keeps the fields the exporter reads as typed members and
//! carries the rest of the remote record in a flattened map, so re-serializing
//! a value writes back what Slack sent.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{AppError, Result};

/// Kind of conversation being archived, which also picks the rename subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKind {
    /// Public channel.
    Channel,
    /// Private channel or multi-party DM.
    Group,
    /// 1:1 direct message.
    Im,
}

impl ConversationKind {
    /// Tag used in message subtypes and log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Group => "group",
            Self::Im => "im",
        }
    }

    /// Message subtype that marks a rename event, if this kind can be renamed.
    #[must_use]
    pub const fn rename_subtype(self) -> Option<&'static str> {
        match self {
            Self::Channel => Some("channel_name"),
            Self::Group => Some("group_name"),
            Self::Im => None,
        }
    }
}

impl std::fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message from a conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Fixed-point seconds since epoch, kept as the string Slack sent.
    pub ts: String,
    /// Structural event marker (`channel_name`, `channel_join`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// New conversation name on rename events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Previous conversation name on rename events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    /// Everything else, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Creates a plain message with only a timestamp.
    #[cfg(test)]
    #[must_use]
    pub fn new(ts: impl Into<String>) -> Self {
        Self {
            ts: ts.into(),
            subtype: None,
            name: None,
            old_name: None,
            extra: Map::new(),
        }
    }

    /// Returns the UTC calendar day this message belongs to.
    ///
    /// # Errors
    /// Returns `InvalidTimestamp` if `ts` is not `<seconds>[.<fraction>]`.
    pub fn date(&self) -> Result<NaiveDate> {
        message_date(&self.ts)
    }

    /// Whether this message renames a conversation of the given kind.
    #[must_use]
    pub fn is_rename_for(&self, kind: ConversationKind) -> bool {
        match (kind.rename_subtype(), self.subtype.as_deref()) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

/// Parses a Slack timestamp string into its UTC calendar date.
///
/// # Errors
/// Returns `InvalidTimestamp` when the string has more than one fractional
/// separator or the seconds part is not an integer in chrono's range.
pub fn message_date(ts: &str) -> Result<NaiveDate> {
    let invalid = || AppError::InvalidTimestamp { ts: ts.to_string() };

    let mut parts = ts.split('.');
    let seconds = parts.next().ok_or_else(invalid)?;
    let _fraction = parts.next();
    if parts.next().is_some() {
        return Err(invalid());
    }

    let seconds: i64 = seconds.parse().map_err(|_| invalid())?;
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(invalid)
}

/// A workspace member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A channel, private channel, multi-party DM or 1:1 DM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    // Absent flags are not written back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_channel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_group: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_im: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mpim: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    /// Peer user id for 1:1 DMs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Conversation {
    /// Name used for directories and listings; DMs fall back to their id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    #[must_use]
    pub fn is_channel(&self) -> bool {
        self.is_channel.unwrap_or(false)
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.is_group.unwrap_or(false)
    }

    /// 1:1 DM.
    #[must_use]
    pub fn is_im(&self) -> bool {
        self.is_im.unwrap_or(false)
    }

    /// Multi-party DM.
    #[must_use]
    pub fn is_mpim(&self) -> bool {
        self.is_mpim.unwrap_or(false)
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.is_private.unwrap_or(false)
    }

    /// Public channel: a channel that is not private.
    #[must_use]
    pub fn is_public_channel(&self) -> bool {
        self.is_channel() && !self.is_private()
    }

    /// Private channel or group DM.
    #[must_use]
    pub fn is_private_group(&self) -> bool {
        (self.is_group() || self.is_mpim()) && self.is_private()
    }
}

/// A file or canvas record from `files.list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackFile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_private_download: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// One page of a page-count listing.
#[derive(Debug, Clone)]
pub struct NumberedPage<T> {
    pub items: Vec<T>,
    /// Total number of pages the server reports.
    pub total_pages: u32,
}

/// Identity of the token owner returned by `auth.test`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthIdentity {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub user: String,
    pub user_id: String,
}
