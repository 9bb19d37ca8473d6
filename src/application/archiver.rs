//! Day-bucketed message archiving.
//!
//! Consumes one conversation's messages in timestamp order and writes one
//! JSON file per UTC calendar day into the conversation's directory. A
//! rename event moves everything written so far to the new directory and
//! all later buckets follow it there.

use std::mem;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{AppError, ConversationKind, Message, Result};
use crate::infrastructure::local_output::{conversation_dir_name, relocate_dir, write_json};

/// Outcome of archiving one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Day files written.
    pub files_written: usize,
    /// Messages written across all day files.
    pub messages_written: usize,
    /// Messages dropped because their timestamp could not be parsed.
    pub messages_skipped: usize,
    /// Directory holding the output after any renames.
    pub final_path: PathBuf,
}

/// File name of the bucket for a given day.
#[must_use]
pub fn bucket_file_name(date: NaiveDate) -> String {
    format!("{}.json", date.format("%Y-%m-%d"))
}

/// Streaming writer for one conversation's day buckets.
#[derive(Debug)]
pub struct DayArchiver {
    kind: ConversationKind,
    active_path: PathBuf,
    current_date: Option<NaiveDate>,
    bucket: Vec<Message>,
    stats: ArchiveStats,
}

impl DayArchiver {
    /// Starts archiving into `path`, whose parent holds sibling conversations.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: ConversationKind) -> Self {
        Self {
            kind,
            active_path: path.into(),
            current_date: None,
            bucket: Vec::new(),
            stats: ArchiveStats::default(),
        }
    }

    /// Directory the next flush will write into.
    #[must_use]
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// Adds the next message of the stream.
    ///
    /// A change of day flushes the previous bucket first. Messages must
    /// arrive in non-decreasing timestamp order.
    ///
    /// # Errors
    /// Returns `InvalidTimestamp` without touching any state if the message
    /// has a malformed `ts`, or an IO error if a flush or relocation fails.
    pub fn push(&mut self, message: Message) -> Result<()> {
        let date = message.date()?;

        if self.current_date != Some(date) {
            self.flush()?;
            self.current_date = Some(date);
        }

        if message.is_rename_for(self.kind) {
            self.relocate(&message)?;
        }

        self.bucket.push(message);
        Ok(())
    }

    /// Flushes the last bucket and returns the totals.
    ///
    /// # Errors
    /// Returns error if the final write fails.
    pub fn finish(mut self) -> Result<ArchiveStats> {
        self.flush()?;
        self.stats.final_path = self.active_path;
        Ok(self.stats)
    }

    fn flush(&mut self) -> Result<()> {
        let messages = mem::take(&mut self.bucket);
        let Some(date) = self.current_date else {
            return Ok(());
        };
        if messages.is_empty() {
            return Ok(());
        }

        let path = self.active_path.join(bucket_file_name(date));
        write_json(&path, &messages)?;
        tracing::trace!(path = %path.display(), messages = messages.len(), "Wrote day bucket");

        self.stats.files_written += 1;
        self.stats.messages_written += messages.len();
        Ok(())
    }

    fn relocate(&mut self, message: &Message) -> Result<()> {
        let Some(new_name) = message.name.as_deref() else {
            tracing::warn!(ts = %message.ts, "Rename event without a new name, ignoring");
            return Ok(());
        };

        let new_path = self
            .active_path
            .parent()
            .map_or_else(|| PathBuf::from(conversation_dir_name(new_name)), |base| {
                base.join(conversation_dir_name(new_name))
            });

        tracing::info!(
            kind = %self.kind,
            old_name = message.old_name.as_deref().unwrap_or("?"),
            new_name,
            "Conversation renamed, moving {} to {}",
            self.active_path.display(),
            new_path.display()
        );

        relocate_dir(&self.active_path, &new_path)?;
        self.active_path = new_path;
        Ok(())
    }
}

/// Archives a whole ordered message list into day buckets under `path`.
///
/// Messages with malformed timestamps are logged and left out; an empty
/// list writes nothing.
///
/// # Errors
/// Returns error if a bucket cannot be written or a rename cannot be applied.
pub fn archive_messages(
    path: impl Into<PathBuf>,
    kind: ConversationKind,
    messages: Vec<Message>,
) -> Result<ArchiveStats> {
    let mut archiver = DayArchiver::new(path, kind);
    let mut skipped = 0;

    for message in messages {
        match archiver.push(message) {
            Ok(()) => {}
            Err(AppError::InvalidTimestamp { ts }) => {
                tracing::error!(
                    path = %archiver.active_path().display(),
                    ts = %ts,
                    "Skipping message with malformed timestamp"
                );
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let mut stats = archiver.finish()?;
    stats.messages_skipped = skipped;
    Ok(stats)
}

/// Writes an empty bucket for `date` into `dir`.
///
/// # Errors
/// Returns error if the file cannot be written.
pub fn write_placeholder_bucket(dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(bucket_file_name(date));
    write_json(&path, &Vec::<Message>::new())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use super::*;

    const DAY: i64 = 86_400;
    // 2024-03-01T00:00:00Z
    const START: i64 = 1_709_251_200;

    fn message_at(secs: i64, micros: u32) -> Message {
        let mut message = Message::new(format!("{secs}.{micros:06}"));
        message
            .extra
            .insert("text".into(), serde_json::Value::String(format!("m{secs}")));
        message
    }

    fn rename(secs: i64, kind: &str, old: &str, new: &str) -> Message {
        let mut message = Message::new(format!("{secs}.000000"));
        message.subtype = Some(format!("{kind}_name"));
        message.old_name = Some(old.into());
        message.name = Some(new.into());
        message
    }

    fn read_bucket(path: &Path) -> Vec<Message> {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn day(offset: i64) -> NaiveDate {
        Utc.timestamp_opt(START + offset * DAY, 0)
            .unwrap()
            .date_naive()
    }

    #[test]
    fn test_three_days_three_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("general");
        let per_day = [40_i64, 50, 60];

        let mut messages = Vec::new();
        for (d, count) in per_day.iter().enumerate() {
            for i in 0..*count {
                messages.push(message_at(START + d as i64 * DAY + i * 60, 0));
            }
        }
        let expected = messages.clone();

        let stats = archive_messages(&path, ConversationKind::Channel, messages).unwrap();

        assert_eq!(stats.files_written, 3);
        assert_eq!(stats.messages_written, 150);
        assert_eq!(fs::read_dir(&path).unwrap().count(), 3);

        let mut concatenated = Vec::new();
        for (d, count) in per_day.iter().enumerate() {
            let bucket = read_bucket(&path.join(bucket_file_name(day(d as i64))));
            assert_eq!(bucket.len() as i64, *count);
            assert!(bucket.windows(2).all(|w| w[0].ts <= w[1].ts));
            concatenated.extend(bucket);
        }
        assert_eq!(concatenated, expected);
    }

    #[test]
    fn test_single_day_is_flushed_at_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("random");

        let stats = archive_messages(
            &path,
            ConversationKind::Channel,
            vec![message_at(START, 1), message_at(START + 10, 2)],
        )
        .unwrap();

        assert_eq!(stats.files_written, 1);
        assert_eq!(read_bucket(&path.join(bucket_file_name(day(0)))).len(), 2);
    }

    #[test]
    fn test_empty_stream_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quiet");

        let stats = archive_messages(&path, ConversationKind::Group, Vec::new()).unwrap();

        assert_eq!(stats.files_written, 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_rename_relocates_same_day() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("x");
        fs::create_dir(&old).unwrap();

        let messages = vec![
            message_at(START, 0),
            rename(START + 1, "channel", "x", "y"),
            message_at(START + 2, 0),
        ];
        let stats = archive_messages(&old, ConversationKind::Channel, messages.clone()).unwrap();

        let new = dir.path().join("y");
        assert_eq!(stats.final_path, new);
        assert!(!old.exists());
        assert_eq!(fs::read_dir(&new).unwrap().count(), 1);
        assert_eq!(read_bucket(&new.join(bucket_file_name(day(0)))), messages);
    }

    #[test]
    fn test_rename_moves_earlier_days() {
        let dir = tempdir().unwrap();
        let old = dir.path().join("old-team");

        let stats = archive_messages(
            &old,
            ConversationKind::Group,
            vec![
                message_at(START, 0),
                message_at(START + DAY, 0),
                rename(START + DAY + 5, "group", "old-team", "new-team"),
                message_at(START + 2 * DAY, 0),
            ],
        )
        .unwrap();

        let new = dir.path().join("new-team");
        assert_eq!(stats.files_written, 3);
        assert!(!old.exists());
        for offset in 0..3 {
            assert!(new.join(bucket_file_name(day(offset))).exists());
        }
        let second = read_bucket(&new.join(bucket_file_name(day(1))));
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].subtype.as_deref(), Some("group_name"));
    }

    #[test]
    fn test_rename_onto_existing_directory_fails_without_touching_it() {
        let dir = tempdir().unwrap();
        let engineering = dir.path().join("engineering");
        let dev = dir.path().join("dev");
        fs::create_dir(&dev).unwrap();
        let other_bucket = dev.join(bucket_file_name(day(0)));
        fs::write(&other_bucket, br#"["OTHER CHANNEL"]"#).unwrap();

        let err = archive_messages(
            &engineering,
            ConversationKind::Channel,
            vec![
                message_at(START, 0),
                message_at(START + DAY, 0),
                rename(START + DAY + 5, "channel", "engineering", "dev"),
                rename(START + DAY + 10, "channel", "dev", "engineering"),
            ],
        )
        .unwrap_err();

        assert!(matches!(err, AppError::Io { .. }));
        assert_eq!(fs::read_to_string(&other_bucket).unwrap(), r#"["OTHER CHANNEL"]"#);
        assert_eq!(fs::read_dir(&dev).unwrap().count(), 1);
        assert!(engineering.join(bucket_file_name(day(0))).exists());
    }

    #[test]
    fn test_im_ignores_rename_subtypes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("D123");

        let stats = archive_messages(
            &path,
            ConversationKind::Im,
            vec![rename(START, "channel", "D123", "elsewhere")],
        )
        .unwrap();

        assert_eq!(stats.final_path, path);
        assert!(path.join(bucket_file_name(day(0))).exists());
        assert!(!dir.path().join("elsewhere").exists());
    }

    #[test]
    fn test_other_kind_rename_is_plain_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("general");

        let stats = archive_messages(
            &path,
            ConversationKind::Channel,
            vec![rename(START, "group", "general", "other")],
        )
        .unwrap();

        assert_eq!(stats.final_path, path);
    }

    #[test]
    fn test_malformed_timestamp_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("general");

        let stats = archive_messages(
            &path,
            ConversationKind::Channel,
            vec![
                message_at(START, 0),
                Message::new("1709251200.1.2"),
                message_at(START + 5, 0),
            ],
        )
        .unwrap();

        assert_eq!(stats.messages_skipped, 1);
        assert_eq!(stats.messages_written, 2);
        assert_eq!(read_bucket(&path.join(bucket_file_name(day(0)))).len(), 2);
    }

    #[test]
    fn test_push_error_leaves_state_untouched() {
        let dir = tempdir().unwrap();
        let mut archiver = DayArchiver::new(dir.path().join("c"), ConversationKind::Channel);

        archiver.push(message_at(START, 0)).unwrap();
        assert!(archiver.push(Message::new("a.b.c")).is_err());
        archiver.push(message_at(START + 1, 0)).unwrap();

        let stats = archiver.finish().unwrap();
        assert_eq!(stats.files_written, 1);
        assert_eq!(stats.messages_written, 2);
    }

    #[test]
    fn test_placeholder_bucket_is_empty_array() {
        let dir = tempdir().unwrap();
        let path = write_placeholder_bucket(&dir.path().join("general"), day(0)).unwrap();

        assert_eq!(path.file_name().unwrap(), "2024-03-01.json");
        assert!(read_bucket(&path).is_empty());
    }
}
