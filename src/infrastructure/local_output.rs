//! Local filesystem output for the export tree.
//!
//! JSON is written with four-space indentation, matching the layout of
//! Slack's own workspace exports.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::domain::{AppError, Result};

/// Creates a directory and its parents if needed.
///
/// # Errors
/// Returns error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| AppError::io(format!("Failed to create directory {}", path.display()), e))
}

/// Serializes `value` as indented JSON into `path`, creating parents.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(AppError::json_parse)?;

    fs::write(path, buf)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))
}

/// Writes raw bytes into `path`, creating parents.
///
/// # Errors
/// Returns error if the write fails.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, bytes).map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))
}

/// Moves every entry of `from` into the new directory `to` and removes `from`.
///
/// Does nothing when both paths are the same or `from` does not exist.
/// `to` must not exist yet: merging into another directory could overwrite
/// its files.
///
/// # Errors
/// Returns error if `to` already exists, an entry cannot be moved, or `from`
/// cannot be removed.
pub fn relocate_dir(from: &Path, to: &Path) -> Result<()> {
    if from == to {
        return Ok(());
    }
    if to.exists() {
        return Err(AppError::io(
            format!("Cannot move {} to {}", from.display(), to.display()),
            io::Error::new(io::ErrorKind::AlreadyExists, "target directory already exists"),
        ));
    }
    if !from.is_dir() {
        return Ok(());
    }

    ensure_dir(to)?;

    let entries = fs::read_dir(from)
        .map_err(|e| AppError::io(format!("Failed to read directory {}", from.display()), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| AppError::io("Failed to read directory entry", e))?;
        let target = to.join(entry.file_name());
        fs::rename(entry.path(), &target).map_err(|e| {
            AppError::io(
                format!("Failed to move {} to {}", entry.path().display(), target.display()),
                e,
            )
        })?;
    }

    fs::remove_dir(from)
        .map_err(|e| AppError::io(format!("Failed to remove directory {}", from.display()), e))
}

/// Keeps alphanumerics, space, `_`, `-` and `.`, then trims.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Keeps alphanumerics, space, `_` and `-`, trims, and turns spaces into `_`.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// Directory name for a conversation; path separators are not allowed.
#[must_use]
pub fn conversation_dir_name(name: &str) -> String {
    let cleaned = name.replace(['/', '\\'], "_");
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// First free path for `file_name` in `dir`, appending `_1`, `_2`, ... before
/// the extension while the candidate already exists on disk.
#[must_use]
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = split_extension(file_name);
    (1u32..)
        .map(|n| dir.join(format!("{stem}_{n}{ext}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Splits `name.ext` into (`name`, `.ext`); dotfiles keep their leading dot.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}
