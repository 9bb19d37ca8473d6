//! Export orchestration.
//!
//! Runs one export end to end: authenticate, bootstrap the catalog, write
//! the catalog files, files and canvases, resolve the selection, archive
//! every selected conversation, then optionally zip the result.
//! Conversations are processed one after another; a failing conversation,
//! file or canvas is logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{
    AppError, Catalog, Conversation, ConversationKind, ExportConfig, Result, SlackFile,
};
use crate::infrastructure::local_output::{
    conversation_dir_name, ensure_dir, sanitize_file_name, sanitize_title, unique_path,
    write_bytes, write_json,
};
use crate::infrastructure::{zip_directory, Picker, SlackApi};

use super::archiver::{archive_messages, write_placeholder_bucket};
use super::catalog::{bootstrap_catalog, get_canvases, get_files};
use super::history::get_history;
use super::pagination::Paginator;
use super::resolver::{select_conversations, Selection, SelectionRequest};

/// Options for one export run.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Directory in which the timestamped run directory is created.
    pub output_dir: PathBuf,
    /// Zip the run directory into `<output_dir>/<name>.zip` and remove it.
    pub zip_name: Option<String>,
    /// Only list what would be exported.
    pub dry_run: bool,
    pub selection: SelectionRequest,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub team: String,
    pub user: String,
    pub run_dir: PathBuf,
    /// Zip file, when packaging was requested.
    pub archive: Option<PathBuf>,
    pub selection: Selection,
    pub dm_labels: Vec<String>,
    pub conversations_exported: usize,
    /// Exported from an interrupted history walk.
    pub conversations_partial: usize,
    pub conversations_failed: usize,
    pub messages_written: usize,
    pub messages_skipped: usize,
    pub files_exported: usize,
    pub canvases_exported: usize,
    pub placeholder: Option<PathBuf>,
}

/// Metadata written to `files/files.json`.
#[derive(Debug, Clone, Serialize)]
struct FileRecord {
    id: String,
    name: String,
    file_path: String,
    created: Option<Value>,
    updated: Option<Value>,
    url_private_download: String,
    filetype: Option<String>,
    size: Option<u64>,
}

/// Metadata written to `canvases/canvases.json`.
#[derive(Debug, Clone, Serialize)]
struct CanvasRecord {
    id: String,
    title: String,
    file_path: String,
    created: Option<Value>,
    updated: Option<Value>,
    url_private_download: String,
}

/// Name of the run directory for a given start time.
#[must_use]
pub fn run_dir_name<Tz: TimeZone>(started: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}-slack_export", started.format("%Y%m%d-%H%M%S"))
}

/// Drives a complete export against a Slack API implementation.
pub struct Exporter<'a> {
    api: &'a dyn SlackApi,
    config: &'a ExportConfig,
    paginator: Paginator,
}

impl<'a> Exporter<'a> {
    #[must_use]
    pub fn new(api: &'a dyn SlackApi, config: &'a ExportConfig) -> Self {
        Self {
            api,
            config,
            paginator: Paginator::new(config.page_delay()),
        }
    }

    /// Runs the export.
    ///
    /// # Errors
    /// Returns error on authentication failure, catalog bootstrap failure,
    /// or when the run directory, catalog files or zip cannot be written.
    /// Per-conversation and per-file failures are logged instead.
    pub async fn run(
        &self,
        options: &ExportOptions,
        picker: &mut dyn Picker,
    ) -> Result<ExportSummary> {
        let identity = self.api.auth_test().await?;
        tracing::info!(
            "Successfully authenticated for team {} and user {}",
            identity.team,
            identity.user
        );

        let catalog = bootstrap_catalog(self.api, &self.paginator, self.config).await?;

        let mut summary = ExportSummary {
            team: identity.team.clone(),
            user: identity.user.clone(),
            ..ExportSummary::default()
        };

        if options.dry_run {
            summary.selection = select_conversations(&catalog, &options.selection, picker)?;
            summary.dm_labels = summary
                .selection
                .dms
                .iter()
                .map(|dm| catalog.dm_label(dm))
                .collect();
            return Ok(summary);
        }

        let run_dir = options.output_dir.join(run_dir_name(&Local::now()));
        ensure_dir(&run_dir)?;
        tracing::info!(path = %run_dir.display(), "Writing export");

        write_json(&run_dir.join("users.json"), &catalog.users)?;
        tracing::info!("Making channels file");
        write_json(
            &run_dir.join("channels.json"),
            &catalog.channels_file_entries(&identity.user_id),
        )?;
        summary.canvases_exported = self.export_canvases(&run_dir).await?;
        summary.files_exported = self.export_files(&run_dir).await?;

        let selection = select_conversations(&catalog, &options.selection, picker)?;

        for channel in &selection.channels {
            let label = channel.display_name();
            self.archive_conversation(&run_dir, channel, ConversationKind::Channel, label, &mut summary)
                .await;
        }
        if !selection.groups.is_empty() && selection.channels.is_empty() {
            let today = Local::now().date_naive();
            summary.placeholder = write_placeholder_channel(&run_dir, &catalog, today)?;
        }
        for group in &selection.groups {
            let label = group.display_name();
            self.archive_conversation(&run_dir, group, ConversationKind::Group, label, &mut summary)
                .await;
        }
        for dm in &selection.dms {
            let label = catalog.dm_label(dm);
            self.archive_conversation(&run_dir, dm, ConversationKind::Im, &label, &mut summary)
                .await;
        }

        summary.dm_labels = selection.dms.iter().map(|dm| catalog.dm_label(dm)).collect();
        summary.selection = selection;

        if let Some(name) = &options.zip_name {
            let zip_path = zip_directory(&run_dir, &options.output_dir, name)?;
            fs::remove_dir_all(&run_dir).map_err(|e| {
                AppError::io(format!("Failed to remove {}", run_dir.display()), e)
            })?;
            summary.archive = Some(zip_path);
        }
        summary.run_dir = run_dir;

        Ok(summary)
    }

    /// Fetches and archives one conversation, recording the outcome.
    async fn archive_conversation(
        &self,
        run_dir: &Path,
        conversation: &Conversation,
        kind: ConversationKind,
        label: &str,
        summary: &mut ExportSummary,
    ) {
        let dir_name = match kind {
            ConversationKind::Im => conversation.id.as_str(),
            ConversationKind::Channel | ConversationKind::Group => conversation.display_name(),
        };
        let dir = run_dir.join(conversation_dir_name(dir_name));

        tracing::info!(%kind, "Fetching history for {label}");
        let fetched = get_history(
            self.api,
            &self.paginator,
            &conversation.id,
            self.config.api.page_size,
        )
        .await;

        if let Some(e) = &fetched.interrupted {
            if fetched.items.is_empty() {
                tracing::warn!(%kind, code = e.code(), "Skipping {label} due to error: {e}");
                summary.conversations_failed += 1;
                return;
            }
            tracing::warn!(
                %kind,
                code = e.code(),
                messages = fetched.items.len(),
                "History for {label} is incomplete, archiving what was fetched"
            );
            summary.conversations_partial += 1;
        }

        let result = ensure_dir(&dir).and_then(|()| archive_messages(&dir, kind, fetched.items));
        match result {
            Ok(stats) => {
                tracing::debug!(
                    path = %stats.final_path.display(),
                    files = stats.files_written,
                    messages = stats.messages_written,
                    "Archived {label}"
                );
                summary.conversations_exported += 1;
                summary.messages_written += stats.messages_written;
                summary.messages_skipped += stats.messages_skipped;
            }
            Err(e) => {
                tracing::error!(%kind, code = e.code(), "Skipping {label} due to error: {e}");
                summary.conversations_failed += 1;
            }
        }
    }

    /// Downloads non-canvas files and writes `files/files.json`.
    async fn export_files(&self, run_dir: &Path) -> Result<usize> {
        let fetched = get_files(self.api, &self.paginator, self.config).await;
        let files_dir = run_dir.join("files");
        ensure_dir(&files_dir)?;
        tracing::info!("Found {} files to export", fetched.items.len());
        if !fetched.is_complete() {
            tracing::warn!(requests = fetched.requests, "File listing is incomplete");
        }

        let mut records = Vec::new();
        for file in &fetched.items {
            let name = non_empty(&file.title)
                .or_else(|| non_empty(&file.name))
                .map_or_else(|| format!("file_{}", file.id), str::to_string);
            let Some(url) = non_empty(&file.url_private_download) else {
                tracing::info!("Skipping file {name} because no download URL is provided.");
                continue;
            };

            let mut safe_name = sanitize_file_name(&name);
            if safe_name.is_empty() {
                safe_name = format!("file_{}", file.id);
            }

            match self.download_to(url, &files_dir, &safe_name).await {
                Ok(file_name) => {
                    records.push(FileRecord {
                        id: file.id.clone(),
                        name: name.clone(),
                        file_path: format!("files/{file_name}"),
                        created: file.created.clone(),
                        updated: file.timestamp.clone(),
                        url_private_download: url.to_string(),
                        filetype: file.filetype.clone(),
                        size: file.size,
                    });
                    tracing::info!("Exported file: {name}");
                }
                Err(e) => tracing::warn!(code = e.code(), "Error exporting file {name}: {e}"),
            }
        }

        write_json(&files_dir.join("files.json"), &records)?;
        Ok(records.len())
    }

    /// Downloads canvases as HTML and writes `canvases/canvases.json`.
    async fn export_canvases(&self, run_dir: &Path) -> Result<usize> {
        let fetched = get_canvases(self.api, &self.paginator, self.config).await;
        let canvas_dir = run_dir.join("canvases");
        ensure_dir(&canvas_dir)?;
        tracing::info!("Found {} canvases to export", fetched.items.len());
        if !fetched.is_complete() {
            tracing::warn!(requests = fetched.requests, "Canvas listing is incomplete");
        }

        let mut records = Vec::new();
        for canvas in &fetched.items {
            let title = non_empty(&canvas.title)
                .map_or_else(|| format!("canvas_{}", canvas.id), str::to_string);
            let Some(url) = non_empty(&canvas.url_private_download) else {
                tracing::info!("Skipping canvas {title} because no download URL is provided.");
                continue;
            };

            let file_name = format!("{}_{}.html", sanitize_title(&title), canvas.id);
            match self.download_canvas(url, &canvas_dir.join(&file_name)).await {
                Ok(()) => {
                    records.push(canvas_record(canvas, &title, url, &file_name));
                    tracing::info!("Exported canvas: {title}");
                }
                Err(e) => tracing::warn!(code = e.code(), "Error exporting canvas {title}: {e}"),
            }
        }

        write_json(&canvas_dir.join("canvases.json"), &records)?;
        Ok(records.len())
    }

    /// Downloads `url` into the first free name for `file_name` in `dir`.
    async fn download_to(&self, url: &str, dir: &Path, file_name: &str) -> Result<String> {
        let bytes = self.api.download(url).await?;
        let path = unique_path(dir, file_name);
        write_bytes(&path, &bytes)?;
        Ok(path
            .file_name()
            .map_or_else(|| file_name.to_string(), |n| n.to_string_lossy().into_owned()))
    }

    async fn download_canvas(&self, url: &str, path: &Path) -> Result<()> {
        let bytes = self.api.download(url).await?;
        write_bytes(path, &bytes)
    }
}

fn canvas_record(canvas: &SlackFile, title: &str, url: &str, file_name: &str) -> CanvasRecord {
    CanvasRecord {
        id: canvas.id.clone(),
        title: title.to_string(),
        file_path: format!("canvases/{file_name}"),
        created: canvas.created.clone(),
        updated: canvas.updated.clone(),
        url_private_download: url.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Writes an empty bucket into the first public channel's directory, so
/// importers that require at least one channel accept a groups-only export.
fn write_placeholder_channel(
    run_dir: &Path,
    catalog: &Catalog,
    today: NaiveDate,
) -> Result<Option<PathBuf>> {
    let Some(channel) = catalog.channels.first() else {
        tracing::info!("No public channels available for dummy channel creation.");
        return Ok(None);
    };

    let dir = run_dir.join(conversation_dir_name(channel.display_name()));
    let path = write_placeholder_bucket(&dir, today)?;
    tracing::info!(path = %path.display(), "Wrote placeholder channel");
    Ok(Some(path))
}
