//! Terminal output for dry runs and run summaries.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::Conversation;

use super::exporter::ExportSummary;

/// Formats the selected conversations of a dry run, one table per category.
pub fn format_selection(summary: &ExportSummary) -> String {
    let selection = &summary.selection;
    if selection.is_empty() {
        return "Nothing selected for export.".yellow().to_string();
    }

    let mut out = String::new();
    let names = |list: &[Conversation]| -> Vec<(String, String)> {
        list.iter()
            .map(|c| (c.id.clone(), c.display_name().to_string()))
            .collect()
    };
    let dms: Vec<(String, String)> = selection
        .dms
        .iter()
        .zip(&summary.dm_labels)
        .map(|(dm, label)| (dm.id.clone(), label.clone()))
        .collect();

    let sections = [
        ("Public Channels selected for export:", names(&selection.channels)),
        (
            "Private Channels and Group DMs selected for export:",
            names(&selection.groups),
        ),
        ("1:1 DMs selected for export:", dms),
    ];

    for (title, rows) in sections {
        if rows.is_empty() {
            continue;
        }
        out.push_str(&format!("{}\n", title.bold()));
        out.push_str(&format_table(&rows));
        out.push_str("\n\n");
    }

    out.trim_end().to_string()
}

fn format_table(rows: &[(String, String)]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Name"]);
    for (id, name) in rows {
        table.add_row(vec![id.clone(), truncate(name, 60)]);
    }
    table.to_string()
}

/// Formats the end-of-run statistics.
pub fn format_summary(summary: &ExportSummary) -> String {
    let location = summary.archive.as_ref().map_or_else(
        || summary.run_dir.display().to_string(),
        |zip| zip.display().to_string(),
    );

    let mut out = format!(
        "{}\n  Team: {}\n  User: {}\n  Conversations exported: {}\n  Messages written: {}\n  Files: {}\n  Canvases: {}",
        "📦 Export complete".bold(),
        summary.team.cyan(),
        summary.user.cyan(),
        summary.conversations_exported.to_string().green(),
        summary.messages_written.to_string().cyan(),
        summary.files_exported.to_string().cyan(),
        summary.canvases_exported.to_string().cyan(),
    );

    if summary.conversations_partial > 0 {
        out.push_str(&format!(
            "\n  Incomplete histories: {}",
            summary.conversations_partial.to_string().yellow()
        ));
    }
    if summary.conversations_failed > 0 {
        out.push_str(&format!(
            "\n  Conversations skipped: {}",
            summary.conversations_failed.to_string().red()
        ));
    }
    if summary.messages_skipped > 0 {
        out.push_str(&format!(
            "\n  Messages with bad timestamps: {}",
            summary.messages_skipped.to_string().red()
        ));
    }

    out.push_str(&format!("\n  Output: {location}"));
    out
}

/// Truncates a string to max length (in characters) with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{cut}...")
    }
}
