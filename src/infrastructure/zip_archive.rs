//! Zip packaging of a finished export tree.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::{AppError, Result};

/// Zips the contents of `source_dir` into `<dest_dir>/<name>.zip`.
///
/// Entry names are relative to `source_dir`, with `/` separators.
///
/// # Errors
/// Returns error if a file cannot be read or the archive cannot be written.
pub fn zip_directory(source_dir: &Path, dest_dir: &Path, name: &str) -> Result<PathBuf> {
    let file_name = if name.ends_with(".zip") {
        name.to_string()
    } else {
        format!("{name}.zip")
    };
    let zip_path = dest_dir.join(file_name);

    let file = File::create(&zip_path)
        .map_err(|e| AppError::io(format!("Failed to create {}", zip_path.display()), e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = Vec::new();
    collect_files(source_dir, &mut files)?;
    files.sort();

    for path in &files {
        let entry_name = entry_name(source_dir, path);
        writer
            .start_file(entry_name.as_str(), options)
            .map_err(|e| AppError::archive(format!("Failed to add {entry_name}"), e))?;
        let bytes = fs::read(path)
            .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;
        writer
            .write_all(&bytes)
            .map_err(|e| AppError::io(format!("Failed to write {entry_name} to archive"), e))?;
    }

    writer
        .finish()
        .map_err(|e| AppError::archive("Failed to finish archive", e))?;

    tracing::info!(path = %zip_path.display(), files = files.len(), "Archive written");
    Ok(zip_path)
}

/// Collect all files below `path` recursively.
fn collect_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(path)
        .map_err(|e| AppError::io(format!("Failed to read directory {}", path.display()), e))?;

    for entry in entries.filter_map(std::result::Result::ok) {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }

    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_zip_directory_keeps_relative_layout() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("run");
        fs::create_dir_all(source.join("general")).unwrap();
        fs::write(source.join("users.json"), b"[]").unwrap();
        fs::write(source.join("general").join("2024-01-01.json"), b"[1]").unwrap();

        let zip_path = zip_directory(&source, dir.path(), "backup").unwrap();
        assert_eq!(zip_path, dir.path().join("backup.zip"));

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["general/2024-01-01.json", "users.json"]);

        let mut content = String::new();
        archive
            .by_name("general/2024-01-01.json")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "[1]");
    }
}
