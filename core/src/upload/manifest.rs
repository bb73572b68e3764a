use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One file to upload and its destination key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub local: PathBuf,
    pub key: String,
}

/// Walk the task directory and derive the upload manifest.
///
/// Keys are `<task-dir-name>/<relative-path>` with forward slashes, so
/// re-running the same task directory always targets the same objects and
/// different task directories never collide in one bucket. Entries are
/// sorted by key for deterministic dispatch order.
pub fn build_manifest(task_dir: &Path) -> io::Result<Vec<ManifestEntry>> {
    let dir_name = task_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut entries = Vec::new();
    for item in WalkDir::new(task_dir) {
        let item = item.map_err(io::Error::other)?;
        if !item.file_type().is_file() {
            continue;
        }
        let rel = item
            .path()
            .strip_prefix(task_dir)
            .map_err(io::Error::other)?;
        let rel_key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(ManifestEntry {
            local: item.path().to_path_buf(),
            key: format!("{dir_name}/{rel_key}"),
        });
    }
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(entries)
}
