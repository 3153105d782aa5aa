use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::media::is_media_file;

/// Media file found under a show's location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Recursively collect files that pass [`is_media_file`], sorted by path.
/// Unreadable directories are logged and skipped.
pub fn media_files_in_dir(root: &Path) -> Vec<MediaEntry> {
    let mut entries = Vec::new();
    walk_recursive(root, &mut entries);
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}

fn walk_recursive(dir: &Path, entries: &mut Vec<MediaEntry>) {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "cannot read directory");
            return;
        }
    };

    for entry in read_dir.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            let name = entry.file_name();
            if matches!(name.to_str(), Some("@eaDir" | "#recycle" | ".Trash")) {
                continue;
            }
            walk_recursive(&path, entries);
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(&path);
        if !is_media_file(&path.to_string_lossy()) {
            debug!(path = %relative.display(), "skipping non-media file");
            continue;
        }

        let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
        entries.push(MediaEntry { path, size_bytes });
    }
}
