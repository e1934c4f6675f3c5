use std::fs;
use std::path::Path;

use walkdir::WalkDir;

/// Total size of all regular files below `path`.
///
/// Symlinks are not followed and directory entry overhead is not
/// counted, only file content bytes. Unreadable entries are skipped.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Size of a file, or the recursive content size of a directory.
/// A missing path measures as zero.
pub fn path_size(path: &Path) -> u64 {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => dir_size(path),
        Ok(meta) if meta.is_file() => meta.len(),
        _ => 0,
    }
}
