//! Filesystem scans: duplicate sets, large files and stale files.
//!
//! All scans are synchronous and single threaded. They never fail
//! outright: missing roots and unreadable entries are skipped and the
//! caller learns about progress through its [`ProgressSink`].

use std::collections::HashSet;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::expand_tilde;

mod big_files;
mod duplicates;
mod old_files;

pub use big_files::*;
pub use duplicates::*;
pub use old_files::*;

/// Progress is reported once per this many files visited.
pub(crate) const WALK_REPORT_INTERVAL: usize = 500;

/// Directory names pruned from every scan. These subtrees are skipped
/// entirely, not merely excluded from results.
pub const DEFAULT_SKIP_NAMES: &[&str] = &[".git", "node_modules", "vendor", "Library"];

pub fn default_skip_names() -> HashSet<String> {
    DEFAULT_SKIP_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Roots scanned for large files.
pub fn default_big_file_roots() -> Vec<PathBuf> {
    ["~/Documents", "~/Desktop", "~/Downloads", "~/Movies", "~/Music", "~/Pictures"]
        .iter()
        .map(|dir| PathBuf::from(expand_tilde(dir)))
        .collect()
}

/// Roots scanned for duplicates and stale files.
pub fn default_scan_roots() -> Vec<PathBuf> {
    ["~/Documents", "~/Desktop", "~/Downloads"]
        .iter()
        .map(|dir| PathBuf::from(expand_tilde(dir)))
        .collect()
}

fn is_pruned(name: &str, skip_names: &HashSet<String>) -> bool {
    name.starts_with('.') || skip_names.contains(name)
}

/// Walks every regular file below the given roots, pruning skipped and
/// hidden directories. Missing roots are ignored. The visitor receives
/// each file's path and metadata.
pub(crate) fn walk_files(
    roots: &[PathBuf],
    skip_names: &HashSet<String>,
    mut visit: impl FnMut(&Path, &Metadata),
) {
    for root in roots {
        if !root.is_dir() {
            continue;
        }

        let walker = WalkDir::new(root).follow_links(false).into_iter();
        for entry in walker.filter_entry(|entry| {
            // Prune whole subtrees, but never the root itself.
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !is_pruned(&entry.file_name().to_string_lossy(), skip_names)
        }) {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            visit(entry.path(), &meta);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn pruned_directories_are_skipped_entirely() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep"), b"x").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/drop"), b"x").unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden/drop"), b"x").unwrap();

        let mut seen = Vec::new();
        walk_files(
            &[dir.path().to_path_buf()],
            &default_skip_names(),
            |path, _meta| seen.push(path.to_path_buf()),
        );

        assert_eq!(seen, vec![dir.path().join("keep")]);
    }

    #[test]
    fn missing_roots_are_ignored() {
        let mut count = 0;
        walk_files(
            &[PathBuf::from("/definitely/not/a/real/root")],
            &default_skip_names(),
            |_path, _meta| count += 1,
        );
        assert_eq!(count, 0);
    }
}
