use std::collections::HashSet;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::{format_size, shorten_path, ProgressSink};

use super::{walk_files, WALK_REPORT_INTERVAL};

/// A large file found by a size-threshold scan.
#[derive(Debug, Clone)]
pub struct BigFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    pub selected: bool,
}

/// Scans the given roots for files of at least `min_size` bytes.
pub fn scan_big_files(
    roots: &[PathBuf],
    min_size: u64,
    skip_names: &HashSet<String>,
    progress: &mut dyn ProgressSink,
) -> Vec<BigFile> {
    let mut files = Vec::new();
    let mut visited = 0usize;

    walk_files(roots, skip_names, |path, meta| {
        visited += 1;
        if visited % WALK_REPORT_INTERVAL == 0 {
            progress.report(&format!("Scanned {visited} files..."));
        }

        if meta.len() < min_size {
            return;
        }

        progress.report(&format!(
            "Found: {} ({})",
            shorten_path(&path.to_string_lossy(), 30),
            format_size(meta.len())
        ));
        files.push(BigFile {
            path: path.to_path_buf(),
            size: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            selected: false,
        });
    });

    files
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::scan::default_skip_names;
    use crate::VoidProgress;

    use super::*;

    #[test]
    fn only_files_at_or_over_the_threshold_are_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big"), vec![0u8; 4096]).unwrap();
        fs::write(dir.path().join("exact"), vec![0u8; 1024]).unwrap();
        fs::write(dir.path().join("small"), vec![0u8; 1023]).unwrap();

        let mut files = scan_big_files(
            &[dir.path().to_path_buf()],
            1024,
            &default_skip_names(),
            &mut VoidProgress,
        );
        files.sort_by_key(|file| file.path.clone());

        let names: Vec<_> = files
            .iter()
            .map(|file| file.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["big", "exact"]);
    }

    #[test]
    fn skip_directories_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/blob"), vec![0u8; 8192]).unwrap();

        let files = scan_big_files(
            &[dir.path().to_path_buf()],
            1,
            &default_skip_names(),
            &mut VoidProgress,
        );
        assert!(files.is_empty());
    }
}
