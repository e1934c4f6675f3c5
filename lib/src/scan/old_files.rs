use std::collections::HashSet;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::ProgressSink;

use super::{walk_files, WALK_REPORT_INTERVAL};

/// A file whose modification time predates the scan cutoff.
/// The mtime stands in for last access, which APFS does not track
/// reliably enough to use.
#[derive(Debug, Clone)]
pub struct OldFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    pub selected: bool,
}

/// Scans the given roots for files last modified before `cutoff`.
pub fn scan_old_files(
    roots: &[PathBuf],
    cutoff: SystemTime,
    skip_names: &HashSet<String>,
    progress: &mut dyn ProgressSink,
) -> Vec<OldFile> {
    let mut files = Vec::new();
    let mut visited = 0usize;

    walk_files(roots, skip_names, |path, meta| {
        visited += 1;
        if visited % WALK_REPORT_INTERVAL == 0 {
            progress.report(&format!("Scanned {visited} files..."));
        }

        let Ok(modified) = meta.modified() else { return };
        if modified < cutoff {
            files.push(OldFile {
                path: path.to_path_buf(),
                size: meta.len(),
                modified,
                selected: false,
            });
        }
    });

    files
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use crate::scan::default_skip_names;
    use crate::VoidProgress;

    use super::*;

    #[test]
    fn fresh_files_are_not_stale() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("new"), b"x").unwrap();

        let cutoff = SystemTime::now() - Duration::from_secs(30 * 86_400);
        let files = scan_old_files(
            &[dir.path().to_path_buf()],
            cutoff,
            &default_skip_names(),
            &mut VoidProgress,
        );
        assert!(files.is_empty());
    }

    #[test]
    fn files_older_than_the_cutoff_are_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f"), vec![0u8; 123]).unwrap();

        // A cutoff in the future makes everything stale.
        let cutoff = SystemTime::now() + Duration::from_secs(3600);
        let files = scan_old_files(
            &[dir.path().to_path_buf()],
            cutoff,
            &default_skip_names(),
            &mut VoidProgress,
        );

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 123);
        assert!(files[0].modified < cutoff);
    }
}
