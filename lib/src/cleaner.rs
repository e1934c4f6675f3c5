use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, SystemTime};

use crate::scan::DuplicateGroup;
use crate::{
    estimate_command_size, expand_pattern, expand_tilde, measure_usage, shorten_path,
    CleanupTarget, ProgressSink, SudoSession, SweepError, TargetKind,
};

/// Pause between deletion and the "after" measurement so the
/// filesystem has settled.
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Outcome of cleaning a single target.
///
/// `requested` is the size estimate shown to the user beforehand;
/// `actual` is the measured usage delta, which is authoritative.
#[derive(Debug)]
pub struct CleanResult {
    pub target: String,
    pub requested: u64,
    pub actual: u64,
    pub error: Option<SweepError>,
    pub timestamp: SystemTime,
}

impl CleanResult {
    fn new(target: &CleanupTarget) -> Self {
        Self {
            target: target.name.clone(),
            requested: target.size,
            actual: 0,
            error: None,
            timestamp: SystemTime::now(),
        }
    }
}

/// Executes deletions and reports the space they actually freed.
///
/// Borrows the caller's [`SudoSession`] for targets that need
/// elevation. With `dry_run` set nothing is deleted and the measured
/// before-size is reported as what would have been freed.
pub struct Cleaner<'a> {
    sudo: &'a SudoSession,
    dry_run: bool,
}

impl<'a> Cleaner<'a> {
    pub fn new(sudo: &'a SudoSession) -> Self {
        Self {
            sudo,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Measures or estimates the current size of a target.
    pub fn measure_target(&self, target: &CleanupTarget) -> u64 {
        match &target.kind {
            TargetKind::Pattern(pattern) => measure_usage(&expand_tilde(pattern)),
            TargetKind::Command(command) => estimate_command_size(command, self.sudo),
        }
    }

    /// Cleans every selected target and returns per-target results plus
    /// the total bytes actually freed.
    ///
    /// If any selected target requires elevation, access is ensured once
    /// up front; failure aborts the whole batch before anything is
    /// deleted. Individual target failures never stop the remaining
    /// targets. Successfully cleaned targets get their size reset.
    pub fn clean_targets(
        &self,
        targets: &mut [CleanupTarget],
        progress: &mut dyn ProgressSink,
    ) -> (Vec<CleanResult>, u64) {
        let needs_sudo = targets
            .iter()
            .any(|target| target.selected && target.requires_sudo);
        if needs_sudo && !self.dry_run {
            if let Err(error) = self.sudo.ensure_access() {
                log::warn!("Aborting privileged cleanup batch: {error:#}");
                return (denied_results(targets), 0);
            }
        }

        let mut results = Vec::new();
        let mut total_freed = 0u64;

        for target in targets.iter_mut().filter(|target| target.selected) {
            progress.report(&format!("Cleaning: {}", target.name));

            let result = self.clean_target(target);
            if result.error.is_none() {
                total_freed += result.actual;
                target.size = 0;
            }
            results.push(result);
        }

        (results, total_freed)
    }

    fn clean_target(&self, target: &CleanupTarget) -> CleanResult {
        match &target.kind {
            TargetKind::Command(command) => self.clean_command_target(target, command),
            TargetKind::Pattern(pattern) => self.clean_path_target(target, pattern),
        }
    }

    fn clean_command_target(&self, target: &CleanupTarget, command: &str) -> CleanResult {
        let mut result = CleanResult::new(target);
        // External tools do their own bookkeeping, so the estimate is
        // assumed accurate. A known precision gap.
        result.actual = target.size;

        if self.dry_run {
            return result;
        }
        if let Err(error) = self.run_command(command, target.requires_sudo) {
            result.error = Some(error);
        }
        result
    }

    fn clean_path_target(&self, target: &CleanupTarget, pattern: &str) -> CleanResult {
        let mut result = CleanResult::new(target);
        let path = expand_tilde(pattern);

        // Nothing matches: the target is already clean.
        if expand_pattern(&path).is_empty() {
            return result;
        }

        let before = measure_usage(&path);
        if self.dry_run {
            result.actual = before;
            return result;
        }

        if let Err(error) = self.delete_path(&path, target.requires_sudo) {
            result.error = Some(error);
            return result;
        }

        thread::sleep(SETTLE_DELAY);
        let after = measure_usage(&path);

        // The delta is authoritative: it reflects exactly what remains
        // after partial failures rather than trusting the deletions.
        result.actual = before.saturating_sub(after);
        result
    }

    /// Deletes a path or every match of a wildcard pattern.
    ///
    /// Wildcard matches are attempted independently; the operation
    /// fails only if every match failed.
    fn delete_path(&self, path: &str, use_sudo: bool) -> Result<(), SweepError> {
        if !path.contains('*') {
            return self.delete_single(Path::new(path), use_sudo);
        }

        let matches = expand_pattern(path);
        if matches.is_empty() {
            return Ok(());
        }

        let mut deleted = 0usize;
        let mut last_error = None;
        for candidate in &matches {
            match self.delete_single(candidate, use_sudo) {
                Ok(()) => deleted += 1,
                Err(error) => {
                    log::debug!("Failed to delete {}: {error:#}", candidate.display());
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(error) if deleted == 0 => Err(SweepError::AllMatchesFailed {
                matches: matches.len(),
                source: Box::new(error),
            }),
            _ => Ok(()),
        }
    }

    /// Deletes one concrete file or directory. A path that no longer
    /// exists counts as already clean.
    fn delete_single(&self, path: &Path, use_sudo: bool) -> Result<(), SweepError> {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(error.into()),
        };

        if use_sudo {
            let path = path.to_string_lossy();
            return self.sudo.run(&["rm", "-rf", &path]);
        }

        if meta.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn run_command(&self, command: &str, use_sudo: bool) -> Result<(), SweepError> {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(SweepError::CommandFailed("empty command".to_string()));
        };
        let args: Vec<&str> = parts.collect();

        if use_sudo {
            let mut argv = vec![program];
            argv.extend(&args);
            return self.sudo.run(&argv);
        }

        let output = Command::new(program).args(&args).output()?;
        if !output.status.success() {
            return Err(SweepError::CommandFailed(format!(
                "{command}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    /// Deletes a list of concrete files, returning the bytes freed.
    ///
    /// Files that vanished are skipped. Files outside the home
    /// directory are retried with elevation when a direct delete fails.
    /// Individual failures never abort the rest of the list.
    pub fn delete_files(&self, paths: &[PathBuf], progress: &mut dyn ProgressSink) -> u64 {
        let home = dirs::home_dir();
        let mut total_freed = 0u64;

        for path in paths {
            progress.report(&format!(
                "Deleting: {}",
                shorten_path(&path.to_string_lossy(), 40)
            ));

            let Ok(meta) = fs::symlink_metadata(path) else {
                continue; // already gone
            };
            let size = meta.len();

            if self.dry_run {
                total_freed += size;
                continue;
            }

            let in_home = home
                .as_deref()
                .map_or(false, |home| path.starts_with(home));
            let removed = if in_home {
                remove_entry(path, meta.is_dir()).map_err(SweepError::from)
            } else {
                // Try without elevation first in case we have access.
                remove_entry(path, meta.is_dir()).or_else(|_| {
                    let path = path.to_string_lossy();
                    self.sudo.run(&["rm", "-rf", &path])
                })
            };

            match removed {
                Ok(()) => total_freed += size,
                Err(error) => log::debug!("Failed to delete {}: {error:#}", path.display()),
            }
        }

        total_freed
    }

    /// Deletes every member of the selected duplicate groups except the
    /// first, which is the canonical copy to keep.
    pub fn delete_duplicates(
        &self,
        groups: &[DuplicateGroup],
        progress: &mut dyn ProgressSink,
    ) -> u64 {
        let paths: Vec<PathBuf> = groups
            .iter()
            .filter(|group| group.selected)
            .flat_map(|group| group.files.iter().skip(1).cloned())
            .collect();

        self.delete_files(&paths, progress)
    }
}

/// Results for an aborted batch: every selected target is marked as
/// denied so the failure is visible per target, not only in the log.
fn denied_results(targets: &[CleanupTarget]) -> Vec<CleanResult> {
    targets
        .iter()
        .filter(|target| target.selected)
        .map(|target| {
            let mut result = CleanResult::new(target);
            result.error = Some(SweepError::SudoDenied);
            result
        })
        .collect()
}

fn remove_entry(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Category, VoidProgress};

    use super::*;

    fn pattern_target(path: &str) -> CleanupTarget {
        let mut target = CleanupTarget::pattern("test", path, "test target", Category::Temp);
        target.selected = true;
        target
    }

    #[test]
    fn freed_bytes_equal_the_usage_delta() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), vec![0u8; 500]).unwrap();
        fs::write(dir.path().join("b"), vec![0u8; 700]).unwrap();

        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);
        let mut targets = vec![pattern_target(&dir.path().to_string_lossy())];

        let (results, total) = cleaner.clean_targets(&mut targets, &mut VoidProgress);

        assert_eq!(results.len(), 1);
        assert!(results[0].error.is_none());
        assert_eq!(results[0].actual, 1200);
        assert_eq!(total, 1200);
        assert_eq!(targets[0].size, 0);
        assert!(!dir.path().exists());
    }

    #[test]
    fn deleting_an_absent_path_is_clean_success() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);
        let mut targets = vec![pattern_target(&missing.to_string_lossy())];

        let (results, total) = cleaner.clean_targets(&mut targets, &mut VoidProgress);

        assert!(results[0].error.is_none());
        assert_eq!(results[0].actual, 0);
        assert_eq!(total, 0);
    }

    #[test]
    fn wildcard_deletes_only_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.log"), vec![0u8; 300]).unwrap();
        fs::write(dir.path().join("b.log"), vec![0u8; 200]).unwrap();
        fs::write(dir.path().join("keep.txt"), vec![0u8; 999]).unwrap();

        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);
        let pattern = format!("{}/*.log", dir.path().display());
        let mut targets = vec![pattern_target(&pattern)];

        let (results, total) = cleaner.clean_targets(&mut targets, &mut VoidProgress);

        assert!(results[0].error.is_none());
        assert_eq!(total, 500);
        assert!(!dir.path().join("a.log").exists());
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn dry_run_measures_without_deleting() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f"), vec![0u8; 800]).unwrap();

        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo).dry_run(true);
        let mut targets = vec![pattern_target(&dir.path().to_string_lossy())];

        let (results, _) = cleaner.clean_targets(&mut targets, &mut VoidProgress);

        assert_eq!(results[0].actual, 800);
        assert!(dir.path().join("f").exists());
    }

    #[test]
    fn command_targets_report_the_estimate_as_freed() {
        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);

        let mut target = CleanupTarget::command("noop", "true", "no-op", Category::PackageManager);
        target.selected = true;
        target.size = 42;

        let (results, total) = cleaner.clean_targets(&mut [target], &mut VoidProgress);
        assert!(results[0].error.is_none());
        assert_eq!(results[0].requested, 42);
        assert_eq!(results[0].actual, 42);
        assert_eq!(total, 42);
    }

    #[test]
    fn failing_commands_surface_per_target_errors() {
        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);

        let mut target = CleanupTarget::command("boom", "false", "fails", Category::PackageManager);
        target.selected = true;
        target.size = 10;

        let (results, total) = cleaner.clean_targets(&mut [target], &mut VoidProgress);
        assert!(matches!(results[0].error, Some(SweepError::CommandFailed(_))));
        assert_eq!(total, 0);
    }

    #[cfg(unix)]
    #[test]
    fn partial_wildcard_failure_frees_only_what_was_deleted() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let rw = dir.path().join("rw");
        let ro = dir.path().join("ro");
        fs::create_dir(&rw).unwrap();
        fs::create_dir(&ro).unwrap();
        fs::write(rw.join("data"), vec![0u8; 300]).unwrap();
        fs::write(ro.join("data"), vec![0u8; 500]).unwrap();
        fs::set_permissions(&ro, fs::Permissions::from_mode(0o555)).unwrap();

        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);
        let pattern = format!("{}/*/data", dir.path().display());
        let mut targets = vec![pattern_target(&pattern)];

        let (results, total) = cleaner.clean_targets(&mut targets, &mut VoidProgress);

        fs::set_permissions(&ro, fs::Permissions::from_mode(0o755)).unwrap();

        // Root ignores directory permissions, so the failing half of the
        // pattern cannot be staged; nothing to assert in that case.
        if !ro.join("data").exists() {
            return;
        }

        assert!(results[0].error.is_none());
        assert_eq!(results[0].actual, 300);
        assert_eq!(total, 300);
        assert!(!rw.join("data").exists());
    }

    #[cfg(unix)]
    #[test]
    fn wildcard_with_no_deletable_match_reports_the_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let ro = dir.path().join("ro");
        fs::create_dir(&ro).unwrap();
        fs::write(ro.join("data"), vec![0u8; 500]).unwrap();
        fs::set_permissions(&ro, fs::Permissions::from_mode(0o555)).unwrap();

        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);
        let pattern = format!("{}/*/data", dir.path().display());
        let mut targets = vec![pattern_target(&pattern)];

        let (results, total) = cleaner.clean_targets(&mut targets, &mut VoidProgress);

        fs::set_permissions(&ro, fs::Permissions::from_mode(0o755)).unwrap();

        if !ro.join("data").exists() {
            return;
        }

        assert!(matches!(
            results[0].error,
            Some(SweepError::AllMatchesFailed { matches: 1, .. })
        ));
        assert_eq!(total, 0);
    }

    #[test]
    fn denied_batches_mark_every_selected_target() {
        let mut a = CleanupTarget::pattern("a", "/tmp/a", "a", Category::Temp);
        a.selected = true;
        a.size = 7;
        let b = CleanupTarget::pattern("b", "/tmp/b", "b", Category::Temp);

        let results = denied_results(&[a, b]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].target, "a");
        assert_eq!(results[0].requested, 7);
        assert!(matches!(results[0].error, Some(SweepError::SudoDenied)));
    }

    #[test]
    fn delete_files_sums_successful_deletions_and_skips_vanished() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, vec![0u8; 100]).unwrap();
        fs::write(&b, vec![0u8; 250]).unwrap();

        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);
        let paths = vec![a.clone(), dir.path().join("vanished"), b.clone()];

        let freed = cleaner.delete_files(&paths, &mut VoidProgress);
        assert_eq!(freed, 350);
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn duplicate_deletion_keeps_the_first_member() {
        let dir = tempfile::tempdir().unwrap();
        let keep = dir.path().join("a");
        let drop1 = dir.path().join("b");
        let drop2 = dir.path().join("c");
        for path in [&keep, &drop1, &drop2] {
            fs::write(path, vec![0u8; 64]).unwrap();
        }

        let group = DuplicateGroup {
            fingerprint: blake3::hash(b"irrelevant"),
            size: 64,
            files: vec![keep.clone(), drop1.clone(), drop2.clone()],
            selected: true,
        };

        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);
        let freed = cleaner.delete_duplicates(&[group], &mut VoidProgress);

        assert_eq!(freed, 128);
        assert!(keep.exists());
        assert!(!drop1.exists());
        assert!(!drop2.exists());
    }

    #[test]
    fn unselected_groups_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"x").unwrap();
        fs::write(&b, b"x").unwrap();

        let group = DuplicateGroup {
            fingerprint: blake3::hash(b"x"),
            size: 1,
            files: vec![a.clone(), b.clone()],
            selected: false,
        };

        let sudo = SudoSession::new();
        let cleaner = Cleaner::new(&sudo);
        assert_eq!(cleaner.delete_duplicates(&[group], &mut VoidProgress), 0);
        assert!(a.exists());
        assert!(b.exists());
    }
}
