use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use walkdir::WalkDir;

use crate::{expand_tilde, fs::path_size};

/// `*` must not cross path separators, matching shell glob semantics.
/// Both measurement strategies and deletion expansion share these
/// options so they always agree on what a pattern selects.
fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Measures the bytes currently occupied by a path or wildcard pattern.
///
/// Plain paths measure as their file size or recursive directory content
/// size; missing paths measure as zero. For wildcard patterns the tree
/// below the literal prefix is enumerated (externally via `find`, or
/// in-process as a fallback) and every regular file matching the full
/// pattern is summed.
pub fn measure_usage(path_or_pattern: &str) -> u64 {
    if !path_or_pattern.contains('*') {
        return path_size(Path::new(path_or_pattern));
    }

    let prefix = path_or_pattern.split('*').next().unwrap_or("");
    match find_usage(prefix, path_or_pattern) {
        Ok(total) => total,
        Err(error) => {
            log::debug!("find failed for {path_or_pattern}, walking instead: {error:#}");
            walk_usage(prefix, path_or_pattern)
        }
    }
}

/// Primary strategy: let find(1) enumerate the tree, filter here.
fn find_usage(prefix: &str, pattern: &str) -> io::Result<u64> {
    let pattern = glob::Pattern::new(pattern)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;

    let output = Command::new("find")
        .arg(prefix)
        .args(["-type", "f", "-print0"])
        .output()?;
    if !output.status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("find exited with {}", output.status),
        ));
    }

    let mut total = 0u64;
    for raw in output.stdout.split(|byte| *byte == 0) {
        if raw.is_empty() {
            continue;
        }
        let path = String::from_utf8_lossy(raw);
        if !pattern.matches_with(&path, match_options()) {
            continue;
        }
        if let Ok(meta) = std::fs::symlink_metadata(path.as_ref()) {
            if meta.is_file() {
                total += meta.len();
            }
        }
    }

    Ok(total)
}

/// Fallback strategy with identical selection semantics.
fn walk_usage(prefix: &str, pattern: &str) -> u64 {
    let Ok(pattern) = glob::Pattern::new(pattern) else {
        return 0;
    };

    WalkDir::new(prefix)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            pattern.matches_with(&entry.path().to_string_lossy(), match_options())
        })
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Expands a cleanup pattern to the concrete paths a deletion touches.
///
/// Patterns ending in `/*` enumerate the base directory's entire nested
/// contents, which handles locations like `~/Library/Caches/*` where the
/// interesting data sits in per-app subdirectories. Everything else goes
/// through plain glob expansion. A leading `~` is expanded first.
pub fn expand_pattern(pattern: &str) -> Vec<PathBuf> {
    let expanded = expand_tilde(pattern);

    if let Some(base) = expanded.strip_suffix("/*") {
        return WalkDir::new(base)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .collect();
    }

    match glob::glob(&expanded) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(error) => {
            log::warn!("Invalid pattern {expanded}: {error:#}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn plain_paths_measure_directly() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), vec![0u8; 500]).unwrap();
        fs::write(dir.path().join("b"), vec![0u8; 700]).unwrap();

        let dir_path = dir.path().to_string_lossy().to_string();
        assert_eq!(measure_usage(&dir_path), 1200);
        assert_eq!(
            measure_usage(&format!("{dir_path}/a")),
            500
        );
        assert_eq!(measure_usage(&format!("{dir_path}/missing")), 0);
    }

    #[test]
    fn wildcards_select_with_glob_semantics() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.log"), vec![0u8; 5]).unwrap();
        fs::write(dir.path().join("b.txt"), vec![0u8; 9]).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.log"), vec![0u8; 11]).unwrap();

        // `*` stays inside one path segment, so nested/c.log is excluded.
        let pattern = format!("{}/*.log", dir.path().display());
        assert_eq!(measure_usage(&pattern), 5);
        assert_eq!(walk_usage(&format!("{}/", dir.path().display()), &pattern), 5);
    }

    #[test]
    fn both_strategies_agree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.tmp"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("y.tmp"), vec![0u8; 50]).unwrap();

        let pattern = format!("{}/*.tmp", dir.path().display());
        let prefix = pattern.split('*').next().unwrap();
        assert_eq!(find_usage(prefix, &pattern).unwrap(), 150);
        assert_eq!(walk_usage(prefix, &pattern), 150);
    }

    #[test]
    fn trailing_star_expands_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("app/data"), b"x").unwrap();
        fs::write(dir.path().join("top"), b"y").unwrap();

        let mut paths = expand_pattern(&format!("{}/*", dir.path().display()));
        paths.sort();
        assert_eq!(
            paths,
            vec![
                dir.path().join("app"),
                dir.path().join("app/data"),
                dir.path().join("top"),
            ]
        );
    }

    #[test]
    fn concrete_and_missing_paths_expand_sanely() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, b"x").unwrap();

        assert_eq!(expand_pattern(&file.to_string_lossy()), vec![file]);
        assert!(expand_pattern(&dir.path().join("gone").to_string_lossy()).is_empty());
    }
}
