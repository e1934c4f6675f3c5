use std::process::Command;

use crate::SudoSession;

const GIB: u64 = 1024 * 1024 * 1024;

/// Best-effort reclaimable-size estimation for command-based targets.
///
/// These adapters parse the textual output of external maintenance
/// tools, which is inherently fragile across tool versions. An estimate
/// of zero means "unknown", never "nothing to clean".
pub trait CommandEstimate {
    /// Whether this adapter understands the given target command.
    fn matches(&self, command: &str) -> bool;

    /// Estimated bytes the command would free if run now.
    fn estimate(&self, sudo: &SudoSession) -> u64;
}

/// Sums the "(1.2MB)" style annotations from `brew cleanup -n`.
pub struct BrewCleanupEstimate;

impl CommandEstimate for BrewCleanupEstimate {
    fn matches(&self, command: &str) -> bool {
        command.contains("brew cleanup")
    }

    fn estimate(&self, _sudo: &SudoSession) -> u64 {
        let Ok(output) = Command::new("brew").args(["cleanup", "-n"]).output() else {
            return 0;
        };
        if !output.status.success() {
            return 0;
        }
        parse_brew_cleanup_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Counts local Time Machine snapshots, assuming roughly 1 GiB each.
pub struct SnapshotEstimate;

impl CommandEstimate for SnapshotEstimate {
    fn matches(&self, command: &str) -> bool {
        command.contains("tmutil deletelocalsnapshots")
    }

    fn estimate(&self, sudo: &SudoSession) -> u64 {
        let Some(output) = sudo.try_run_with_output(&["tmutil", "listlocalsnapshots", "/"]) else {
            return 0;
        };
        count_snapshots(&String::from_utf8_lossy(&output)) * GIB
    }
}

/// Estimates the reclaimable bytes for a command-based cleanup target.
/// Unknown commands estimate as zero.
pub fn estimate_command_size(command: &str, sudo: &SudoSession) -> u64 {
    let estimators: [&dyn CommandEstimate; 2] = [&BrewCleanupEstimate, &SnapshotEstimate];
    estimators
        .iter()
        .find(|estimator| estimator.matches(command))
        .map_or(0, |estimator| estimator.estimate(sudo))
}

/// `brew cleanup -n` prints lines like
/// `Would remove: /path/to/bottle.tar.gz (1.2MB)`.
fn parse_brew_cleanup_output(output: &str) -> u64 {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim_end();
            let start = line.rfind('(')?;
            let annotation = line.strip_suffix(')')?;
            Some(parse_size_annotation(&annotation[start + 1..]))
        })
        .sum()
}

fn count_snapshots(output: &str) -> u64 {
    output
        .lines()
        .filter(|line| line.contains("com.apple.TimeMachine"))
        .count() as u64
}

/// Parses size annotations like "1.2MB", "500 KB" or "3.4G" into bytes.
/// Unrecognized input parses as zero.
pub fn parse_size_annotation(annotation: &str) -> u64 {
    let annotation = annotation.trim();
    let split = annotation
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(annotation.len());

    let Ok(value) = annotation[..split].parse::<f64>() else {
        return 0;
    };

    let unit = annotation[split..].trim().to_uppercase();
    let scale = match unit.as_str() {
        "KB" | "K" => 1024.0,
        "MB" | "M" => 1024.0 * 1024.0,
        "GB" | "G" => 1024.0 * 1024.0 * 1024.0,
        "TB" | "T" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => 1.0,
    };

    (value * scale) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_annotations_parse() {
        assert_eq!(parse_size_annotation("1.2MB"), (1.2 * 1024.0 * 1024.0) as u64);
        assert_eq!(parse_size_annotation("500 KB"), 500 * 1024);
        assert_eq!(parse_size_annotation("3.4GB"), (3.4 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert_eq!(parse_size_annotation("2T"), 2 * 1024 * 1024 * 1024 * 1024);
        assert_eq!(parse_size_annotation("812"), 812);
        assert_eq!(parse_size_annotation(""), 0);
        assert_eq!(parse_size_annotation("garbage"), 0);
    }

    #[test]
    fn brew_output_sums_annotations() {
        let output = "\
Would remove: /opt/homebrew/Cellar/foo/1.0 (1.2MB)
==> This line has no annotation
Would remove: /Users/me/Library/Caches/Homebrew/bar.tar.gz (500KB)
";
        assert_eq!(
            parse_brew_cleanup_output(output),
            (1.2 * 1024.0 * 1024.0) as u64 + 500 * 1024
        );
    }

    #[test]
    fn snapshots_are_counted() {
        let output = "\
Snapshots for disk /:
com.apple.TimeMachine.2024-05-01-120000.local
com.apple.TimeMachine.2024-05-02-120000.local
";
        assert_eq!(count_snapshots(output), 2);
    }

    #[test]
    fn unknown_commands_estimate_zero() {
        let sudo = SudoSession::new();
        assert_eq!(estimate_command_size("mystery --cleanup", &sudo), 0);
    }
}
