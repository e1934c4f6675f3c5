use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::ProgressSink;

use super::{walk_files, WALK_REPORT_INTERVAL};

/// Files at or below this size are ignored: they cannot yield
/// meaningful savings and would dominate hashing cost.
pub const MIN_DUPLICATE_SIZE: u64 = 1024 * 1024;

/// Only the first 4 KiB of content is fingerprinted. Files sharing a
/// size and an identical prefix but diverging later will collide; that
/// false-positive rate is traded for scan speed.
const FINGERPRINT_PREFIX: usize = 4096;

/// Progress is reported once per this many files hashed.
const HASH_REPORT_INTERVAL: usize = 10;

/// A set of files sharing both byte size and content fingerprint.
///
/// Members are sorted by path; the first entry is the canonical copy
/// kept when the group is deleted.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub fingerprint: blake3::Hash,
    pub size: u64,
    pub files: Vec<PathBuf>,
    pub selected: bool,
}

impl DuplicateGroup {
    /// Bytes freed if every member but the first were deleted.
    pub fn reclaimable(&self) -> u64 {
        self.size * (self.files.len() as u64 - 1)
    }
}

/// Scans the given roots for duplicate files.
///
/// Returns the duplicate groups plus the total reclaimable byte count
/// across all groups. Unreadable files are silently skipped and never
/// appear in any group.
pub fn scan_duplicates(
    roots: &[PathBuf],
    skip_names: &HashSet<String>,
    progress: &mut dyn ProgressSink,
) -> (Vec<DuplicateGroup>, u64) {
    // Pass 1: bucket candidate files by exact byte size.
    let mut size_buckets: HashMap<u64, Vec<PathBuf>> = HashMap::new();
    let mut visited = 0usize;

    walk_files(roots, skip_names, |path, meta| {
        visited += 1;
        if visited % WALK_REPORT_INTERVAL == 0 {
            progress.report(&format!("Scanned {visited} files..."));
        }
        if meta.len() > MIN_DUPLICATE_SIZE {
            size_buckets.entry(meta.len()).or_default().push(path.to_path_buf());
        }
    });

    let candidates: usize = size_buckets
        .values()
        .filter(|paths| paths.len() >= 2)
        .map(Vec::len)
        .sum();
    progress.report(&format!(
        "Scanned {visited} files, hashing {candidates} duplicate candidates..."
    ));

    // Pass 2: fingerprint every file that shares its size with another.
    // Buckets are keyed on size as well, so a prefix collision across
    // different sizes can never merge into one group.
    let mut fingerprint_buckets: HashMap<(u64, blake3::Hash), Vec<PathBuf>> = HashMap::new();
    let mut hashed = 0usize;

    for (bucket_size, paths) in size_buckets {
        if paths.len() < 2 {
            continue;
        }
        for path in paths {
            hashed += 1;
            if hashed % HASH_REPORT_INTERVAL == 0 {
                progress.report(&format!("Hashed {hashed} of {candidates} files..."));
            }

            match prefix_fingerprint(&path) {
                Some(fingerprint) => {
                    fingerprint_buckets
                        .entry((bucket_size, fingerprint))
                        .or_default()
                        .push(path);
                }
                None => log::trace!("Skipping unreadable file {}", path.display()),
            }
        }
    }

    // Pass 3: fingerprint buckets with two or more members are groups.
    let mut groups = Vec::new();
    let mut total_reclaimable = 0u64;

    for ((_, fingerprint), mut files) in fingerprint_buckets {
        if files.len() < 2 {
            continue;
        }

        // The current on-disk size of any member; they all matched on
        // size when bucketed. A member vanishing mid-scan drops the group.
        let Some(size) = files.iter().find_map(|path| {
            std::fs::metadata(path).ok().map(|meta| meta.len())
        }) else {
            continue;
        };

        // Deterministic keeper: the lexicographically smallest path.
        files.sort();

        total_reclaimable += size * (files.len() as u64 - 1);
        groups.push(DuplicateGroup {
            fingerprint,
            size,
            files,
            selected: false,
        });
    }

    // Largest savings first; paths break ties so output is stable.
    groups.sort_by(|a, b| {
        b.reclaimable()
            .cmp(&a.reclaimable())
            .then_with(|| a.files.cmp(&b.files))
    });

    (groups, total_reclaimable)
}

/// Fingerprint of a file's first 4 KiB. `None` when the file cannot
/// be opened or read. Reads to EOF or the prefix limit so a short
/// read cannot change the hash.
pub(crate) fn prefix_fingerprint(path: &Path) -> Option<blake3::Hash> {
    let file = File::open(path).ok()?;
    let mut buf = Vec::with_capacity(FINGERPRINT_PREFIX);
    file.take(FINGERPRINT_PREFIX as u64)
        .read_to_end(&mut buf)
        .ok()?;
    Some(blake3::hash(&buf))
}
