use std::fmt;

/// What a [`CleanupTarget`] actually points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// A filesystem location, possibly containing `*` wildcards.
    /// A leading `~` is expanded when the target is measured or cleaned.
    Pattern(String),
    /// An external maintenance command run as-is (e.g. `brew cleanup`).
    /// Freed space for these is estimated, never measured.
    Command(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Cache,
    Logs,
    Temp,
    Trash,
    Dev,
    PackageManager,
    Apps,
    System,
    Backups,
    User,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cache => "Cache",
            Self::Logs => "Logs",
            Self::Temp => "Temp",
            Self::Trash => "Trash",
            Self::Dev => "Dev",
            Self::PackageManager => "Package Manager",
            Self::Apps => "Apps",
            Self::System => "System",
            Self::Backups => "Backups",
            Self::User => "User",
        };
        f.write_str(label)
    }
}

/// One cleanable unit: a named filesystem location or external command.
///
/// `size` is filled in by a measurement pass and reset to zero after a
/// successful cleanup. `selected` is toggled by the user.
#[derive(Debug, Clone)]
pub struct CleanupTarget {
    pub name: String,
    pub kind: TargetKind,
    pub description: String,
    pub category: Category,
    pub requires_sudo: bool,
    pub size: u64,
    pub selected: bool,
}

impl CleanupTarget {
    pub fn pattern(name: &str, pattern: &str, description: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            kind: TargetKind::Pattern(pattern.to_string()),
            description: description.to_string(),
            category,
            requires_sudo: false,
            size: 0,
            selected: false,
        }
    }

    pub fn command(name: &str, command: &str, description: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            kind: TargetKind::Command(command.to_string()),
            description: description.to_string(),
            category,
            requires_sudo: false,
            size: 0,
            selected: false,
        }
    }

    pub fn sudo(mut self) -> Self {
        self.requires_sudo = true;
        self
    }
}

/// Returns true if any target in the slice is selected.
pub fn has_selection(targets: &[CleanupTarget]) -> bool {
    targets.iter().any(|target| target.selected)
}

/// The static catalog of well-known macOS cleanup locations.
pub fn default_targets() -> Vec<CleanupTarget> {
    use Category::*;
    use CleanupTarget as T;

    vec![
        // Caches
        T::pattern("User Caches", "~/Library/Caches/*", "Application caches", Cache),
        T::pattern("System Caches", "/Library/Caches/*", "System-wide caches", Cache).sudo(),
        T::pattern(
            "Safari Cache",
            "~/Library/Caches/com.apple.Safari/*",
            "Safari browser cache",
            Cache,
        ),
        T::pattern(
            "Chrome Cache",
            "~/Library/Caches/Google/Chrome/*/Cache/*",
            "Chrome browser cache",
            Cache,
        ),
        T::pattern(
            "Firefox Cache",
            "~/Library/Caches/Firefox/Profiles/*/cache2/*",
            "Firefox browser cache",
            Cache,
        ),
        T::pattern(
            "Quick Look Cache",
            "/private/var/folders/*/C/com.apple.QuickLook.thumbnailcache/*",
            "Quick Look thumbnails",
            Cache,
        ),
        T::pattern("iCloud Cache", "~/Library/Caches/CloudKit/*", "iCloud sync cache", Cache),
        T::pattern(
            "Photos Cache",
            "~/Library/Containers/com.apple.Photos/Data/Library/Caches/*",
            "Photos app cache",
            Cache,
        ),
        T::pattern(
            "App Store Cache",
            "~/Library/Caches/com.apple.appstore/*",
            "App Store cache",
            Cache,
        ),
        // Logs
        T::pattern("User Logs", "~/Library/Logs/*", "Application logs", Logs),
        T::pattern("System Logs", "/var/log/*", "System log files", Logs).sudo(),
        T::pattern(
            "Crash Reports",
            "~/Library/Application Support/CrashReporter/*",
            "App crash logs",
            Logs,
        ),
        T::pattern(
            "Diagnostic Logs",
            "/private/var/db/diagnostics/*",
            "System diagnostics",
            Logs,
        )
        .sudo(),
        // Temp
        T::pattern("User Temp", "/private/var/tmp/*", "User temporary files", Temp).sudo(),
        T::pattern("System Temp", "/private/tmp/*", "System temporary files", Temp).sudo(),
        T::pattern("Var Folders", "/var/folders/*/*/T/*", "System temp folders", Temp),
        // Trash
        T::pattern("Trash", "~/.Trash/*", "Files in Trash", Trash),
        // Xcode / development
        T::pattern(
            "Xcode Derived Data",
            "~/Library/Developer/Xcode/DerivedData/*",
            "Xcode build artifacts",
            Dev,
        ),
        T::pattern(
            "Xcode Archives",
            "~/Library/Developer/Xcode/Archives/*",
            "Xcode archives",
            Dev,
        ),
        T::pattern(
            "Xcode Device Support",
            "~/Library/Developer/Xcode/iOS DeviceSupport/*",
            "iOS debugging symbols",
            Dev,
        ),
        T::pattern(
            "iOS Simulator",
            "~/Library/Developer/CoreSimulator/*",
            "iOS Simulator files",
            Dev,
        ),
        T::pattern(
            "Android Build Cache",
            "~/.android/build-cache",
            "Android build cache",
            Dev,
        ),
        T::pattern("Gradle Cache", "~/.gradle/caches", "Gradle build cache", Dev),
        // Package managers
        T::command(
            "Homebrew Cache",
            "brew cleanup",
            "Homebrew download cache",
            PackageManager,
        ),
        T::pattern("npm Cache", "~/.npm/*", "npm packages cache", PackageManager),
        T::pattern(
            "yarn Cache",
            "~/Library/Caches/yarn/*",
            "yarn packages cache",
            PackageManager,
        ),
        T::pattern(
            "Cargo Cache",
            "~/.cargo/registry/cache/*",
            "Rust crates cache",
            PackageManager,
        ),
        T::pattern(
            "Cargo Git",
            "~/.cargo/git/checkouts/*",
            "Cargo git checkouts",
            PackageManager,
        ),
        T::pattern(
            "pip Cache",
            "~/Library/Caches/pip/*",
            "Python pip cache",
            PackageManager,
        ),
        T::pattern(
            "Composer Cache",
            "~/Library/Caches/composer/*",
            "PHP Composer cache",
            PackageManager,
        ),
        T::pattern("gem Cache", "~/.gem/cache/*", "Ruby gems cache", PackageManager),
        T::pattern(
            "CocoaPods Cache",
            "~/Library/Caches/CocoaPods/*",
            "CocoaPods cache",
            PackageManager,
        ),
        // Application caches
        T::pattern(
            "Spotify Cache",
            "~/Library/Caches/com.spotify.client/*",
            "Spotify offline cache",
            Apps,
        ),
        T::pattern(
            "Slack Cache",
            "~/Library/Containers/com.tinyspeck.slackmacgap/Data/Library/Application Support/Slack/Cache/*",
            "Slack cache",
            Apps,
        ),
        T::pattern(
            "Discord Cache",
            "~/Library/Application Support/discord/Cache/*",
            "Discord cache",
            Apps,
        ),
        T::pattern(
            "Teams Cache",
            "~/Library/Application Support/Microsoft/Teams/*",
            "Microsoft Teams cache",
            Apps,
        ),
        T::pattern("Zoom Cache", "~/Library/Caches/us.zoom.xos/*", "Zoom cache", Apps),
        T::pattern(
            "VS Code Cache",
            "~/Library/Application Support/Code/Cache/*",
            "VS Code cache",
            Apps,
        ),
        // System / hidden
        T::pattern(
            "Saved App State",
            "~/Library/Saved Application State/*",
            "App state data",
            System,
        ),
        T::pattern(
            "Mail Downloads",
            "~/Library/Containers/com.apple.mail/Data/Library/Mail Downloads/*",
            "Mail attachments",
            System,
        ),
        T::pattern(
            "Message Attachments",
            "~/Library/Messages/Attachments/*",
            "iMessage photos/videos",
            System,
        ),
        T::pattern(
            "QuickTime Cache",
            "~/Library/Caches/com.apple.QuickTime*",
            "QuickTime cache",
            System,
        ),
        // Backups
        T::pattern(
            "iOS Backups",
            "~/Library/Application Support/MobileSync/Backup/*",
            "iPhone/iPad backups",
            Backups,
        ),
        T::command(
            "Time Machine Local",
            "tmutil deletelocalsnapshots /",
            "Time Machine local snapshots",
            Backups,
        )
        .sudo(),
        // Downloads (opt-in, never preselected)
        T::pattern("Downloads", "~/Downloads/*", "Downloads folder", User),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_well_formed() {
        let targets = default_targets();
        assert!(targets.len() > 30);

        for target in &targets {
            assert!(!target.name.is_empty());
            assert!(!target.description.is_empty());
            assert_eq!(target.size, 0);
            assert!(!target.selected);
            match &target.kind {
                TargetKind::Pattern(pattern) => {
                    assert!(
                        pattern.starts_with('~') || pattern.starts_with('/'),
                        "pattern not anchored: {pattern}"
                    );
                }
                TargetKind::Command(command) => assert!(!command.is_empty()),
            }
        }
    }

    #[test]
    fn catalog_names_are_unique() {
        let targets = default_targets();
        let mut names: Vec<_> = targets.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), targets.len());
    }

    #[test]
    fn selection_helper() {
        let mut targets = default_targets();
        assert!(!has_selection(&targets));
        targets[0].selected = true;
        assert!(has_selection(&targets));
    }
}
