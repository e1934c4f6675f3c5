/// Expands a leading `~` to the user's home directory.
///
/// Works on the string form because cleanup targets are glob patterns,
/// not plain paths. Anything without the marker passes through untouched.
pub fn expand_tilde(path: &str) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return path.to_string();
    };

    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.display(), rest),
        None => path.to_string(),
    }
}

/// Truncates an overlong path for display, keeping the suffix.
///
/// The suffix is the locally meaningful part of a path, so the front is
/// replaced by an ellipsis. The result is exactly `max_len` characters
/// for inputs longer than the limit.
pub fn shorten_path(path: &str, max_len: usize) -> String {
    let chars: Vec<char> = path.chars().collect();
    if chars.len() <= max_len {
        return path.to_string();
    }
    if max_len <= 3 {
        return "...".to_string();
    }

    let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(
            expand_tilde("~/Documents"),
            format!("{}/Documents", home.display())
        );
        assert_eq!(expand_tilde("~"), format!("{}", home.display()));
    }

    #[test]
    fn absolute_paths_pass_through() {
        assert_eq!(expand_tilde("/var/log/*"), "/var/log/*");
        assert_eq!(expand_tilde("relative/path"), "relative/path");
    }

    #[test]
    fn short_paths_pass_through() {
        assert_eq!(shorten_path("/tmp/a", 20), "/tmp/a");
        assert_eq!(
            shorten_path("12345678901234567890", 20),
            "12345678901234567890"
        );
    }

    #[test]
    fn long_paths_keep_the_suffix() {
        let path = "a".repeat(17) + &"b".repeat(23);
        let short = shorten_path(&path, 20);
        assert_eq!(short.chars().count(), 20);
        assert!(short.starts_with("..."));
        assert!(short.ends_with(&"b".repeat(17)));
    }

    #[test]
    fn tiny_limits_collapse_to_ellipsis() {
        assert_eq!(shorten_path("/some/long/path", 3), "...");
        assert_eq!(shorten_path("/some/long/path", 0), "...");
    }
}
