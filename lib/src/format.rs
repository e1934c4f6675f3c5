const UNIT: u64 = 1024;
const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

/// Formats a byte count using 1024-based units with one decimal place.
///
/// Values under 1024 bytes render as a bare "B" with no numeric prefix.
/// That quirk is long-standing display behaviour and is kept for
/// compatibility rather than fixed.
pub fn format_size(bytes: u64) -> String {
    if bytes < UNIT {
        return "B".to_string();
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT && exp + 1 < UNITS.len() {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}", bytes as f64 / div as f64, UNITS[exp])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_kilobyte_values_render_bare() {
        assert_eq!(format_size(0), "B");
        assert_eq!(format_size(500), "B");
        assert_eq!(format_size(1023), "B");
    }

    #[test]
    fn unit_boundaries() {
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn huge_values_stay_in_range() {
        assert!(format_size(u64::MAX).ends_with("PB"));
    }
}
