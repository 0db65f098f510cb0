//! Pure rotation and retention decisions for segmented log files.
//!
//! Segments are named `output-NNNNNN.log` with a monotonically increasing
//! index. The highest index is the active segment; all others are sealed.

const SEGMENT_PREFIX: &str = "output-";
const SEGMENT_SUFFIX: &str = ".log";

/// File name of the segment with the given index.
pub fn segment_file_name(index: u64) -> String {
    format!("{SEGMENT_PREFIX}{index:06}{SEGMENT_SUFFIX}")
}

/// Parse a segment index out of a file name, ignoring foreign files.
pub fn parse_segment_index(file_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(SEGMENT_PREFIX)?
        .strip_suffix(SEGMENT_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Whether the active segment is full and must be sealed before the next append.
///
/// A zero limit is treated as one line per segment.
pub const fn needs_rotation(active_lines: usize, max_lines: usize) -> bool {
    let limit = if max_lines == 0 { 1 } else { max_lines };
    active_lines >= limit
}

/// Index of the segment that follows `current`, or the first index when none exist.
pub fn next_segment_index(current: Option<u64>) -> u64 {
    current.map_or(1, |i| i + 1)
}

/// Sealed segments to delete so that at most `max_files` sealed segments remain.
///
/// `segments` must be sorted ascending and include the active segment as its
/// last element; the active segment is never selected. Oldest go first.
pub fn plan_prune(segments: &[u64], max_files: usize) -> &[u64] {
    let Some((_active, sealed)) = segments.split_last() else {
        return &[];
    };
    let excess = sealed.len().saturating_sub(max_files);
    &sealed[..excess]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_names() {
        assert_eq!(segment_file_name(1), "output-000001.log");
        assert_eq!(segment_file_name(1_234_567), "output-1234567.log");
        assert_eq!(parse_segment_index("output-000042.log"), Some(42));
        assert_eq!(parse_segment_index("output-.log"), None);
        assert_eq!(parse_segment_index("output-12a.log"), None);
        assert_eq!(parse_segment_index("stdout.log"), None);
        assert_eq!(parse_segment_index("output-000001.log.bak"), None);
    }

    #[test]
    fn test_needs_rotation() {
        assert!(!needs_rotation(0, 3));
        assert!(!needs_rotation(2, 3));
        assert!(needs_rotation(3, 3));
        assert!(needs_rotation(1, 0));
    }

    #[test]
    fn test_next_segment_index() {
        assert_eq!(next_segment_index(None), 1);
        assert_eq!(next_segment_index(Some(7)), 8);
    }

    #[test]
    fn test_plan_prune_keeps_active_and_newest_sealed() {
        assert_eq!(plan_prune(&[1, 2, 3, 4, 5], 2), &[1, 2]);
        assert_eq!(plan_prune(&[4, 5], 2), &[] as &[u64]);
        assert_eq!(plan_prune(&[9], 0), &[] as &[u64]);
        assert_eq!(plan_prune(&[], 3), &[] as &[u64]);
        assert_eq!(plan_prune(&[1, 2, 3], 0), &[1, 2]);
    }
}
