//! Tag name normalization for bulk tagging.

use std::collections::{HashMap, HashSet};

/// Trim names, drop blanks, and remove duplicates while keeping first-seen order.
///
/// Comparison is exact after trimming: `"Frontend"` and `"frontend"` are two
/// different tags.
pub fn normalize_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed) {
            out.push(trimmed.to_string());
        }
    }
    tracing::trace!(
        input_count = names.len(),
        result_count = out.len(),
        "Normalized tag names"
    );
    out
}

/// Color requested for a normalized tag name.
///
/// Keys are matched after trimming, like the names themselves. When several
/// keys trim to the same name, a key equal to the name wins, then the
/// lowest key in byte order.
pub fn requested_color<'a>(colors: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    if let Some(color) = colors.get(name) {
        return Some(color.as_str());
    }
    colors
        .iter()
        .filter(|(key, _)| key.trim() == name)
        .min_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, color)| color.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(normalize_tag_names(&["Frontend", "Frontend"]), vec!["Frontend"]);
    }

    #[test]
    fn test_blanks_dropped() {
        assert_eq!(
            normalize_tag_names(&["", "  ", "Backend", "\t"]),
            vec!["Backend"]
        );
    }

    #[test]
    fn test_trim_before_dedup() {
        assert_eq!(
            normalize_tag_names(&[" Frontend", "Frontend "]),
            vec!["Frontend"]
        );
    }

    #[test]
    fn test_case_is_significant() {
        assert_eq!(
            normalize_tag_names(&["Frontend", "frontend"]),
            vec!["Frontend", "frontend"]
        );
    }

    #[test]
    fn test_order_preserved() {
        assert_eq!(
            normalize_tag_names(&["b", "a", "b", "c", "a"]),
            vec!["b", "a", "c"]
        );
    }

    fn colors(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_requested_color_matches_trimmed_key() {
        let map = colors(&[(" polly ", "#111111")]);
        assert_eq!(requested_color(&map, "polly"), Some("#111111"));
        assert_eq!(requested_color(&map, "Polly"), None);
    }

    #[test]
    fn test_requested_color_prefers_exact_key() {
        let map = colors(&[(" polly", "#111111"), ("polly", "#222222"), ("polly ", "#333333")]);
        assert_eq!(requested_color(&map, "polly"), Some("#222222"));
    }

    #[test]
    fn test_requested_color_tie_is_deterministic() {
        let map = colors(&[("polly ", "#333333"), (" polly", "#111111")]);
        assert_eq!(requested_color(&map, "polly"), Some("#111111"));
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        assert!(normalize_tag_names(&empty).is_empty());
    }
}
