//! String similarity utilities used by the fuzzy state lookup.

/// Normalized Levenshtein similarity in `[0.0, 1.0]`.
///
/// `(max_len - distance) / max_len`, measured in chars. Two empty strings are
/// identical and score `1.0`.
pub fn similarity(s1: &str, s2: &str) -> f64 {
    strsim::normalized_levenshtein(s1, s2).clamp(0.0, 1.0)
}

/// Upper bound on `similarity(s1, s2)` that only looks at lengths.
///
/// Lets callers skip the quadratic distance computation for pairs that
/// cannot clear a threshold.
pub fn similarity_upper_bound(len1: usize, len2: usize) -> f64 {
    let max_len = len1.max(len2);
    if max_len == 0 {
        return 1.0;
    }
    len1.min(len2) as f64 / max_len as f64
}

/// Levenshtein edit distance between two strings, counted in chars.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    strsim::levenshtein(s1, s2)
}
