use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Score given when one normalized title contains the other.
pub const CONTAINMENT_SCORE: f64 = 0.8;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

fn normalize(title: &str) -> String {
    NON_WORD.replace_all(&title.to_lowercase(), "").into_owned()
}

/// Similarity of two titles in `[0, 1]`.
///
/// Containment of one normalized title in the other scores a flat 0.8;
/// otherwise the Jaccard index of the whitespace-separated word sets. Equal
/// titles contain each other, which is special-cased to 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (normalize(a), normalize(b));

    if !a.trim().is_empty() && !b.trim().is_empty() {
        if a == b {
            return 1.0;
        }
        if a.contains(b.as_str()) || b.contains(a.as_str()) {
            return CONTAINMENT_SCORE;
        }
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}
