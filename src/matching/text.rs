//! Text normalisation shared by feeds and question texts.

use std::collections::HashSet;

fn is_hangul_syllable(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || is_hangul_syllable(c)
}

/// Lower-cases, replaces every character that is neither a word character
/// nor a Hangul syllable with a space, collapses whitespace runs and trims.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if is_kept(c) { c } else { ' ' })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-separated word set of an already normalised text.
pub fn token_set(normalized: &str) -> HashSet<&str> {
    normalized.split_whitespace().collect()
}

/// Jaccard similarity of two token sets; 0 when both are empty.
pub fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}
