//! String similarity scores on a 0-100 scale.

use strsim::normalized_levenshtein;

use super::exact_confidence;
use crate::catalog::match_tokens;

/// Similarity of two strings as a whole, 0-100.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    to_score(normalized_levenshtein(a, b))
}

/// Best [`ratio`] between the shorter string and every equally long
/// character window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let short_len = short.chars().count();
    if short_len == 0 {
        return 0;
    }

    let long_chars: Vec<char> = long.chars().collect();
    if long_chars.len() == short_len {
        return ratio(short, long);
    }

    let mut best = 0;
    for window in long_chars.windows(short_len) {
        let candidate: String = window.iter().collect();
        let score = ratio(short, &candidate);
        if score > best {
            best = score;
            if best == 100 {
                break;
            }
        }
    }
    best
}

/// Score a normalized heading line against a normalized catalog variant.
///
/// Lines longer than the variant are scored with [`partial_ratio`], capped
/// by [`exact_confidence`] for the tokens the line has beyond the variant.
/// A noisy line therefore never outscores a clean one. Lines no longer than
/// the variant use [`ratio`], so a fragment like `"in"` cannot score highly
/// against `"commercial invoice"`.
pub fn heading_similarity(line: &str, variant: &str) -> u8 {
    if line.chars().count() > variant.chars().count() {
        let extra = match_tokens(line)
            .len()
            .saturating_sub(match_tokens(variant).len());
        partial_ratio(line, variant).min(exact_confidence(extra))
    } else {
        ratio(line, variant)
    }
}

fn to_score(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}
