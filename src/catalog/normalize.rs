//! Text normalization shared by catalog lookup and heading matching.

use unicode_normalization::UnicodeNormalization;

/// Normalize a line of text for heading comparison.
///
/// Applies NFKC, lowercases, collapses whitespace runs to single spaces and
/// strips punctuation from both ends of the line. Punctuation inside the
/// line is kept, so `"Co. Invoice"` and `"Co Invoice"` stay distinct.
/// `"  COMMERCIAL   Invoice: "` becomes `"commercial invoice"`.
pub fn normalize(text: &str) -> String {
    let folded: String = text.nfkc().collect::<String>().to_lowercase();
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| is_edge_punctuation(c) || c.is_whitespace())
        .to_string()
}

/// Tokens with their own edge punctuation stripped, for containment checks.
///
/// `"commercial invoice: no. 4471"` yields `commercial invoice no 4471`.
pub fn match_tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split(' ')
        .map(|t| t.trim_matches(is_edge_punctuation))
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_edge_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '–' | '—' | '‘' | '’' | '“' | '”' | '•' | '·' | '…' | '«' | '»'
        )
}
