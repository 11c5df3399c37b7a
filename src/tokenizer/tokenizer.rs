use std::collections::{HashMap, HashSet};

use crate::models::{Position, Term};

/// Normalize raw text into an ordered sequence of terms.
///
/// The text is lower-cased, every character that is not an ASCII letter
/// `a-z` or whitespace is removed (so `"don't"` becomes `"dont"` and
/// `"abc123"` becomes `"abc"`), and the remainder is split on whitespace.
/// Empty tokens never appear in the output.
///
/// # Example
///
/// ```
/// use shardex_search::tokenizer::tokenize;
///
/// assert_eq!(tokenize("The Quick, brown fox!"), vec!["the", "quick", "brown", "fox"]);
/// assert!(tokenize("123 !!!").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<Term> {
    if text.is_empty() {
        return Vec::new();
    }

    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| c.is_ascii_lowercase() || is_separator(c))
        .collect();

    cleaned
        .split(is_separator)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unicode whitespace plus the ASCII information separators U+001C..U+001F
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Tokenize and return (term, position) pairs in document order.
///
/// Positions are the 0-based offsets of each surviving token.
pub fn tokenize_with_positions(text: &str) -> Vec<(Term, Position)> {
    tokenize(text)
        .into_iter()
        .enumerate()
        .map(|(pos, term)| (term, pos as Position))
        .collect()
}

/// Compute term frequencies for a piece of text
pub fn term_frequencies(text: &str) -> HashMap<Term, u32> {
    let mut freq = HashMap::new();
    for token in tokenize(text) {
        *freq.entry(token).or_insert(0) += 1;
    }
    freq
}

/// Distinct terms in first-occurrence order
pub fn unique_terms(text: &str) -> Vec<Term> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}
