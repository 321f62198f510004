// Keyword extraction: turns a free-text query into candidate search terms.

use std::collections::HashSet;

/// Common English words that carry no search signal.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "to", "of", "and", "in", "that", "have",
    "it", "for", "on", "with", "as", "do", "at", "this", "by", "from", "or", "about", "how",
    "what", "which", "when", "where", "who", "why",
];

const PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Extract a de-duplicated set of lowercase search terms from a raw query.
///
/// Lowercases, strips punctuation, splits on whitespace runs, then drops
/// tokens of length <= 3 and stop words. The result is treated as an
/// unordered set; an empty set tells the retriever to take its default path.
pub fn extract_keywords(query: &str) -> HashSet<String> {
    let cleaned: String = query
        .to_lowercase()
        .chars()
        .filter(|c| !PUNCTUATION.contains(c))
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| word.len() > 3 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}
