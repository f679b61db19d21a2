//! Token-set text similarity.

use std::collections::HashSet;

/// Common English words that carry no signal about which incident a
/// report describes. Tokens of two characters or fewer are dropped before
/// this list is consulted.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "his", "him", "how", "its", "may", "new", "now", "old",
    "see", "two", "way", "who", "did", "get", "let", "say", "she", "too", "use", "that", "with",
    "this", "from", "they", "been", "were", "said", "each", "which", "their", "will", "would",
    "there", "what", "about", "into", "than", "then", "them", "these", "those", "some", "also",
    "after", "before", "over", "under", "more", "most", "other", "such", "only", "very", "just",
    "where", "when", "while", "being", "because", "between", "during", "through", "could",
    "should", "does", "doing", "here", "your", "yours", "ours", "hers", "whom", "why",
];

#[derive(Debug, Clone)]
pub struct TextMatcher {
    stop_words: HashSet<&'static str>,
}

impl Default for TextMatcher {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }
}

impl TextMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip punctuation, lower-case, split on whitespace, then drop short
    /// tokens and stop words.
    pub fn tokenize(&self, text: &str) -> HashSet<String> {
        let cleaned: String = text
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
            .collect::<String>()
            .to_lowercase();
        cleaned
            .split_whitespace()
            .filter(|t| t.chars().count() > 2 && !self.stop_words.contains(t))
            .map(str::to_string)
            .collect()
    }

    /// Jaccard similarity of the two token sets, in [0, 1]. Zero when either
    /// side tokenizes to nothing.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let tokens_a = self.tokenize(a);
        let tokens_b = self.tokenize(b);
        if tokens_a.is_empty() || tokens_b.is_empty() {
            return 0.0;
        }
        let intersection = tokens_a.intersection(&tokens_b).count();
        let union = tokens_a.union(&tokens_b).count();
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_noise() {
        let m = TextMatcher::new();
        let tokens = m.tokenize("The Police, in Berlin, arrested 12 people!");
        let expected: HashSet<String> = ["police", "berlin", "arrested", "people"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_punctuation_is_removed_not_split() {
        let m = TextMatcher::new();
        assert!(m.tokenize("don't").contains("dont"));
    }

    #[test]
    fn test_only_stop_words_is_zero() {
        let m = TextMatcher::new();
        assert_eq!(m.similarity("the and for", "the and for"), 0.0);
    }
}
