// =============================================================================
// Speech Analysis — transcript tokenization, repetition, term frequency
// =============================================================================
//
// Works on a finished transcript string (speech-to-text happens upstream).
//
// Tokenization: lowercase, sentence punctuation stripped, whitespace split.
// Apostrophes are preserved so contractions stay single tokens ("don't").
//
// Repetition: the count of adjacent equal tokens. Immediate word echoing
// ("please please", "i... i") is the signal of interest, not global word
// frequency, which is reported separately as top terms.

use serde::{Deserialize, Serialize};

/// Features extracted from one transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFeatures {
    pub word_count: usize,
    /// Number of adjacent equal-token pairs.
    pub repetition_count: u32,
    /// Most frequent tokens, count descending, first-appearance tie-break.
    pub top_terms: Vec<(String, u32)>,
}

/// Split a transcript into normalized tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .flat_map(|c| c.to_lowercase())
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Count adjacent equal-token pairs in an already tokenized transcript.
pub fn repetition_count(words: &[String]) -> u32 {
    words.windows(2).filter(|w| w[0] == w[1]).count() as u32
}

/// Top `n` most frequent tokens. Ordering is count descending; ties keep
/// first-appearance order so the output is deterministic.
pub fn term_frequency(words: &[String], n: usize) -> Vec<(String, u32)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: std::collections::HashMap<&str, u32> = std::collections::HashMap::new();

    for word in words {
        let count = counts.entry(word.as_str()).or_insert(0);
        if *count == 0 {
            order.push(word.as_str());
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, u32)> = order
        .iter()
        .map(|word| (word.to_string(), counts[*word]))
        .collect();
    // Stable sort preserves first-appearance order within equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Run the full transcript analysis.
pub fn analyze(text: &str, top_n: usize) -> TranscriptFeatures {
    let words = tokenize(text);
    TranscriptFeatures {
        word_count: words.len(),
        repetition_count: repetition_count(&words),
        top_terms: term_frequency(&words, top_n),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(
            tokenize("It's too LOUD. Too loud!"),
            vec!["it's", "too", "loud", "too", "loud"]
        );
    }

    #[test]
    fn tokenize_drops_punctuation_only_tokens() {
        assert_eq!(tokenize("wait... - ... go"), vec!["wait", "go"]);
    }

    #[test]
    fn repetition_counts_adjacent_pairs_only() {
        let words = tokenize("please please go go go home");
        // "please please" once, "go go" twice.
        assert_eq!(repetition_count(&words), 3);
    }

    #[test]
    fn repetition_ignores_non_adjacent_recurrence() {
        let words = tokenize("home is far from home");
        assert_eq!(repetition_count(&words), 0);
    }

    #[test]
    fn repetition_on_distressed_utterance() {
        // Stammering and echoed phrases produce exactly two adjacent pairs:
        // "i i" at the start and "please please" in the middle.
        let text = "I... I don't want to go. I don't want to. Please. Please. \
                    It's too loud. It's too loud. I don't like it. I want to go home. \
                    I want mom. I want mom.";
        let words = tokenize(text);
        assert_eq!(repetition_count(&words), 2);
    }

    #[test]
    fn term_frequency_ranks_by_count() {
        let words = tokenize("go home go home go");
        assert_eq!(
            term_frequency(&words, 2),
            vec![("go".to_string(), 3), ("home".to_string(), 2)]
        );
    }

    #[test]
    fn term_frequency_tie_breaks_by_first_appearance() {
        let words = tokenize("b a b a c");
        assert_eq!(
            term_frequency(&words, 3),
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 2),
                ("c".to_string(), 1)
            ]
        );
    }

    #[test]
    fn term_frequency_truncates_to_n() {
        let words = tokenize("a b c d e");
        assert_eq!(term_frequency(&words, 2).len(), 2);
    }

    #[test]
    fn analyze_combines_all_features() {
        let features = analyze("too loud too loud", 10);
        assert_eq!(features.word_count, 4);
        assert_eq!(features.repetition_count, 0);
        assert_eq!(features.top_terms[0], ("too".to_string(), 2));
    }

    #[test]
    fn analyze_empty_transcript() {
        let features = analyze("", 10);
        assert_eq!(features.word_count, 0);
        assert_eq!(features.repetition_count, 0);
        assert!(features.top_terms.is_empty());
    }
}
