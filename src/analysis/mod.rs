//! Tokenization and bounded word-frequency tables

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

pub mod stopwords;

pub use stopwords::StopwordLanguage;

/// Upper bound on the number of rows in a frequency table
pub const MAX_TOP_N: usize = 100;

/// One row of a frequency table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub word: String,
    pub count: u64,
    /// Share of all counted tokens, in percent
    pub percentage: f64,
}

/// Most frequent words, highest count first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub entries: Vec<FrequencyEntry>,

    /// Tokens counted after stopword removal, including those not shown
    pub total_tokens: u64,

    /// Distinct tokens counted after stopword removal
    pub distinct_tokens: usize,
}

impl FrequencyTable {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrequencyEntry> {
        self.entries.iter()
    }
}

// Runs of word characters that contain at least one letter; digit-only runs never match.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w*\p{Alphabetic}\w*").expect("token pattern is valid"))
}

/// Computes word frequencies with stopword filtering
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    stopwords: HashSet<String>,
    top_n: usize,
}

impl TextAnalyzer {
    pub fn new<I, S>(stopwords: I, top_n: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
            top_n: top_n.min(MAX_TOP_N),
        }
    }

    pub fn for_language(language: StopwordLanguage, top_n: usize) -> Self {
        Self::new(language.words().iter().copied(), top_n)
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    /// Lower-cased tokens of `text` with stopwords removed, in text order
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        token_pattern()
            .find_iter(&lowered)
            .map(|token| token.as_str())
            .filter(|token| !self.stopwords.contains(*token))
            .map(str::to_string)
            .collect()
    }

    pub fn analyze(&self, text: &str) -> FrequencyTable {
        self.analyze_segments([text])
    }

    /// Analyze several texts as one token stream. Each segment is tokenized on its own, so
    /// words at the end of one segment never merge with the start of the next.
    pub fn analyze_segments<'a, I>(&self, segments: I) -> FrequencyTable
    where
        I: IntoIterator<Item = &'a str>,
    {
        // word -> (count, position of first occurrence)
        let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
        let mut position = 0usize;

        for segment in segments {
            for token in self.tokenize(segment) {
                counts.entry(token).or_insert((0, position)).0 += 1;
                position += 1;
            }
        }

        let total_tokens = position as u64;
        let distinct_tokens = counts.len();
        if total_tokens == 0 {
            return FrequencyTable::default();
        }

        let mut ranked: Vec<(String, u64, usize)> = counts
            .into_iter()
            .map(|(word, (count, first))| (word, count, first))
            .collect();
        ranked.sort_unstable_by_key(|(_, count, first)| (Reverse(*count), *first));
        ranked.truncate(self.top_n);

        let entries = ranked
            .into_iter()
            .map(|(word, count, _)| FrequencyEntry {
                word,
                count,
                percentage: 100.0 * count as f64 / total_tokens as f64,
            })
            .collect();

        FrequencyTable {
            entries,
            total_tokens,
            distinct_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(top_n: usize) -> TextAnalyzer {
        TextAnalyzer::new(Vec::<String>::new(), top_n)
    }

    fn words(table: &FrequencyTable) -> Vec<&str> {
        table.iter().map(|entry| entry.word.as_str()).collect()
    }

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        let analyzer = plain(10);
        assert_eq!(
            analyzer.tokenize("Olá, MUNDO! Ação-reação."),
            vec!["olá", "mundo", "ação", "reação"]
        );
    }

    #[test]
    fn test_tokenize_drops_standalone_numbers() {
        let analyzer = plain(10);
        assert_eq!(analyzer.tokenize("em 2024 foram 3 vídeos"), vec!["em", "foram", "vídeos"]);
        assert_eq!(analyzer.tokenize("mp3 snake_case"), vec!["mp3", "snake_case"]);
    }

    #[test]
    fn test_stopwords_removed_case_insensitively() {
        let analyzer = TextAnalyzer::new(["De", "a"], 10);
        assert_eq!(analyzer.tokenize("Casa DE praia a"), vec!["casa", "praia"]);
        assert!(analyzer.is_stopword("DE"));
    }

    #[test]
    fn test_counts_and_percentages() {
        let table = plain(1).analyze("casa casa carro");

        assert_eq!(table.total_tokens, 3);
        assert_eq!(table.distinct_tokens, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.entries[0].word, "casa");
        assert_eq!(table.entries[0].count, 2);
        assert!((table.entries[0].percentage - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn test_ties_broken_by_first_occurrence() {
        let table = plain(10).analyze("zebra banana zebra banana apple");
        assert_eq!(words(&table), vec!["zebra", "banana", "apple"]);
    }

    #[test]
    fn test_length_is_min_of_top_n_and_distinct() {
        let text = "um dois tres quatro cinco dois tres tres";
        for top_n in 1..8 {
            let table = plain(top_n).analyze(text);
            assert_eq!(table.len(), top_n.min(5));
        }
    }

    #[test]
    fn test_counts_non_increasing_and_bounded_by_total() {
        let table = plain(3).analyze("a b c d a b c a b a e f");
        assert!(table
            .entries
            .windows(2)
            .all(|pair| pair[0].count >= pair[1].count));

        let shown: u64 = table.iter().map(|entry| entry.count).sum();
        assert!(shown <= table.total_tokens);

        let full = plain(100).analyze("a b c d a b c a b a e f");
        let shown: u64 = full.iter().map(|entry| entry.count).sum();
        assert_eq!(shown, full.total_tokens);
    }

    #[test]
    fn test_empty_and_stopword_only_text() {
        assert!(plain(10).analyze("").is_empty());
        assert_eq!(plain(10).analyze("").total_tokens, 0);

        let analyzer = TextAnalyzer::for_language(StopwordLanguage::Portuguese, 10);
        let table = analyzer.analyze("de que não para com uma");
        assert!(table.is_empty());
        assert_eq!(table.total_tokens, 0);
    }

    #[test]
    fn test_segments_do_not_merge_at_boundaries() {
        let table = plain(10).analyze_segments(["casa casa", "carro"]);

        assert_eq!(words(&table), vec!["casa", "carro"]);
        assert_eq!(table.total_tokens, 3);
        assert!((table.entries[0].percentage - 66.67).abs() < 0.01);
    }

    #[test]
    fn test_top_n_capped() {
        assert_eq!(plain(1000).top_n(), MAX_TOP_N);
        assert!(plain(0).analyze("palavra").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let analyzer = TextAnalyzer::for_language(StopwordLanguage::English, 5);
        let text = "the quick brown fox jumps over the lazy dog and the quick cat";
        assert_eq!(analyzer.analyze(text), analyzer.analyze(text));
    }
}
