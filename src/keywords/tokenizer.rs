use regex::Regex;
use std::collections::BTreeMap;

use super::vocabulary::{Vocabulary, ARTICLES};
use crate::error::{StudioError, StudioResult};

/// Phrase to occurrence count for one page. Ordered by phrase so that
/// iteration and serialization are deterministic.
pub type TokenFrequency = BTreeMap<String, u32>;

/// Turns plain text into unigram through n-gram counts
#[derive(Debug, Clone)]
pub struct Tokenizer {
    vocabulary: Vocabulary,
    max_ngram: usize,
    punctuation: Regex,
}

impl Tokenizer {
    /// Create new tokenizer emitting phrases of up to `max_ngram` words
    pub fn new(vocabulary: Vocabulary, max_ngram: usize) -> StudioResult<Self> {
        let punctuation = Regex::new(r"[^\w\s]").map_err(|e| StudioError::internal(e.to_string()))?;

        Ok(Self {
            vocabulary,
            max_ngram: max_ngram.max(1),
            punctuation,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Count every kept unigram and n-gram in `text`
    pub fn tokenize(&self, text: &str) -> TokenFrequency {
        let lowered = text.to_lowercase();
        let cleaned = self.punctuation.replace_all(&lowered, " ");
        let words: Vec<&str> = cleaned.split_whitespace().filter(|w| self.keep_word(w)).collect();

        let mut counts = TokenFrequency::new();

        for word in &words {
            if char_len(word) >= 3 || self.vocabulary.is_preserved(word) {
                *counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }

        for n in 2..=self.max_ngram.min(words.len()) {
            for gram in words.windows(n) {
                if self.keep_ngram(gram) && !has_article_edge(gram) {
                    *counts.entry(gram.join(" ")).or_insert(0) += 1;
                }
            }
        }

        counts
    }

    fn keep_word(&self, word: &str) -> bool {
        let len = char_len(word);

        !self.vocabulary.is_stop_word(word)
            && len >= 2
            && !word.chars().all(char::is_numeric)
            && (len != 2 || self.vocabulary.is_short_form(word))
            && word.chars().all(char::is_alphabetic)
    }

    fn keep_ngram(&self, gram: &[&str]) -> bool {
        !gram.iter().all(|w| self.vocabulary.is_stop_word(w))
            && gram.iter().all(|w| char_len(w) >= 2)
            && gram
                .iter()
                .any(|w| self.vocabulary.is_preserved(w) || char_len(w) >= 3)
    }
}

fn char_len(word: &str) -> usize {
    word.chars().count()
}

fn has_article_edge(gram: &[&str]) -> bool {
    let first = gram.first().copied().unwrap_or_default();
    let last = gram.last().copied().unwrap_or_default();
    ARTICLES.contains(&first) || ARTICLES.contains(&last)
}
