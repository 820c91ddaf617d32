//! Phrase extraction and cross-page strategic scoring

pub mod scorer;
pub mod tokenizer;
pub mod vocabulary;

pub use scorer::{CrossDocumentScorer, KeywordMetric, StrategicTier, Thresholds};
pub use tokenizer::{TokenFrequency, Tokenizer};
pub use vocabulary::Vocabulary;

use crate::config::AnalysisConfig;
use crate::error::StudioResult;

/// Tokenizer and scorer sharing one resolved vocabulary
#[derive(Debug, Clone)]
pub struct KeywordEngine {
    tokenizer: Tokenizer,
    scorer: CrossDocumentScorer,
}

impl KeywordEngine {
    /// Create new engine from analysis settings
    pub fn new(config: &AnalysisConfig) -> StudioResult<Self> {
        let vocabulary = Vocabulary::with_extras(&config.extra_stop_words, &config.extra_preserve_words);

        Ok(Self {
            tokenizer: Tokenizer::new(vocabulary.clone(), config.max_ngram)?,
            scorer: CrossDocumentScorer::new(vocabulary),
        })
    }

    pub fn tokenize(&self, text: &str) -> TokenFrequency {
        self.tokenizer.tokenize(text)
    }

    pub fn score(&self, pages: &[TokenFrequency]) -> Vec<KeywordMetric> {
        self.scorer.score(pages)
    }
}
