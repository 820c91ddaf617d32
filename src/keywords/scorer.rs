use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use super::tokenizer::TokenFrequency;
use super::vocabulary::Vocabulary;

/// Strategic tier a phrase qualified for, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicTier {
    /// Present on every page
    Universal,
    /// Present on a majority of pages
    Majority,
    /// Frequent on few pages
    HighFrequency,
    /// Carries a quality modifier
    QualityPattern,
    /// Recurring across several pages
    MultiSource,
}

impl StrategicTier {
    /// Additive boost applied to the phrase's total frequency
    pub fn offset(self) -> u32 {
        match self {
            StrategicTier::Universal => 1000,
            StrategicTier::Majority => 500,
            StrategicTier::HighFrequency => 200,
            StrategicTier::QualityPattern => 150,
            StrategicTier::MultiSource => 50,
        }
    }
}

impl fmt::Display for StrategicTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategicTier::Universal => write!(f, "universal"),
            StrategicTier::Majority => write!(f, "majority"),
            StrategicTier::HighFrequency => write!(f, "high_frequency"),
            StrategicTier::QualityPattern => write!(f, "quality_pattern"),
            StrategicTier::MultiSource => write!(f, "multi_source"),
        }
    }
}

/// Cross-page statistics for one scored phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetric {
    pub keyword: String,
    /// Total occurrences across all pages
    pub frequency: u32,
    pub coverage: f64,
    pub files_containing: usize,
    pub avg_frequency: f64,
    pub strategic_score: u32,
    pub tier: StrategicTier,
}

/// Page-count thresholds derived from the number of compared pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub majority: usize,
    pub partial: usize,
}

impl Thresholds {
    pub fn for_pages(pages: usize) -> Self {
        let majority = 2.max(pages / 2);
        let mut partial = 1.max(pages * 33 / 100);

        if majority == partial && pages >= 3 {
            partial = majority - 1;
        }

        Self { majority, partial }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PhraseStats {
    total: u32,
    files: usize,
}

/// Scores phrases by how consistently competitor pages use them
#[derive(Debug, Clone)]
pub struct CrossDocumentScorer {
    vocabulary: Vocabulary,
}

impl CrossDocumentScorer {
    /// Create new scorer; quality modifiers come from `vocabulary`
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Rank the phrases of successfully processed pages. Phrases that reach
    /// no tier are dropped.
    pub fn score(&self, pages: &[TokenFrequency]) -> Vec<KeywordMetric> {
        if pages.is_empty() {
            return Vec::new();
        }

        let mut stats: BTreeMap<&str, PhraseStats> = BTreeMap::new();
        for page in pages {
            for (phrase, count) in page {
                let entry = stats.entry(phrase.as_str()).or_default();
                entry.total += count;
                entry.files += 1;
            }
        }

        let page_count = pages.len();
        let thresholds = Thresholds::for_pages(page_count);

        let mut metrics: Vec<KeywordMetric> = stats
            .into_iter()
            .filter_map(|(phrase, stat)| {
                let avg_frequency = f64::from(stat.total) / stat.files as f64;
                let tier = self.classify_tier(phrase, stat, avg_frequency, page_count, thresholds)?;

                Some(KeywordMetric {
                    keyword: phrase.to_string(),
                    frequency: stat.total,
                    coverage: stat.files as f64 / page_count as f64,
                    files_containing: stat.files,
                    avg_frequency,
                    strategic_score: stat.total + tier.offset(),
                    tier,
                })
            })
            .collect();

        metrics.sort_by(compare_ranked);
        metrics
    }

    fn classify_tier(
        &self,
        phrase: &str,
        stat: PhraseStats,
        avg_frequency: f64,
        page_count: usize,
        thresholds: Thresholds,
    ) -> Option<StrategicTier> {
        let total = stat.total as usize;

        if stat.files == page_count && total >= 2 {
            Some(StrategicTier::Universal)
        } else if stat.files >= thresholds.majority && total >= 3 {
            Some(StrategicTier::Majority)
        } else if total >= 4.max(page_count) && avg_frequency >= 1.5 {
            Some(StrategicTier::HighFrequency)
        } else if stat.files >= thresholds.partial && total >= 2 && self.vocabulary.has_quality_term(phrase) {
            Some(StrategicTier::QualityPattern)
        } else if stat.files >= thresholds.partial && total >= 3 && avg_frequency >= 1.0 {
            Some(StrategicTier::MultiSource)
        } else {
            None
        }
    }
}

/// Score descending, then case-insensitive phrase order
fn compare_ranked(a: &KeywordMetric, b: &KeywordMetric) -> Ordering {
    b.strategic_score
        .cmp(&a.strategic_score)
        .then_with(|| a.keyword.to_lowercase().cmp(&b.keyword.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(entries: &[(&str, u32)]) -> TokenFrequency {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn scorer() -> CrossDocumentScorer {
        CrossDocumentScorer::new(Vocabulary::default())
    }

    fn find<'a>(metrics: &'a [KeywordMetric], keyword: &str) -> Option<&'a KeywordMetric> {
        metrics.iter().find(|m| m.keyword == keyword)
    }

    #[test]
    fn test_universal_phrases_and_singleton_dropped() {
        let pages = vec![
            page(&[("best", 2), ("laptop", 3)]),
            page(&[("best", 1), ("laptop", 2), ("quality", 1)]),
            page(&[("best", 3), ("laptop", 1)]),
        ];
        let metrics = scorer().score(&pages);

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].keyword, "best");
        assert_eq!(metrics[0].strategic_score, 1006);
        assert_eq!(metrics[1].keyword, "laptop");
        assert_eq!(metrics[1].strategic_score, 1006);
        assert!(metrics.iter().all(|m| m.tier == StrategicTier::Universal));
        assert!(find(&metrics, "quality").is_none());
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(Thresholds::for_pages(2), Thresholds { majority: 2, partial: 1 });
        assert_eq!(Thresholds::for_pages(3), Thresholds { majority: 2, partial: 1 });
        assert_eq!(Thresholds::for_pages(4), Thresholds { majority: 2, partial: 1 });
        assert_eq!(Thresholds::for_pages(6), Thresholds { majority: 3, partial: 1 });
    }

    #[test]
    fn test_partial_threshold_below_majority() {
        for pages in 2..=20 {
            let thresholds = Thresholds::for_pages(pages);
            assert!(thresholds.partial < thresholds.majority, "pages = {}", pages);
        }
    }

    #[test]
    fn test_tiers_in_priority_order() {
        let pages = vec![
            page(&[("desk", 1), ("wireless charger", 2), ("standing desk", 5), ("cable", 2), ("oak", 1)]),
            page(&[("desk", 1), ("cable", 1)]),
            page(&[("desk", 1), ("lamp", 1)]),
            page(&[("desk", 1), ("hook", 3)]),
        ];
        let metrics = scorer().score(&pages);

        assert_eq!(find(&metrics, "desk").map(|m| m.tier), Some(StrategicTier::Universal));
        assert_eq!(find(&metrics, "cable").map(|m| m.tier), Some(StrategicTier::Majority));
        assert_eq!(find(&metrics, "standing desk").map(|m| m.tier), Some(StrategicTier::HighFrequency));
        assert_eq!(find(&metrics, "wireless charger").map(|m| m.tier), Some(StrategicTier::QualityPattern));
        assert_eq!(find(&metrics, "hook").map(|m| m.tier), Some(StrategicTier::MultiSource));
        assert!(find(&metrics, "oak").is_none());
        assert!(find(&metrics, "lamp").is_none());

        let scores: Vec<u32> = metrics.iter().map(|m| m.strategic_score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(scores, sorted);
    }

    #[test]
    fn test_coverage_invariants() {
        let pages = vec![
            page(&[("ceramic mug", 2), ("handmade", 4)]),
            page(&[("ceramic mug", 1), ("glaze", 3)]),
            page(&[("ceramic mug", 3), ("handmade", 1)]),
        ];
        let metrics = scorer().score(&pages);
        let n = pages.len() as f64;

        assert!(!metrics.is_empty());
        for metric in &metrics {
            assert!(metric.coverage > 0.0 && metric.coverage <= 1.0);
            assert_eq!(metric.files_containing, (metric.coverage * n).round() as usize);
            assert!(metric.frequency as usize >= metric.files_containing);
            assert!(metric.files_containing <= pages.len());
        }
    }

    #[test]
    fn test_ties_broken_case_insensitively() {
        let pages = vec![page(&[("Zebra", 1), ("apple", 1)]), page(&[("Zebra", 1), ("apple", 1)])];
        let metrics = scorer().score(&pages);

        let keywords: Vec<&str> = metrics.iter().map(|m| m.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["apple", "Zebra"]);
    }

    #[test]
    fn test_higher_frequency_never_loses_tier() {
        let low = vec![page(&[("gadget", 1)]), page(&[("gadget", 1)])];
        let high = vec![page(&[("gadget", 4)]), page(&[("gadget", 4)])];

        let low_score = scorer().score(&low)[0].strategic_score;
        let high_score = scorer().score(&high)[0].strategic_score;
        assert!(high_score >= low_score);
    }

    #[test]
    fn test_empty_input() {
        assert!(scorer().score(&[]).is_empty());
    }
}
