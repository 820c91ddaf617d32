//! Word tables driving token filtering and quality scoring.

use std::collections::HashSet;

/// Functional, navigational and generic storefront words
pub const STOP_WORDS: &[&str] = &[
    // function words
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "i", "you", "your", "we",
    "they", "them", "this", "these", "those", "or", "but", "if", "then", "else", "when", "where",
    "why", "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "can", "just",
    "should", "now",
    // storefront chrome
    "account", "com", "login", "checkout", "cart", "currently", "available", "please", "click",
    "here", "view", "see", "per", "use", "within", "inc", "log", "must", "option", "yes", "also",
    "cancel", "password", "create", "get", "canceled", "submitted", "sign", "up", "register",
    "logout",
    // navigation
    "home", "page", "next", "previous", "back", "top", "bottom", "menu", "link", "button", "tab",
    "section", "content", "main", "sidebar", "footer", "header",
    // generic calls to action
    "read", "learn", "find", "discover", "explore", "browse", "visit", "contact", "about", "help",
    "support", "faq", "terms", "privacy", "policy", "legal",
];

/// Commerce terms that always survive filtering, whatever their length
pub const PRESERVE_WORDS: &[&str] = &[
    "product", "products", "price", "prices", "cost", "quality", "brand", "brands", "shipping",
    "delivery", "return", "returns", "warranty", "guarantee", "review", "reviews", "rating",
    "ratings", "customer", "customers", "sale", "discount", "offer", "deal", "promotion", "free",
    "premium", "size", "sizes", "color", "colors", "style", "styles", "model", "models",
    "material", "materials", "feature", "features", "specification", "specs",
];

/// Two-letter size and model abbreviations kept as tokens
pub const SHORT_FORMS: &[&str] = &["xs", "sm", "md", "lg", "xl", "os"];

/// Modifiers that mark a phrase as quality-positioned; matched as substrings
pub const QUALITY_TERMS: &[&str] = &[
    "premium", "professional", "advanced", "pro", "deluxe", "luxury", "organic", "natural", "eco",
    "sustainable", "biodegradable", "wireless", "bluetooth", "smart", "digital", "electronic",
    "waterproof", "durable", "lightweight", "portable", "compact", "multi", "ultra", "super",
    "extra", "plus", "max", "high", "quality", "best", "top", "rated", "popular", "featured",
];

/// Phrase-leading and phrase-trailing articles
pub const ARTICLES: &[&str] = &["the", "a", "an"];

/// Resolved word sets for one tokenizer instance
#[derive(Debug, Clone)]
pub struct Vocabulary {
    stop_words: HashSet<String>,
    preserve_words: HashSet<String>,
    short_forms: HashSet<String>,
    quality_terms: Vec<String>,
}

impl Vocabulary {
    /// Built-in tables extended with caller-supplied words. Preserve words
    /// win: they are removed from the stop set.
    pub fn with_extras(extra_stop_words: &[String], extra_preserve_words: &[String]) -> Self {
        let preserve_words: HashSet<String> = PRESERVE_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(extra_preserve_words.iter().map(|w| w.trim().to_lowercase()))
            .filter(|w| !w.is_empty())
            .collect();

        let stop_words: HashSet<String> = STOP_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(extra_stop_words.iter().map(|w| w.trim().to_lowercase()))
            .filter(|w| !w.is_empty() && !preserve_words.contains(w))
            .collect();

        Self {
            stop_words,
            preserve_words,
            short_forms: SHORT_FORMS.iter().map(|w| w.to_string()).collect(),
            quality_terms: QUALITY_TERMS.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn is_preserved(&self, word: &str) -> bool {
        self.preserve_words.contains(word)
    }

    pub fn is_short_form(&self, word: &str) -> bool {
        self.short_forms.contains(word)
    }

    /// True when any quality term occurs anywhere in the phrase
    pub fn has_quality_term(&self, phrase: &str) -> bool {
        let phrase = phrase.to_lowercase();
        self.quality_terms.iter().any(|term| phrase.contains(term.as_str()))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::with_extras(&[], &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserve_words_override_stop_words() {
        let vocabulary = Vocabulary::with_extras(&["price".to_string(), "Widget".to_string()], &[]);

        assert!(vocabulary.is_preserved("price"));
        assert!(!vocabulary.is_stop_word("price"));
        assert!(vocabulary.is_stop_word("widget"));
        assert!(vocabulary.is_stop_word("the"));
    }

    #[test]
    fn test_extra_preserve_removes_stop_word() {
        let vocabulary = Vocabulary::with_extras(&[], &["home".to_string()]);

        assert!(!vocabulary.is_stop_word("home"));
        assert!(vocabulary.is_preserved("home"));
    }

    #[test]
    fn test_quality_terms_match_substrings() {
        let vocabulary = Vocabulary::default();

        assert!(vocabulary.has_quality_term("Wireless Mouse"));
        assert!(vocabulary.has_quality_term("product line"));
        assert!(!vocabulary.has_quality_term("cotton towel"));
    }
}
