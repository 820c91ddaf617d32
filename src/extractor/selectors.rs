//! Ranked selector tables for e-commerce page regions.
//!
//! Each content class lists its selectors from most to least specific; the
//! extractor takes the first one that yields text.

use serde::{Deserialize, Serialize};

/// E-commerce content class, with its repetition weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ProductTitle,
    Description,
    Specifications,
    Breadcrumbs,
    Reviews,
    Price,
}

impl Section {
    /// All sections in weighting order
    pub const ALL: [Section; 6] = [
        Section::ProductTitle,
        Section::Description,
        Section::Specifications,
        Section::Breadcrumbs,
        Section::Reviews,
        Section::Price,
    ];

    /// Number of times the section's text is repeated in the weighted blob
    pub fn weight(self) -> usize {
        match self {
            Section::ProductTitle => 3,
            Section::Description | Section::Specifications => 2,
            Section::Breadcrumbs | Section::Reviews | Section::Price => 1,
        }
    }

    pub fn selectors(self) -> &'static [&'static str] {
        match self {
            Section::ProductTitle => PRODUCT_TITLE_SELECTORS,
            Section::Description => DESCRIPTION_SELECTORS,
            Section::Specifications => SPECIFICATION_SELECTORS,
            Section::Breadcrumbs => BREADCRUMB_SELECTORS,
            Section::Reviews => REVIEW_SELECTORS,
            Section::Price => PRICE_SELECTORS,
        }
    }
}

pub const PRODUCT_TITLE_SELECTORS: &[&str] = &[
    "h1.product-title",
    "h1[class*=\"product\"]",
    "h1[class*=\"title\"]",
    ".product-name h1",
    ".product-title",
    ".pdp-product-name",
    "h1[data-testid*=\"product\"]",
    "[data-automation-id*=\"product-title\"]",
];

pub const DESCRIPTION_SELECTORS: &[&str] = &[
    ".product-description",
    ".product-details",
    ".pdp-description",
    "[class*=\"description\"]",
    "[class*=\"details\"]",
    ".product-info",
    "[data-testid*=\"description\"]",
    ".product-overview",
];

pub const SPECIFICATION_SELECTORS: &[&str] = &[
    ".specifications",
    ".product-specs",
    ".features",
    ".product-features",
    "[class*=\"spec\"]",
    "[class*=\"feature\"]",
    ".attributes",
    ".product-attributes",
    ".tech-specs",
    ".product-details-table",
];

pub const BREADCRUMB_SELECTORS: &[&str] = &[
    ".breadcrumb",
    ".breadcrumbs",
    "nav[aria-label*=\"breadcrumb\"]",
    "[class*=\"breadcrumb\"]",
    ".navigation-path",
    ".category-path",
];

pub const REVIEW_SELECTORS: &[&str] = &[
    ".reviews-summary",
    ".review-highlights",
    ".customer-reviews",
    "[class*=\"review\"]",
    ".ratings-reviews",
    ".product-reviews",
];

pub const PRICE_SELECTORS: &[&str] = &[
    ".price",
    ".product-price",
    "[class*=\"price\"]",
    ".cost",
    ".pricing",
    ".price-current",
    ".sale-price",
];

/// Fallback title when no product-title selector matches
pub const HEADING_SELECTOR: &str = "h1";

/// Generic main-content regions, tried when a page has no e-commerce structure
pub const GENERIC_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    ".content",
    ".main-content",
    "#content",
    "#main",
    ".post-content",
    ".entry-content",
    ".article-content",
];

/// Page chrome dropped from the body text in the last-resort fallback
pub const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside"];
pub const CHROME_CLASSES: &[&str] = &["sidebar", "navigation", "menu"];

/// Elements whose text never counts as content
pub const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];
