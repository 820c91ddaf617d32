//! Keyword Studio - competitive keyword research for product pages
//!
//! This library provides the core functionality for Keyword Studio, including:
//! - Fetching competitor product pages with a browser-like identity
//! - Weighted extraction of e-commerce page regions
//! - N-gram tokenization with a commerce-aware stop word policy
//! - Tiered cross-page keyword scoring
//! - File-per-analysis result storage and LLM relevance classification

pub mod config;
pub mod core;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod keywords;
pub mod llm;
pub mod logging;
pub mod storage;
pub mod utils;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::core::{ClassificationReport, KeywordStudio};
pub use crate::error::{StudioError, StudioResult};
pub use crate::keywords::KeywordMetric;
pub use crate::storage::AnalysisResult;
