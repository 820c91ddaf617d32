use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::{FailureKind, StudioError, StudioResult, UrlFailure};
use crate::extractor::PageContent;
use crate::keywords::{KeywordMetric, TokenFrequency};
use crate::utils::validation_utils::ValidationUtils;

const FILE_PREFIX: &str = "analysis_";
const FILE_EXTENSION: &str = "json";

/// Outcome of processing one input URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStatus {
    Success,
    Failed,
}

impl std::fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlStatus::Success => write!(f, "success"),
            UrlStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Per-URL record inside an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlDetail {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Sum of all phrase counts
    pub total_tokens: u64,
    pub filtered_keywords: TokenFrequency,
    /// Number of distinct phrases
    pub keyword_count: usize,
    pub status: UrlStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

impl UrlDetail {
    pub fn success(url: impl Into<String>, page: &PageContent, keywords: TokenFrequency) -> Self {
        Self {
            url: url.into(),
            title: page.title.clone(),
            description: page.description.clone(),
            total_tokens: keywords.values().map(|&count| u64::from(count)).sum(),
            keyword_count: keywords.len(),
            filtered_keywords: keywords,
            status: UrlStatus::Success,
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(failure: &UrlFailure) -> Self {
        Self {
            url: failure.url.clone(),
            title: String::new(),
            description: String::new(),
            total_tokens: 0,
            filtered_keywords: TokenFrequency::new(),
            keyword_count: 0,
            status: UrlStatus::Failed,
            error: Some(failure.reason.clone()),
            error_kind: Some(failure.kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UrlStatus::Success
    }

    /// Rebuild the failure record of a failed URL
    pub fn failure(&self) -> Option<UrlFailure> {
        if self.is_success() {
            return None;
        }
        Some(UrlFailure {
            url: self.url.clone(),
            kind: self.error_kind.unwrap_or(FailureKind::Other),
            reason: self.error.clone().unwrap_or_default(),
        })
    }
}

/// Persisted outcome of one analysis run. Never modified after saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub timestamp: DateTime<Utc>,
    pub urls_processed: usize,
    pub urls: Vec<String>,
    pub common_keywords: Vec<KeywordMetric>,
    pub keyword_count: usize,
    pub url_details: Vec<UrlDetail>,
}

impl AnalysisResult {
    /// Assemble a record stamped with the current time
    pub fn new(analysis_id: impl Into<String>, url_details: Vec<UrlDetail>, common_keywords: Vec<KeywordMetric>) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            timestamp: Utc::now(),
            urls_processed: url_details.len(),
            urls: url_details.iter().map(|detail| detail.url.clone()).collect(),
            keyword_count: common_keywords.len(),
            common_keywords,
            url_details,
        }
    }

    pub fn successful_urls(&self) -> impl Iterator<Item = &UrlDetail> {
        self.url_details.iter().filter(|detail| detail.is_success())
    }

    pub fn failures(&self) -> Vec<UrlFailure> {
        self.url_details.iter().filter_map(UrlDetail::failure).collect()
    }
}

/// Lightweight listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub analysis_id: String,
    pub timestamp: DateTime<Utc>,
    pub urls_processed: usize,
    pub successful_urls: usize,
    pub keyword_count: usize,
}

impl From<&AnalysisResult> for AnalysisSummary {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            analysis_id: result.analysis_id.clone(),
            timestamp: result.timestamp,
            urls_processed: result.urls_processed,
            successful_urls: result.successful_urls().count(),
            keyword_count: result.keyword_count,
        }
    }
}

/// File-per-analysis JSON store
#[derive(Debug, Clone)]
pub struct ResultStore {
    data_dir: PathBuf,
}

impl ResultStore {
    /// Create new store rooted at the configured data directory
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, analysis_id: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}{}.{}", FILE_PREFIX, analysis_id, FILE_EXTENSION))
    }

    /// Write a new analysis; an existing record with the same id is never
    /// overwritten
    pub async fn save(&self, result: &AnalysisResult) -> StudioResult<PathBuf> {
        if !ValidationUtils::is_valid_analysis_id(&result.analysis_id) {
            return Err(StudioError::storage(format!(
                "Invalid analysis id: {}",
                result.analysis_id
            )));
        }

        tokio::fs::create_dir_all(&self.data_dir).await?;

        let path = self.path_for(&result.analysis_id);
        let content = serde_json::to_string_pretty(result)?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    StudioError::storage(format!("Analysis {} already exists", result.analysis_id))
                }
                _ => StudioError::from(e),
            })?;

        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        info!("Saved analysis {} to {}", result.analysis_id, path.display());
        Ok(path)
    }

    /// Read a stored analysis back unchanged
    pub async fn load(&self, analysis_id: &str) -> StudioResult<AnalysisResult> {
        let not_found = || StudioError::NotFound {
            analysis_id: analysis_id.to_string(),
        };

        if !ValidationUtils::is_valid_analysis_id(analysis_id) {
            return Err(not_found());
        }

        let path = self.path_for(analysis_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        debug!("Loaded analysis {} ({} bytes)", analysis_id, content.len());
        Ok(serde_json::from_str(&content)?)
    }

    /// Summaries of stored analyses, newest first
    pub async fn list(&self, limit: usize) -> StudioResult<Vec<AnalysisSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(analysis_id) = file_name
                .to_str()
                .and_then(|name| name.strip_prefix(FILE_PREFIX))
                .and_then(|name| name.strip_suffix(".json"))
            else {
                continue;
            };

            match self.load(analysis_id).await {
                Ok(result) => summaries.push(AnalysisSummary::from(&result)),
                Err(e) => warn!("Skipping unreadable analysis file {:?}: {}", file_name, e),
            }
        }

        summaries.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.analysis_id.cmp(&b.analysis_id))
        });
        summaries.truncate(limit);

        Ok(summaries)
    }
}
