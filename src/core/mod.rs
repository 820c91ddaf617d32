use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{StudioError, StudioResult, UrlFailure};
use crate::extractor::ContentExtractor;
use crate::fetcher::Fetcher;
use crate::keywords::{KeywordEngine, TokenFrequency};
use crate::llm::markdown::markdown_to_html;
use crate::llm::{OpenAiClassifier, RelevanceClassifier};
use crate::logging::{LogContext, PerformanceLogger, RequestIdGenerator};
use crate::storage::{AnalysisResult, AnalysisSummary, ResultStore, UrlDetail};
use crate::utils::string_utils::StringUtils;
use crate::utils::validation_utils::ValidationUtils;
use crate::utils::{extract_domain, generate_analysis_id, title_from_host};

/// Successful pages needed before cross-page scoring means anything
pub const MIN_SUCCESSFUL_SOURCES: usize = 2;

/// Classifier output prepared for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub product_title: String,
    pub markdown: String,
    pub html: String,
}

/// Core application state and orchestrator
pub struct KeywordStudio {
    config: AppConfig,
    fetcher: Fetcher,
    extractor: ContentExtractor,
    engine: KeywordEngine,
    store: ResultStore,
    classifier: Arc<dyn RelevanceClassifier>,
    semaphore: Arc<Semaphore>,
}

impl KeywordStudio {
    /// Wire up every component from its own configuration section
    pub fn new(config: AppConfig) -> StudioResult<Self> {
        info!("Initializing Keyword Studio core");

        let fetcher = Fetcher::new(&config.scraping)?;
        let extractor = ContentExtractor::new(config.analysis.review_char_limit)?;
        let engine = KeywordEngine::new(&config.analysis)?;
        let store = ResultStore::new(&config.storage);
        let classifier: Arc<dyn RelevanceClassifier> = Arc::new(OpenAiClassifier::new(
            &config.llm,
            config.analysis.classifier_keyword_limit,
        )?);
        let semaphore = Arc::new(Semaphore::new(config.scraping.max_concurrent_requests.max(1)));

        info!("Result store at {}", store.data_dir().display());

        Ok(Self {
            config,
            fetcher,
            extractor,
            engine,
            store,
            classifier,
            semaphore,
        })
    }

    /// Replace the relevance classifier
    pub fn with_classifier(mut self, classifier: Arc<dyn RelevanceClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fetch, extract and tokenize every URL, then score and persist the
    /// analysis. Individual URL failures are recorded, not fatal.
    pub async fn analyze_urls(&self, urls: &[String]) -> StudioResult<AnalysisResult> {
        let request_id = RequestIdGenerator::generate();
        let perf = PerformanceLogger::new(
            LogContext::new("core", "analyze_urls")
                .with_request_id(request_id.clone())
                .with_number_field("url_count", urls.len() as i64),
        );

        let outcome = self.run_url_analysis(urls, &request_id).await;
        match &outcome {
            Ok(result) => perf.finish_with_status(
                &format!("Analysis {} completed", result.analysis_id),
                "success",
            ),
            Err(e) => perf.finish_with_error("Analysis failed", e),
        }
        outcome
    }

    async fn run_url_analysis(&self, urls: &[String], request_id: &str) -> StudioResult<AnalysisResult> {
        let urls = ValidationUtils::validate_url_inputs(urls, self.config.analysis.min_urls, self.config.analysis.max_urls)?;
        info!("Analyzing {} URLs", urls.len());

        // Not spawned: parsed documents are not Send
        let tasks = urls.iter().map(|url| async move {
            let _permit = match self.semaphore.acquire().await {
                Ok(permit) => permit,
                Err(e) => return self.failed(url, request_id, &StudioError::internal(e.to_string())),
            };
            self.process_url(url, request_id).await
        });
        let details = join_all(tasks).await;

        self.finish_analysis(details).await
    }

    /// Same pipeline over already-fetched HTML, given as `(source, html)`
    /// pairs
    pub async fn analyze_documents(&self, documents: &[(String, String)]) -> StudioResult<AnalysisResult> {
        let sources: Vec<String> = documents.iter().map(|(source, _)| source.clone()).collect();
        ValidationUtils::validate_url_inputs(&sources, self.config.analysis.min_urls, self.config.analysis.max_urls)?;

        let request_id = RequestIdGenerator::generate();
        let perf = PerformanceLogger::new(
            LogContext::new("core", "analyze_documents")
                .with_request_id(request_id)
                .with_number_field("document_count", documents.len() as i64),
        );

        let details = documents
            .iter()
            .map(|(source, html)| self.process_document(source, html))
            .collect();

        let outcome = self.finish_analysis(details).await;
        match &outcome {
            Ok(result) => perf.finish_with_status(
                &format!("Analysis {} completed", result.analysis_id),
                "success",
            ),
            Err(e) => perf.finish_with_error("Analysis failed", e),
        }
        outcome
    }

    /// Analyze saved HTML files, decoding each by its `<meta charset>`
    pub async fn analyze_files(&self, paths: &[PathBuf]) -> StudioResult<AnalysisResult> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = tokio::fs::read(path).await?;
            documents.push((path.display().to_string(), self.fetcher.decode_document(&bytes)));
        }

        self.analyze_documents(&documents).await
    }

    async fn process_url(&self, url: &str, request_id: &str) -> UrlDetail {
        match self.fetcher.fetch(url).await {
            Ok(page) => self.process_document(url, &page.text()),
            Err(e) => self.failed(url, request_id, &e),
        }
    }

    fn process_document(&self, source: &str, html: &str) -> UrlDetail {
        let page = self.extractor.extract(source, html);
        let keywords = self.engine.tokenize(&page.analysis_text());
        UrlDetail::success(source, &page, keywords)
    }

    fn failed(&self, url: &str, request_id: &str, error: &StudioError) -> UrlDetail {
        let context = LogContext::new("core", "process_url")
            .with_request_id(request_id)
            .with_url(url)
            .with_status("failed")
            .with_error_category(error.category())
            .with_string_field("reason", error.to_string());
        crate::log_warn!(context, "URL could not be processed");

        UrlDetail::failed(&UrlFailure::from_error(url, error))
    }

    /// Join point: score the successful pages and persist the record
    async fn finish_analysis(&self, details: Vec<UrlDetail>) -> StudioResult<AnalysisResult> {
        let pages: Vec<TokenFrequency> = details
            .iter()
            .filter(|detail| detail.is_success())
            .map(|detail| detail.filtered_keywords.clone())
            .collect();

        if pages.len() < MIN_SUCCESSFUL_SOURCES {
            let failures: Vec<UrlFailure> = details.iter().filter_map(UrlDetail::failure).collect();
            return Err(StudioError::InsufficientSources { failures });
        }

        let common_keywords = self.engine.score(&pages);
        let result = AnalysisResult::new(generate_analysis_id(), details, common_keywords);
        self.store.save(&result).await?;

        let context = LogContext::new("core", "finish_analysis")
            .with_analysis_id(result.analysis_id.clone())
            .with_number_field("successful_urls", pages.len() as i64)
            .with_number_field("keyword_count", result.keyword_count as i64);
        crate::log_info!(context, "Analysis stored");

        Ok(result)
    }

    /// User-facing completion message for an analysis
    pub fn summary_message(result: &AnalysisResult) -> String {
        let mut message = format!(
            "Analysis completed! Found {} common keywords from {} URLs.",
            result.keyword_count,
            result.successful_urls().count()
        );

        let failures = result.failures();
        if !failures.is_empty() {
            let listed: Vec<String> = failures.iter().map(ToString::to_string).collect();
            message.push_str(&format!(" Failed URLs: {}", listed.join(", ")));
        }

        message
    }

    pub async fn get_analysis(&self, analysis_id: &str) -> StudioResult<AnalysisResult> {
        self.store.load(analysis_id).await
    }

    pub async fn list_analyses(&self, limit: usize) -> StudioResult<Vec<AnalysisSummary>> {
        self.store.list(limit).await
    }

    /// Title of the first successful page, else a title derived from the
    /// first URL's host
    pub fn default_product_title(result: &AnalysisResult) -> String {
        if let Some(detail) = result.successful_urls().next() {
            if !detail.title.trim().is_empty() {
                return detail.title.trim().to_string();
            }
        }

        result
            .urls
            .first()
            .and_then(|url| extract_domain(url).or_else(|| extract_domain(&format!("https://{}", url))))
            .map(|host| title_from_host(&host))
            .unwrap_or_default()
    }

    /// Classify the stored keywords of an analysis for a product
    pub async fn classify(&self, analysis_id: &str, product_title: &str) -> StudioResult<ClassificationReport> {
        if StringUtils::is_blank(product_title) {
            return Err(StudioError::input("Please enter a product title"));
        }
        let product_title = product_title.trim();

        let result = self.store.load(analysis_id).await?;
        let perf = PerformanceLogger::new(
            LogContext::new("core", "classify")
                .with_analysis_id(analysis_id)
                .with_number_field("keyword_count", result.keyword_count as i64),
        );

        match self.classifier.classify(&result.common_keywords, product_title).await {
            Ok(markdown) => {
                perf.finish_with_status("Classification completed", "success");
                Ok(ClassificationReport {
                    product_title: product_title.to_string(),
                    html: markdown_to_html(&markdown),
                    markdown,
                })
            }
            Err(e) => {
                perf.finish_with_error("Classification failed", &e);
                Err(e)
            }
        }
    }

    /// Like [`classify`](Self::classify), but a classifier failure becomes
    /// inline text in the report
    pub async fn classify_for_display(&self, analysis_id: &str, product_title: &str) -> StudioResult<ClassificationReport> {
        match self.classify(analysis_id, product_title).await {
            Err(StudioError::Classification { message }) => {
                let text = format!("Error analyzing keywords: {}", message);
                Ok(ClassificationReport {
                    product_title: product_title.trim().to_string(),
                    html: html_escape::encode_text(&text).into_owned(),
                    markdown: text,
                })
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::keywords::KeywordMetric;
    use crate::storage::UrlStatus;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StubClassifier {
        reply: StudioResult<String>,
    }

    #[async_trait]
    impl RelevanceClassifier for StubClassifier {
        async fn classify(&self, keywords: &[KeywordMetric], product_title: &str) -> StudioResult<String> {
            match &self.reply {
                Ok(text) => Ok(format!("{}\n{} ({} keywords)", text, product_title, keywords.len())),
                Err(e) => Err(StudioError::classification(e.to_string())),
            }
        }
    }

    fn studio(dir: &TempDir) -> KeywordStudio {
        let mut config = AppConfig::default();
        config.storage.data_dir = dir.path().join("analyses");
        config.scraping.request_timeout_seconds = 1;
        KeywordStudio::new(config).unwrap()
    }

    fn product_html(title: &str, body: &str) -> String {
        format!(
            "<html><head><title>{title}</title></head><body>\
             <h1 class=\"product-title\">{title}</h1>\
             <div class=\"product-description\">{body}</div></body></html>"
        )
    }

    async fn mount_page(server: &MockServer, route: &str, html: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_failed_url_recorded_and_excluded() {
        let dir = TempDir::new().unwrap();
        let server = MockServer::start().await;
        mount_page(&server, "/a", product_html("Trail Running Shoe", "Lightweight trail running shoe")).await;
        mount_page(&server, "/b", product_html("Trail Running Shoe Pro", "Durable trail running shoe")).await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let urls = vec![
            format!("{}/a", server.uri()),
            format!("{}/slow", server.uri()),
            format!("{}/b", server.uri()),
        ];
        let studio = studio(&dir);
        let result = studio.analyze_urls(&urls).await.unwrap();

        assert_eq!(result.urls, urls);
        assert_eq!(result.urls_processed, 3);
        assert_eq!(result.url_details[1].status, UrlStatus::Failed);
        assert_eq!(result.url_details[1].error_kind, Some(FailureKind::Timeout));
        assert_eq!(result.successful_urls().count(), 2);

        let shoe = result
            .common_keywords
            .iter()
            .find(|kw| kw.keyword == "trail running shoe")
            .unwrap();
        assert_eq!(shoe.files_containing, 2);
        assert_eq!(shoe.coverage, 1.0);

        let message = KeywordStudio::summary_message(&result);
        assert!(message.starts_with(&format!(
            "Analysis completed! Found {} common keywords from 2 URLs.",
            result.keyword_count
        )));
        assert!(message.contains("Failed URLs: "));

        let stored = studio.get_analysis(&result.analysis_id).await.unwrap();
        assert_eq!(stored, result);
    }

    #[tokio::test]
    async fn test_single_success_fails_whole_analysis() {
        let dir = TempDir::new().unwrap();
        let server = MockServer::start().await;
        mount_page(&server, "/ok", product_html("Ceramic Mug", "Handmade ceramic mug")).await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let urls = vec![
            format!("{}/ok", server.uri()),
            format!("{}/missing", server.uri()),
            format!("{}/slow", server.uri()),
        ];
        let studio = studio(&dir);
        let err = studio.analyze_urls(&urls).await.unwrap_err();

        match &err {
            StudioError::InsufficientSources { failures } => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].kind, FailureKind::HttpStatus);
                assert_eq!(failures[1].kind, FailureKind::Timeout);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().starts_with("Not enough URLs could be crawled successfully. Failed URLs: "));
        assert!(studio.list_analyses(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_url_count_validated() {
        let dir = TempDir::new().unwrap();
        let err = studio(&dir)
            .analyze_urls(&["https://only.example".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, StudioError::InputValidation { .. }));
    }

    #[tokio::test]
    async fn test_analyze_documents_and_classify() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir).with_classifier(Arc::new(StubClassifier {
            reply: Ok("| Keyword/Phrase |\n|---|\n| **mug** |".to_string()),
        }));

        let documents = vec![
            ("mug-a.html".to_string(), product_html("Stoneware Coffee Mug", "Dishwasher safe coffee mug")),
            ("mug-b.html".to_string(), product_html("Coffee Mug Set", "Large coffee mug with handle")),
        ];
        let result = studio.analyze_documents(&documents).await.unwrap();

        assert!(result.common_keywords.iter().any(|kw| kw.keyword == "coffee mug"));
        assert_eq!(KeywordStudio::default_product_title(&result), "Stoneware Coffee Mug");

        let report = studio.classify(&result.analysis_id, "  Coffee Mug  ").await.unwrap();
        assert_eq!(report.product_title, "Coffee Mug");
        assert!(report.markdown.contains("Coffee Mug ("));
        assert!(report.html.starts_with("<table class=\"table table-striped table-bordered\">"));
        assert!(report.html.contains("<td><strong>mug</strong></td>"));
    }

    #[tokio::test]
    async fn test_analyze_files_decodes_declared_charset() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir);

        let mut latin = b"<html><head><meta charset=\"windows-1252\"><title>Caf".to_vec();
        latin.push(0xE9);
        latin.extend_from_slice(b" Mug</title></head><body><h1 class=\"product-title\">Ceramic coffee mug</h1></body></html>");
        let first = dir.path().join("a.html");
        std::fs::write(&first, latin).unwrap();

        let second = dir.path().join("b.html");
        std::fs::write(&second, product_html("Coffee Mug Set", "Large ceramic coffee mug")).unwrap();

        let result = studio.analyze_files(&[first, second]).await.unwrap();

        assert_eq!(result.url_details[0].title, "Café Mug");
        assert!(result.common_keywords.iter().any(|kw| kw.keyword == "ceramic coffee mug"));
    }

    #[tokio::test]
    async fn test_classify_rejects_blank_title_and_unknown_id() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir);

        assert!(matches!(studio.classify("abc12345", "   ").await, Err(StudioError::InputValidation { .. })));
        assert!(matches!(studio.classify("abc12345", "Mug").await, Err(StudioError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_classification_failure_shown_inline() {
        let dir = TempDir::new().unwrap();
        let studio = studio(&dir).with_classifier(Arc::new(StubClassifier {
            reply: Err(StudioError::classification("rate limited")),
        }));

        let documents = vec![
            ("a".to_string(), product_html("Desk Lamp", "LED desk lamp")),
            ("b".to_string(), product_html("Desk Lamp", "Dimmable desk lamp")),
        ];
        let result = studio.analyze_documents(&documents).await.unwrap();

        assert!(matches!(
            studio.classify(&result.analysis_id, "Desk Lamp").await,
            Err(StudioError::Classification { .. })
        ));

        let report = studio.classify_for_display(&result.analysis_id, "Desk Lamp").await.unwrap();
        assert!(report.markdown.starts_with("Error analyzing keywords: "));
        assert!(report.markdown.contains("rate limited"));
    }

    #[test]
    fn test_default_title_falls_back_to_host() {
        let failed = UrlDetail::failed(&UrlFailure {
            url: "https://www.best-laptops.com/item".to_string(),
            kind: FailureKind::Network,
            reason: "refused".to_string(),
        });
        let result = AnalysisResult::new("abc12345", vec![failed], Vec::new());

        assert_eq!(KeywordStudio::default_product_title(&result), "Best-laptops");
    }
}
