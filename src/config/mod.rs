use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraping: ScrapingConfig,
    pub analysis: AnalysisConfig,
    pub llm: LLMConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingConfig {
    pub request_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub max_concurrent_requests: usize,
    pub max_redirects: usize,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub min_urls: usize,
    pub max_urls: usize,
    pub max_ngram: usize,
    pub review_char_limit: usize,
    pub classifier_keyword_limit: usize,
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
    #[serde(default)]
    pub extra_preserve_words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub api_base: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub max_files: usize,
    pub log_directory: PathBuf,
    pub include_targets: bool,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 30,
            connect_timeout_seconds: 10,
            max_concurrent_requests: 6,
            max_redirects: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_urls: 2,
            max_urls: 6,
            max_ngram: 4,
            review_char_limit: 500,
            classifier_keyword_limit: 40,
            extra_stop_words: Vec::new(),
            extra_preserve_words: Vec::new(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            max_tokens: 2000,
            timeout_seconds: 60,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = get_data_directory();

        Self {
            scraping: ScrapingConfig::default(),
            analysis: AnalysisConfig::default(),
            llm: LLMConfig::default(),
            storage: StorageConfig {
                data_dir: data_dir.join("analyses"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_enabled: false,
                console_enabled: true,
                max_files: 5,
                log_directory: data_dir.join("logs"),
                include_targets: true,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from default locations
    pub async fn load() -> Result<Self> {
        let config_path = get_config_path();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path).await?
        } else {
            info!("No configuration file found, using defaults");
            let config = Self::default();
            config.save().await?;
            config
        };

        ConfigOverrides::apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit configuration file and apply environment overrides
    pub async fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::load_from_path_with(path, |key| std::env::var(key).ok()).await
    }

    async fn load_from_path_with<P, F>(path: P, lookup: F) -> Result<Self>
    where
        P: AsRef<std::path::Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_from_file(path).await?;
        ConfigOverrides::apply_from(&mut config, lookup);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub async fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to default location
    pub async fn save(&self) -> Result<()> {
        self.save_to(get_config_path()).await
    }

    /// Save configuration to a specific path
    pub async fn save_to<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scraping.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Scraping request_timeout_seconds must be > 0"));
        }

        if self.scraping.max_concurrent_requests == 0 {
            return Err(anyhow::anyhow!("Scraping max_concurrent_requests must be > 0"));
        }

        if self.scraping.user_agent.trim().is_empty() {
            return Err(anyhow::anyhow!("A user agent must be configured"));
        }

        if self.analysis.min_urls < 2 {
            return Err(anyhow::anyhow!("Analysis min_urls must be at least 2"));
        }

        if self.analysis.max_urls < self.analysis.min_urls {
            return Err(anyhow::anyhow!("Analysis max_urls must be >= min_urls"));
        }

        if !(1..=4).contains(&self.analysis.max_ngram) {
            return Err(anyhow::anyhow!("Analysis max_ngram must be between 1 and 4"));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(anyhow::anyhow!("LLM temperature must be between 0.0 and 2.0"));
        }

        if self.llm.max_tokens == 0 {
            return Err(anyhow::anyhow!("LLM max_tokens must be > 0"));
        }

        Ok(())
    }

    /// Ensure all required directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        let mut dirs_to_create = vec![self.storage.data_dir.clone()];
        if self.logging.file_enabled {
            dirs_to_create.push(self.logging.log_directory.clone());
        }

        for dir in dirs_to_create {
            if !dir.exists() {
                tokio::fs::create_dir_all(&dir).await?;
                info!("Created directory: {}", dir.display());
            }
        }

        Ok(())
    }
}

/// Get the default data directory
fn get_data_directory() -> PathBuf {
    directories::ProjectDirs::from("com", "keywordstudio", "studio")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("data"))
}

/// Get the configuration file path
fn get_config_path() -> PathBuf {
    directories::ProjectDirs::from("com", "keywordstudio", "studio")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("config.toml"))
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        Self::apply_from(config, |key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_from<F>(config: &mut AppConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Storage overrides
        if let Some(data_dir) = lookup("KWS_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(data_dir);
        }

        // Scraping overrides
        if let Some(timeout) = lookup("KWS_REQUEST_TIMEOUT").and_then(|v| v.parse::<u64>().ok()) {
            config.scraping.request_timeout_seconds = timeout;
        }

        if let Some(concurrent) = lookup("KWS_SCRAPING_CONCURRENT").and_then(|v| v.parse::<usize>().ok()) {
            config.scraping.max_concurrent_requests = concurrent;
        }

        // LLM overrides
        if let Some(api_key) = lookup("KWS_OPENAI_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            config.llm.api_key = Some(api_key);
        }

        if let Some(api_base) = lookup("KWS_OPENAI_API_BASE") {
            config.llm.api_base = api_base;
        }

        if let Some(model) = lookup("KWS_LLM_MODEL") {
            config.llm.model = model;
        }

        if let Some(temp) = lookup("KWS_LLM_TEMPERATURE").and_then(|v| v.parse::<f32>().ok()) {
            config.llm.temperature = temp;
        }

        // Logging overrides
        if let Some(log_level) = lookup("KWS_LOG_LEVEL") {
            config.logging.level = log_level;
        }
    }
}
