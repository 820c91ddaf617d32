use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use keyword_studio::config::AppConfig;
use keyword_studio::logging::{init_logging, LogContext, RequestIdGenerator};
use keyword_studio::storage::AnalysisResult;
use keyword_studio::KeywordStudio;

#[derive(Parser)]
#[command(name = "keyword-studio")]
#[command(about = "Competitive keyword research for e-commerce product pages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(short, long, global = true, help = "Configuration file path")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl competitor product pages and score their shared keywords
    Analyze {
        #[arg(required = true, help = "Product page URLs (2 to 6)")]
        urls: Vec<String>,
    },

    /// Analyze saved HTML files instead of live pages
    AnalyzeFiles {
        #[arg(required = true, help = "HTML files (2 to 6)")]
        files: Vec<PathBuf>,
    },

    /// Show a stored analysis
    Show {
        #[arg(help = "Analysis ID")]
        analysis_id: String,

        #[arg(short, long, default_value_t = 25, help = "Number of keywords to show")]
        top: usize,
    },

    /// List stored analyses
    List {
        #[arg(short, long, help = "Number of analyses to show")]
        limit: Option<usize>,
    },

    /// Ask the language model to classify an analysis' keywords
    Classify {
        #[arg(help = "Analysis ID")]
        analysis_id: String,

        #[arg(short, long, help = "Product title (defaults to the first page title)")]
        title: Option<String>,

        #[arg(long, help = "Print the HTML rendering instead of markdown")]
        html: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)
            .await
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AppConfig::load().await?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging)?;
    let context = LogContext::new("main", "startup")
        .with_request_id(RequestIdGenerator::generate())
        .with_string_field("version", env!("CARGO_PKG_VERSION"));
    keyword_studio::log_info!(context, "Keyword Studio starting up");

    config.ensure_directories().await?;
    let app = KeywordStudio::new(config)?;

    match cli.command {
        Commands::Analyze { urls } => analyze_urls(&app, urls).await?,
        Commands::AnalyzeFiles { files } => analyze_files(&app, files).await?,
        Commands::Show { analysis_id, top } => show_analysis(&app, &analysis_id, top).await?,
        Commands::List { limit } => list_analyses(&app, limit).await?,
        Commands::Classify { analysis_id, title, html } => classify(&app, &analysis_id, title, html).await?,
    }

    Ok(())
}

async fn analyze_urls(app: &KeywordStudio, urls: Vec<String>) -> Result<()> {
    info!("Processing analysis request for {} URLs", urls.len());

    let result = app.analyze_urls(&urls).await?;
    print_outcome(&result);
    Ok(())
}

async fn analyze_files(app: &KeywordStudio, files: Vec<PathBuf>) -> Result<()> {
    info!("Processing analysis request for {} files", files.len());

    let result = app.analyze_files(&files).await?;
    print_outcome(&result);
    Ok(())
}

fn print_outcome(result: &AnalysisResult) {
    println!("{}", KeywordStudio::summary_message(result));
    println!("Analysis ID: {}", result.analysis_id);
    print_keywords(result, 10);
}

fn print_keywords(result: &AnalysisResult, top: usize) {
    println!();
    println!(
        "{:<40} {:>6} {:>9} {:>7} {:<16}",
        "Keyword", "Freq", "Coverage", "Score", "Tier"
    );
    println!("{}", "-".repeat(82));

    for keyword in result.common_keywords.iter().take(top) {
        println!(
            "{:<40} {:>6} {:>8}% {:>7} {:<16}",
            keyword.keyword.chars().take(40).collect::<String>(),
            keyword.frequency,
            (keyword.coverage * 100.0).round(),
            keyword.strategic_score,
            keyword.tier.to_string()
        );
    }
}

async fn show_analysis(app: &KeywordStudio, analysis_id: &str, top: usize) -> Result<()> {
    let result = app.get_analysis(analysis_id).await?;

    println!("Analysis Details:");
    println!("ID: {}", result.analysis_id);
    println!("Created: {}", result.timestamp.format("%Y-%m-%d %H:%M:%S"));
    println!("URLs processed: {}", result.urls_processed);
    println!("Keywords found: {}", result.keyword_count);

    println!("\nSources:");
    for detail in &result.url_details {
        match &detail.error {
            Some(error) => println!("  [{}] {} - {}", detail.status, detail.url, error),
            None => println!(
                "  [{}] {} - \"{}\" ({} phrases, {} tokens)",
                detail.status, detail.url, detail.title, detail.keyword_count, detail.total_tokens
            ),
        }
    }

    print_keywords(&result, top);
    Ok(())
}

async fn list_analyses(app: &KeywordStudio, limit: Option<usize>) -> Result<()> {
    let analyses = app.list_analyses(limit.unwrap_or(20)).await?;

    println!("Recent analyses:");
    println!("{:<10} {:<20} {:>6} {:>10} {:>9}", "ID", "Created", "URLs", "Succeeded", "Keywords");
    println!("{}", "-".repeat(59));

    for analysis in analyses {
        println!(
            "{:<10} {:<20} {:>6} {:>10} {:>9}",
            analysis.analysis_id,
            analysis.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            analysis.urls_processed,
            analysis.successful_urls,
            analysis.keyword_count
        );
    }

    Ok(())
}

async fn classify(app: &KeywordStudio, analysis_id: &str, title: Option<String>, html: bool) -> Result<()> {
    let product_title = match title {
        Some(title) => title,
        None => {
            let result = app.get_analysis(analysis_id).await?;
            KeywordStudio::default_product_title(&result)
        }
    };
    info!("Classifying analysis {} for '{}'", analysis_id, product_title);

    let report = app.classify_for_display(analysis_id, &product_title).await?;

    println!("Product: {}\n", report.product_title);
    if html {
        println!("{}", report.html);
    } else {
        println!("{}", report.markdown);
    }

    Ok(())
}
