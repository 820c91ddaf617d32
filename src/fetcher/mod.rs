use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::borrow::Cow;
use tracing::{debug, info};
use url::Url;

pub mod http_client;

use crate::config::ScrapingConfig;
use crate::error::{StudioError, StudioResult};
use crate::logging::LogContext;

const DEFAULT_ENCODING: &str = "utf-8";
const META_SNIFF_BYTES: usize = 2048;

/// Raw page retrieved for one URL
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after normalization
    pub url: Url,
    /// URL after redirects
    pub final_url: Url,
    pub status: u16,
    pub body: Vec<u8>,
    /// Lowercase charset label
    pub encoding: String,
}

impl FetchedPage {
    /// Decode the body using the inferred encoding
    pub fn text(&self) -> Cow<'_, str> {
        decode_body(&self.body, &self.encoding)
    }
}

/// Retrieves raw HTML for one URL at a time
pub struct Fetcher {
    http_client: http_client::HttpClient,
    meta_charset: Regex,
}

impl Fetcher {
    /// Create new fetcher
    pub fn new(config: &ScrapingConfig) -> StudioResult<Self> {
        let http_client = http_client::HttpClient::new(config)?;
        let meta_charset = Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-:.]+)"#)
            .map_err(|e| StudioError::internal(e.to_string()))?;

        Ok(Self {
            http_client,
            meta_charset,
        })
    }

    /// Normalize `raw_url`, GET it once and return the body with its encoding
    pub async fn fetch(&self, raw_url: &str) -> StudioResult<FetchedPage> {
        let url = normalize_url(raw_url)?;
        debug!("Fetching {}", url);

        let response = self.http_client.get(&url).await?;
        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let header_charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type);

        let body = response
            .bytes()
            .await
            .map_err(|e| http_client::map_transport_error(&url, e))?
            .to_vec();

        let encoding = header_charset
            .or_else(|| self.sniff_meta_charset(&body))
            .unwrap_or_else(|| DEFAULT_ENCODING.to_string());

        let context = LogContext::new("fetcher", "fetch")
            .with_url(url.as_str())
            .with_number_field("status_code", i64::from(status))
            .with_number_field("bytes", body.len() as i64)
            .with_string_field("encoding", encoding.clone());
        crate::log_info!(context, "Page fetched");

        Ok(FetchedPage {
            url,
            final_url,
            status,
            body,
            encoding,
        })
    }

    /// Decode HTML read from disk, honoring a `<meta charset>` declaration
    pub fn decode_document(&self, body: &[u8]) -> String {
        let encoding = self
            .sniff_meta_charset(body)
            .unwrap_or_else(|| DEFAULT_ENCODING.to_string());
        decode_body(body, &encoding).into_owned()
    }

    fn sniff_meta_charset(&self, body: &[u8]) -> Option<String> {
        let head = String::from_utf8_lossy(&body[..body.len().min(META_SNIFF_BYTES)]);
        self.meta_charset
            .captures(&head)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_ascii_lowercase())
    }
}

/// Validate a user-supplied URL; inputs without a scheme get `https://`
pub fn normalize_url(raw: &str) -> StudioResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StudioError::invalid_url(raw, "empty URL"));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        info!("No scheme on {}, defaulting to https", trimmed);
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| StudioError::invalid_url(raw, e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(StudioError::invalid_url(raw, format!("unsupported scheme '{}'", other)));
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(StudioError::invalid_url(raw, "missing host"));
    }

    Ok(url)
}

/// Decode `body` with the encoding named by `label`; unknown labels fall back
/// to UTF-8 and malformed sequences become U+FFFD
pub fn decode_body<'a>(body: &'a [u8], label: &str) -> Cow<'a, str> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text
}

fn has_scheme(input: &str) -> bool {
    input.split_once("://").is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches(|c| c == '"' || c == '\'').to_ascii_lowercase())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> ScrapingConfig {
        ScrapingConfig {
            request_timeout_seconds: 1,
            ..ScrapingConfig::default()
        }
    }

    #[test]
    fn test_normalize_url_adds_https() {
        let url = normalize_url("shop.example.com/laptops").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/laptops");
    }

    #[test]
    fn test_normalize_url_ignores_scheme_in_query() {
        let url = normalize_url("shop.test/p?ref=https://x").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("shop.test"));
        assert_eq!(url.query(), Some("ref=https://x"));
    }

    #[test]
    fn test_normalize_url_rejects_bad_input() {
        assert!(matches!(normalize_url(""), Err(StudioError::InvalidUrl { .. })));
        assert!(matches!(normalize_url("ftp://files.example.com"), Err(StudioError::InvalidUrl { .. })));
        assert!(matches!(normalize_url("http://"), Err(StudioError::InvalidUrl { .. })));
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(charset_from_content_type("text/html; charset=ISO-8859-1"), Some("iso-8859-1".to_string()));
        assert_eq!(charset_from_content_type("text/html; charset=\"utf-8\""), Some("utf-8".to_string()));
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn test_latin1_decoding() {
        let page = FetchedPage {
            url: Url::parse("https://a.test").unwrap(),
            final_url: Url::parse("https://a.test").unwrap(),
            status: 200,
            body: vec![b'c', b'a', b'f', 0xE9],
            encoding: "iso-8859-1".to_string(),
        };
        assert_eq!(page.text(), "café");
    }

    #[test]
    fn test_windows_1252_and_shift_jis_decoding() {
        let mut quoted = vec![0x93];
        quoted.extend_from_slice(b"Premium");
        quoted.push(0x94);
        assert_eq!(decode_body(&quoted, "windows-1252"), "\u{201C}Premium\u{201D}");

        assert_eq!(decode_body(&[0x8C, 0x43], "shift_jis"), "靴");
        assert_eq!(decode_body("plain".as_bytes(), "not-a-charset"), "plain");
    }

    #[test]
    fn test_decode_document_uses_meta_charset() {
        let fetcher = Fetcher::new(&test_config()).unwrap();
        let mut html = b"<html><head><meta charset=\"shift_jis\"></head><body>".to_vec();
        html.extend_from_slice(&[0x8C, 0x43]);
        html.extend_from_slice(b"</body></html>");

        assert!(fetcher.decode_document(&html).contains("<body>靴</body>"));
        assert_eq!(fetcher.decode_document("<p>caf\u{e9}</p>".as_bytes()), "<p>café</p>");
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product"))
            .and(header_regex("user-agent", "Chrome/122"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body><h1>Laptop</h1></body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let page = fetcher.fetch(&format!("{}/product", server.uri())).await.unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.encoding, "utf-8");
        assert!(page.text().contains("<h1>Laptop</h1>"));
    }

    #[tokio::test]
    async fn test_fetch_sniffs_meta_charset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"<html><head><meta charset=\"windows-1252\"></head></html>".to_vec(), "text/html"),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let page = fetcher.fetch(&server.uri()).await.unwrap();

        assert_eq!(page.encoding, "windows-1252");
    }

    #[tokio::test]
    async fn test_fetch_maps_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(matches!(err, StudioError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&test_config()).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(matches!(err, StudioError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_fetch_network_error() {
        let fetcher = Fetcher::new(&test_config()).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:1/").await.unwrap_err();

        assert!(matches!(err, StudioError::Network { .. } | StudioError::Timeout { .. }));
    }
}
