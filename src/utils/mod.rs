/// Utility functions and helpers
pub mod string_utils;
pub mod validation_utils;

/// Length of the short analysis identifier
pub const ANALYSIS_ID_LEN: usize = 8;

/// Format duration in human readable format
pub fn format_duration(duration: std::time::Duration) -> String {
    let millis = duration.as_millis();

    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let total_seconds = duration.as_secs();
        format!("{}m {}s", total_seconds / 60, total_seconds % 60)
    }
}

/// Generate a short opaque analysis identifier
pub fn generate_analysis_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(ANALYSIS_ID_LEN);
    id
}

/// Extract domain from URL
pub fn extract_domain(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|s| s.to_string())
}

/// Turn a host like `www.best-laptops.com` into a display title
pub fn title_from_host(host: &str) -> String {
    let stripped = host.replace("www.", "").replace(".com", "").replace('.', " ");
    stripped
        .split_whitespace()
        .map(string_utils::StringUtils::capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(std::time::Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(std::time::Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(std::time::Duration::from_secs(90)), "1m 30s");
    }

    #[test]
    fn test_generate_analysis_id() {
        let id = generate_analysis_id();
        assert_eq!(id.len(), ANALYSIS_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_analysis_id());
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://example.com/path"), Some("example.com".to_string()));
        assert_eq!(extract_domain("invalid-url"), None);
    }

    #[test]
    fn test_title_from_host() {
        assert_eq!(title_from_host("www.laptopstore.com"), "Laptopstore");
        assert_eq!(title_from_host("shop.gear.co.uk"), "Shop Gear Co Uk");
    }
}
