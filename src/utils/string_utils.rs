/// String utility functions
pub struct StringUtils;

impl StringUtils {
    /// Keep the first `max_chars` characters, appending `...` when text was cut
    pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
        match s.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
            None => s.to_string(),
        }
    }

    /// Check if string is empty or whitespace only
    pub fn is_blank(s: &str) -> bool {
        s.trim().is_empty()
    }

    /// Uppercase the first character, lowercase the rest
    pub fn capitalize(word: &str) -> String {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }

    /// Strip each line, split on double spaces and rejoin the non-empty
    /// chunks with single spaces
    pub fn normalize_whitespace(text: &str) -> String {
        text.lines()
            .map(str::trim)
            .flat_map(|line| line.split("  "))
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(StringUtils::truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(StringUtils::truncate_with_ellipsis("hello world", 5), "hello...");
        assert_eq!(StringUtils::truncate_with_ellipsis("ñandú grande", 5), "ñandú...");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(StringUtils::capitalize("lAPTOP"), "Laptop");
        assert_eq!(StringUtils::capitalize(""), "");
    }

    #[test]
    fn test_normalize_whitespace() {
        let text = "  Premium   Laptop \n\n\n   Fast\tshipping  \n";
        assert_eq!(StringUtils::normalize_whitespace(text), "Premium Laptop Fast\tshipping");
        assert!(StringUtils::is_blank(" \n\t "));
    }
}
