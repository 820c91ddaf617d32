use crate::error::{StudioError, StudioResult};

/// Validation utility functions
pub struct ValidationUtils;

impl ValidationUtils {
    /// Trim the submitted URL strings, drop empty entries and enforce the
    /// per-analysis bounds
    pub fn validate_url_inputs(urls: &[String], min: usize, max: usize) -> StudioResult<Vec<String>> {
        let cleaned: Vec<String> = urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();

        if cleaned.len() < min {
            return Err(StudioError::input(format!(
                "Please provide at least {} URLs for analysis",
                min
            )));
        }

        if cleaned.len() > max {
            return Err(StudioError::input(format!(
                "Maximum {} URLs allowed for analysis",
                max
            )));
        }

        Ok(cleaned)
    }

    /// Analysis ids are short alphanumeric tokens; anything else cannot name
    /// a stored record
    pub fn is_valid_analysis_id(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= 64
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}
