//! Null value handling for ingested fields

use serde::{Deserialize, Serialize};

/// Null value configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NullConfig {
    /// Tokens treated as null
    pub patterns: Vec<String>,

    /// Case sensitive matching
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    /// Only the empty field is null
    fn default() -> Self {
        Self {
            patterns: vec![String::new()],
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Empty field plus the placeholders commonly written by spreadsheet exports
    pub fn common() -> Self {
        Self {
            patterns: vec![
                String::new(),
                "-".to_string(),
                "N/A".to_string(),
                "NA".to_string(),
                "null".to_string(),
                "None".to_string(),
            ],
            case_sensitive: false,
        }
    }

    /// Check if an already trimmed field should be treated as null
    pub fn is_null(&self, value: &str) -> bool {
        if value.is_empty() {
            return true;
        }

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                value == pattern
            } else {
                value.eq_ignore_ascii_case(pattern)
            }
        })
    }

    /// Add a null pattern
    pub fn add_pattern(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    /// Remove a null pattern
    pub fn remove_pattern(&mut self, pattern: &str) {
        self.patterns.retain(|p| p != pattern);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_only_empty_is_null() {
        let config = NullConfig::default();
        assert!(config.is_null(""));
        assert!(!config.is_null("null"));
        assert!(!config.is_null("N/A"));
    }

    #[test]
    fn test_common_patterns_case_insensitive() {
        let config = NullConfig::common();
        assert!(config.is_null("n/a"));
        assert!(config.is_null("NULL"));
        assert!(config.is_null("-"));
        assert!(!config.is_null("0"));
    }

    #[test]
    fn test_empty_is_null_even_without_patterns() {
        let mut config = NullConfig::common();
        config.patterns.clear();
        assert!(config.is_null(""));
        assert!(!config.is_null("-"));
    }

    #[test]
    fn test_add_and_remove_pattern() {
        let mut config = NullConfig {
            case_sensitive: true,
            ..NullConfig::default()
        };
        config.add_pattern("missing");
        config.add_pattern("missing");
        assert_eq!(config.patterns.len(), 2);
        assert!(config.is_null("missing"));
        assert!(!config.is_null("MISSING"));

        config.remove_pattern("missing");
        assert!(!config.is_null("missing"));
    }
}
