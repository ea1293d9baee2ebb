//! Placeholder text that stands for a missing value

use serde::{Serialize, Deserialize};

/// Text cells that load as missing
///
/// The insights export writes missing categories and years as empty strings,
/// so the empty pattern is always part of the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullConfig {
    /// Cell contents read as missing
    pub patterns: Vec<String>,

    /// Ignore surrounding whitespace
    pub trim_whitespace: bool,

    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: ["", "null", "undefined", "N/A", "None"]
                .into_iter()
                .map(String::from)
                .collect(),
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Treat one more placeholder as missing
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if !self.patterns.iter().any(|p| *p == pattern) {
            self.patterns.push(pattern);
        }
        self
    }

    /// Whether a cell should load as missing
    pub fn is_null(&self, cell: &str) -> bool {
        let cell = if self.trim_whitespace { cell.trim() } else { cell };
        self.patterns.iter().any(|pattern| self.same_text(cell, pattern))
    }

    fn same_text(&self, cell: &str, pattern: &str) -> bool {
        if self.case_sensitive {
            cell == pattern
        } else {
            cell.eq_ignore_ascii_case(pattern)
        }
    }
}
