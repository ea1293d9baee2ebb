//! Configuration for loading a dataset file

use std::path::Path;
use serde::{Serialize, Deserialize};

use super::null_handling::NullConfig;
use crate::schema::FieldMapping;

/// Supported dataset file types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// A JSON array of flat objects
    Json,
    /// A CSV file with a header row
    Csv,
}

impl FileType {
    /// Guess the file type from a path extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") | Some("tsv") => FileType::Csv,
            _ => FileType::Json,
        }
    }
}

/// How to read and normalize one dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Source column names for record fields
    pub fields: FieldMapping,

    /// Null handling configuration
    pub null_config: NullConfig,

    /// CSV delimiter, ignored for JSON
    pub delimiter: Option<char>,
}

impl LoadConfig {
    /// CSV delimiter byte, falling back to a comma
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter
            .filter(char::is_ascii)
            .map(|c| c as u8)
            .unwrap_or(b',')
    }
}
