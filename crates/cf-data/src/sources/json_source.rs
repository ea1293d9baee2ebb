use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde_json::{Map, Value};
use cf_core::{Record, RecordStore};

use crate::config::LoadConfig;
use crate::schema::{LoadStats, RawValue, RowNormalizer};
use crate::DataError;

/// JSON data source
///
/// Reads a top-level array of flat objects, the shape the dataset server
/// returns. Keys that name no record field are ignored.
pub struct JsonSource {
    /// Path to the JSON file
    path: PathBuf,
    /// Load configuration
    config: LoadConfig,
}

impl JsonSource {
    /// Create a new JSON source from a file path
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: LoadConfig::default(),
        }
    }

    /// Use a custom load configuration
    pub fn with_config(mut self, config: LoadConfig) -> Self {
        self.config = config;
        self
    }

    /// Parse records from an in-memory JSON document
    pub fn parse_str(json: &str, config: &LoadConfig) -> Result<(Vec<Record>, LoadStats), DataError> {
        let value: Value = serde_json::from_str(json)?;
        Self::records_from_value(&value, config)
    }

    /// Read and parse a JSON file
    pub fn read_file(path: &Path, config: &LoadConfig) -> Result<(Vec<Record>, LoadStats), DataError> {
        let reader = BufReader::new(File::open(path)?);
        let value: Value = serde_json::from_reader(reader)?;
        Self::records_from_value(&value, config)
    }

    fn records_from_value(value: &Value, config: &LoadConfig) -> Result<(Vec<Record>, LoadStats), DataError> {
        config.fields.validate()?;

        let rows = value
            .as_array()
            .ok_or_else(|| DataError::Shape("expected a top-level JSON array".to_string()))?;

        let mut normalizer = RowNormalizer::new(&config.fields, &config.null_config);
        let mut records = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            let object = row
                .as_object()
                .ok_or_else(|| DataError::Shape(format!("row {} is not a JSON object", idx)))?;
            records.push(normalizer.normalize(|column| json_cell(object, column)));
        }

        Ok((records, normalizer.stats()))
    }
}

fn json_cell<'a>(object: &'a Map<String, Value>, column: &str) -> RawValue<'a> {
    match object.get(column) {
        None | Some(Value::Null) => RawValue::Missing,
        Some(Value::String(text)) => RawValue::Text(text),
        Some(Value::Number(n)) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Missing),
        Some(Value::Bool(b)) => RawValue::Bool(*b),
        // Nested values have no flat reading
        Some(Value::Array(_)) | Some(Value::Object(_)) => RawValue::Missing,
    }
}

#[async_trait]
impl cf_core::data::DataSource for JsonSource {
    async fn load_all(&self) -> anyhow::Result<RecordStore> {
        let (records, stats) = tokio::task::spawn_blocking({
            let path = self.path.clone();
            let config = self.config.clone();
            move || Self::read_file(&path, &config)
        })
        .await
        .map_err(DataError::from)??;

        Ok(super::finish_load(self.source_name(), records, stats))
    }

    fn source_name(&self) -> &str {
        self.path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.json")
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::data::DataSource;

    const SAMPLE: &str = r#"[
        {"_id": "a1", "sector": "Energy", "country": "India", "region": "Southern Asia",
         "topic": "oil", "end_year": 2020, "intensity": 5, "relevance": 2, "impact": ""},
        {"sector": "", "country": "India", "end_year": "", "intensity": "7", "likelihood": 3},
        {"sector": "Retail", "end_year": "2021", "relevance": "n/a?"}
    ]"#;

    #[test]
    fn test_parse_tolerates_missing_fields() {
        let (records, stats) = JsonSource::parse_str(SAMPLE, &LoadConfig::default()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].sector.as_deref(), Some("Energy"));
        assert_eq!(records[0].end_year, Some(2020));
        assert_eq!(records[0].impact, None);
        assert_eq!(records[1].sector, None);
        assert_eq!(records[1].end_year, None);
        assert_eq!(records[1].intensity, Some(7.0));
        assert_eq!(records[2].end_year, Some(2021));
        assert!(records[2].relevance.map(f64::is_nan).unwrap_or(false));
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.invalid_measures, 1);
    }

    #[test]
    fn test_rejects_non_array_document() {
        let result = JsonSource::parse_str(r#"{"sector": "Energy"}"#, &LoadConfig::default());
        assert!(matches!(result, Err(DataError::Shape(_))));

        let result = JsonSource::parse_str(r#"[1, 2]"#, &LoadConfig::default());
        assert!(matches!(result, Err(DataError::Shape(_))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("cf_json_source_{}.json", std::process::id()));
        std::fs::write(&path, SAMPLE).unwrap();

        let source = JsonSource::new(path.clone());
        let store = source.load_all().await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get(0).and_then(|r| r.country.as_deref()), Some("India"));
        assert!(source.source_name().starts_with("cf_json_source_"));
    }
}
