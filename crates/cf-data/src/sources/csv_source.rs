use std::io::Read;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use ahash::AHashMap;
use csv::ReaderBuilder;
use cf_core::{Record, RecordStore};

use crate::config::LoadConfig;
use crate::schema::{LoadStats, RawValue, RowNormalizer};
use crate::DataError;

/// CSV data source for loading a dataset with a header row
pub struct CsvSource {
    /// Path to the CSV file
    path: PathBuf,
    /// Load configuration
    config: LoadConfig,
}

impl CsvSource {
    /// Create a new CSV source from a file path
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

    /// Read and parse a CSV file
    pub fn read_file(path: &Path, config: &LoadConfig) -> Result<(Vec<Record>, LoadStats), DataError> {
        let file = std::fs::File::open(path)?;
        Self::read_records(std::io::BufReader::new(file), config)
    }

    /// Parse records from any CSV reader
    pub fn read_records<R: Read>(reader: R, config: &LoadConfig) -> Result<(Vec<Record>, LoadStats), DataError> {
        config.fields.validate()?;

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(config.delimiter_byte())
            .from_reader(reader);

        // Header name -> column position
        let columns: AHashMap<String, usize> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_string(), idx))
            .collect();

        let mut normalizer = RowNormalizer::new(&config.fields, &config.null_config);
        let mut records = Vec::new();

        for result in csv_reader.records() {
            let row = result?;
            records.push(normalizer.normalize(|column| {
                columns
                    .get(column)
                    .and_then(|&idx| row.get(idx))
                    .map(RawValue::Text)
                    .unwrap_or(RawValue::Missing)
            }));
        }

        Ok((records, normalizer.stats()))
    }
}

#[async_trait]
impl cf_core::data::DataSource for CsvSource {
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
            .unwrap_or("unknown.csv")
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::data::DataSource;
    use crate::schema::FieldMapping;

    const SAMPLE: &str = "sector,country,region,year,intensity,relevance,impact\n\
        Energy,India,Southern Asia,2020,5,2,3\n\
        ,India,,,7,,\n\
        Retail,,Europe,2021\n";

    #[test]
    fn test_read_records_with_short_rows() {
        let config = LoadConfig {
            fields: FieldMapping::default().rename("end_year", "year"),
            ..LoadConfig::default()
        };
        let (records, stats) = CsvSource::read_records(SAMPLE.as_bytes(), &config).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].end_year, Some(2020));
        assert_eq!(records[0].impact, Some(3.0));
        assert_eq!(records[1].sector, None);
        assert_eq!(records[1].intensity, Some(7.0));
        assert_eq!(records[2].region.as_deref(), Some("Europe"));
        assert_eq!(records[2].intensity, None);
        assert!(!stats.has_anomalies());
    }

    #[test]
    fn test_custom_delimiter() {
        let config = LoadConfig {
            delimiter: Some(';'),
            ..LoadConfig::default()
        };
        let (records, _) = CsvSource::read_records("sector;intensity\nEnergy;4.5\n".as_bytes(), &config).unwrap();
        assert_eq!(records[0].intensity, Some(4.5));
    }

    #[test]
    fn test_unusable_numbers_are_counted() {
        let csv = "intensity,end_year\ninf,1e20\nNaN,2020\n";
        let (records, stats) = CsvSource::read_records(csv.as_bytes(), &LoadConfig::default()).unwrap();

        assert!(records[0].intensity.map(f64::is_nan).unwrap_or(false));
        assert_eq!(records[0].end_year, None);
        assert!(records[1].intensity.map(f64::is_nan).unwrap_or(false));
        assert_eq!(records[1].end_year, Some(2020));
        assert_eq!(stats.invalid_years, 1);
        assert_eq!(stats.invalid_measures, 2);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("cf_csv_source_{}.csv", std::process::id()));
        std::fs::write(&path, "sector,end_year\nEnergy,2020\nRetail,2021\n").unwrap();

        let store = CsvSource::new(path.clone()).load_all().await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).and_then(|r| r.end_year), Some(2021));
    }
}
