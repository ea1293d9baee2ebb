//! Demo mode for the dashboard
//! Builds a small built-in dataset so the charts can be explored without a file

use std::sync::Arc;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use anyhow::Result;
use cf_data::BatchSource;

const SECTORS: [&str; 5] = ["Energy", "Retail", "Manufacturing", "Government", "Financial services"];
const PLACES: [(&str, &str); 6] = [
    ("Northern America", "United States of America"),
    ("Western Asia", "Saudi Arabia"),
    ("Southern Asia", "India"),
    ("Eastern Europe", "Russia"),
    ("Central America", "Mexico"),
    ("Northern America", "Canada"),
];
const TOPICS: [&str; 4] = ["oil", "gas", "market", "growth"];

/// Synthetic insight rows
///
/// Rows are generated deterministically. Every seventh row leaves its country
/// and region empty and every eleventh row has no end year, so the missing
/// value paths are visible in the demo too.
pub fn sample_batch(rows: usize) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("sector", DataType::Utf8, true),
        Field::new("topic", DataType::Utf8, true),
        Field::new("region", DataType::Utf8, true),
        Field::new("country", DataType::Utf8, true),
        Field::new("end_year", DataType::Int64, true),
        Field::new("intensity", DataType::Float64, true),
        Field::new("relevance", DataType::Float64, true),
        Field::new("impact", DataType::Float64, true),
        Field::new("likelihood", DataType::Float64, true),
    ]));

    let place = |i: usize| (i % 7 != 6).then(|| PLACES[(i * 5) % PLACES.len()]);

    let sector: StringArray = (0..rows).map(|i| Some(SECTORS[(i * 3) % SECTORS.len()])).collect();
    let topic: StringArray = (0..rows).map(|i| Some(TOPICS[i % TOPICS.len()])).collect();
    let region: StringArray = (0..rows).map(|i| place(i).map(|(region, _)| region)).collect();
    let country: StringArray = (0..rows).map(|i| place(i).map(|(_, country)| country)).collect();
    let end_year: Int64Array = (0..rows)
        .map(|i| (i % 11 != 10).then(|| 2016 + (i % 9) as i64))
        .collect();

    let wave = |i: usize, period: f64| ((i as f64 / period).sin() + 1.0) / 2.0;
    let intensity: Float64Array = (0..rows).map(|i| Some((wave(i, 3.0) * 48.0).round())).collect();
    let relevance: Float64Array = (0..rows).map(|i| Some((wave(i, 5.0) * 6.0).round() + 1.0)).collect();
    let impact: Float64Array = (0..rows).map(|i| Some((wave(i, 2.0) * 4.0).round())).collect();
    let likelihood: Float64Array = (0..rows).map(|i| Some((wave(i, 7.0) * 3.0).round() + 1.0)).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(sector),
        Arc::new(topic),
        Arc::new(region),
        Arc::new(country),
        Arc::new(end_year),
        Arc::new(intensity),
        Arc::new(relevance),
        Arc::new(impact),
        Arc::new(likelihood),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Demo data source over [`sample_batch`]
pub fn demo_source() -> Result<BatchSource> {
    Ok(BatchSource::new("demo", sample_batch(120)?))
}
