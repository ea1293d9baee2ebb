//! Main application entry point

use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cf_core::data::DataSource;
use cf_core::{FilterDimension, FilterValue};
use cf_data::{CsvSource, FileType, JsonSource, LoadConfig};
use cf_views::{ChartKind, Dashboard, DashboardConfig, JsonLinesEmitter, NullEmitter, ProjectionEmitter};

mod commands;
mod demo;

use commands::{Command, HELP};

/// Cross-filtered chart projections over an insights dataset
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dataset file (JSON array of objects, or CSV with a header row)
    #[arg(required_unless_present = "demo")]
    data: Option<PathBuf>,

    /// Dataset format, guessed from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Dashboard configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field mapping and null handling for the dataset (JSON)
    #[arg(long)]
    load_config: Option<PathBuf>,

    #[arg(long)]
    country: Option<String>,

    #[arg(long)]
    year: Option<String>,

    #[arg(long)]
    topic: Option<String>,

    #[arg(long)]
    sector: Option<String>,

    #[arg(long)]
    region: Option<String>,

    /// Only print this chart
    #[arg(long)]
    chart: Option<ChartKind>,

    /// Read filter commands from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Print the filter option lists and exit
    #[arg(long)]
    options: bool,

    /// Use the built-in sample dataset
    #[arg(long)]
    demo: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

impl From<Format> for FileType {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => FileType::Json,
            Format::Csv => FileType::Csv,
        }
    }
}

impl Cli {
    /// Filters given on the command line, in dimension order
    fn initial_filters(&self) -> Result<Vec<(FilterDimension, FilterValue)>> {
        let raw = [
            (FilterDimension::Country, &self.country),
            (FilterDimension::Year, &self.year),
            (FilterDimension::Topic, &self.topic),
            (FilterDimension::Sector, &self.sector),
            (FilterDimension::Region, &self.region),
        ];

        raw.into_iter()
            .filter_map(|(dimension, value)| value.as_deref().map(|value| (dimension, value)))
            .map(|(dimension, value)| -> Result<_> { Ok((dimension, dimension.parse_value(value)?)) })
            .collect()
    }

    fn data_source(&self) -> Result<Box<dyn DataSource>> {
        if self.demo {
            return Ok(Box::new(demo::demo_source()?));
        }

        let path = self.data.clone().context("No dataset given")?;
        let config = match &self.load_config {
            Some(config_path) => read_json::<LoadConfig>(config_path)?,
            None => LoadConfig::default(),
        };
        let file_type = self.format.map(FileType::from).unwrap_or_else(|| FileType::from_path(&path));

        Ok(match file_type {
            FileType::Json => Box::new(JsonSource::new(path).with_config(config)),
            FileType::Csv => Box::new(CsvSource::new(path).with_config(config)),
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries projections
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    };
    let filters = cli.initial_filters()?;

    let source = cli.data_source()?;
    let store = source
        .load_all()
        .await
        .with_context(|| format!("Failed to load {}", source.source_name()))?
        .shared();
    let dashboard = Dashboard::new(store, &config);

    let stdout = std::io::stdout();
    if cli.options {
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, &dashboard.filter_options())?;
        writeln!(out)?;
        return Ok(());
    }

    let mut emitter = JsonLinesEmitter::new(stdout.lock());

    if cli.interactive {
        dashboard.load(source.source_name(), &mut emitter);
        for (dimension, value) in filters {
            dashboard.set_filter(dimension, Some(value), &mut emitter);
        }
        run_interactive(&dashboard, &mut emitter).await?;
    } else {
        dashboard.load(source.source_name(), &mut NullEmitter);
        for (dimension, value) in filters {
            dashboard.set_filter(dimension, Some(value), &mut NullEmitter);
        }
        show(&dashboard, cli.chart, &mut emitter);
    }

    if emitter.failures() > 0 {
        anyhow::bail!("{} projections could not be written", emitter.failures());
    }
    Ok(())
}

fn show(dashboard: &Dashboard, chart: Option<ChartKind>, emitter: &mut dyn ProjectionEmitter) {
    let projections = match chart {
        Some(kind) => dashboard.project(kind).into_iter().collect(),
        None => dashboard.project_all(),
    };
    if projections.is_empty() {
        warn!("No enabled chart to show");
    }
    for projection in &projections {
        emitter.emit(projection);
    }
}

/// Apply filter commands from stdin until `quit` or end of input
async fn run_interactive(dashboard: &Dashboard, emitter: &mut dyn ProjectionEmitter) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match command {
            Command::Set(dimension, value) => {
                dashboard.set_filter(dimension, Some(value), emitter);
            }
            Command::Unset(dimension) => {
                dashboard.set_filter(dimension, None, emitter);
            }
            Command::Clear => {
                dashboard.clear_filters(emitter);
            }
            Command::Show(chart) => show(dashboard, chart, emitter),
            Command::Options => {
                let options = serde_json::to_string_pretty(&dashboard.filter_options())?;
                eprintln!("{}", options);
            }
            Command::Help => eprintln!("{}", HELP),
            Command::Quit => break,
        }
    }

    info!("Interactive session ended");
    Ok(())
}
