//! CLI entry point for the accident harm analysis.
//!
//! Provides subcommands for downloading the accident dataset from the open-data
//! portal, inspecting dataset metadata, and running the cleaning, filtering and
//! aggregation pipeline over a local CSV extract.

mod infra;
mod services;

use crate::infra::avaandmed::client::AvaandmedClient;
use crate::services::dataset_api::DatasetApi;
use accident_harm::analyzers::analyzer::analyze;
use accident_harm::analyzers::rules::Framing;
use accident_harm::config::RunConfig;
use accident_harm::normalize::MissingValuePolicy;
use accident_harm::output::{
    print_json, print_pretty, write_joined_series_file, write_record_export_file,
};
use accident_harm::parser::parse_table;
use accident_harm::schema::Translations;
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_DATASET: &str = "inimkannatanutega-liiklusonnetuste-andmed";

#[derive(Parser)]
#[command(name = "accident_harm")]
#[command(about = "Harm analysis of Estonian traffic accidents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the accident CSV from avaandmed.eesti.ee
    Fetch {
        /// Dataset id or slug on the portal
        #[arg(short, long, default_value = DEFAULT_DATASET)]
        dataset: String,

        /// File id within the dataset (defaults to the first CSV file)
        #[arg(short, long)]
        file_id: Option<String>,

        /// Where to save the downloaded file
        #[arg(short, long, default_value = "lo_2011_2023.csv")]
        output: String,
    },
    /// Show dataset metadata and its files
    Info {
        /// Dataset id or slug on the portal
        #[arg(short, long, default_value = DEFAULT_DATASET)]
        dataset: String,
    },
    /// Clean, filter and aggregate a local CSV extract
    Analyze {
        /// Semicolon-delimited accident CSV
        #[arg(value_name = "CSV")]
        input: String,

        /// Column name translation table (JSON array of {ee, en})
        #[arg(short, long, default_value = "data/column_name_translations.json")]
        translations: String,

        /// Run configuration JSON (area, policy, categories)
        #[arg(short, long)]
        config: Option<String>,

        /// Override the configured framing
        #[arg(long, value_enum)]
        framing: Option<Framing>,

        /// Override the configured missing-value policy
        #[arg(long, value_enum)]
        missing_values: Option<MissingValuePolicy>,

        /// CSV file for the joined day series
        #[arg(short, long, default_value = "harm_by_day.csv")]
        output: String,

        /// Optional: CSV export of the filtered accident records
        #[arg(long)]
        export: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/accident_harm.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("accident_harm.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            dataset,
            file_id,
            output,
        } => {
            fetch(&dataset, file_id, &output).await?;
        }
        Commands::Info { dataset } => {
            let client = AvaandmedClient::from_env().await?;
            let info = client.dataset_info(&dataset).await?;

            info!(id = %info.id, name = %info.name, files = info.files.len(), "Dataset");
            for file in &info.files {
                info!(file_id = %file.id, file_name = %file.name, "File");
            }
        }
        Commands::Analyze {
            input,
            translations,
            config,
            framing,
            missing_values,
            output,
            export,
        } => {
            let mut run_config = match &config {
                Some(path) => RunConfig::load(path)?,
                None => RunConfig::default(),
            };
            if let Some(framing) = framing {
                run_config.framing = framing;
            }
            if let Some(policy) = missing_values {
                run_config.missing_values = policy;
            }

            run_analysis(&input, &translations, &run_config, &output, export.as_deref())?;
        }
    }

    Ok(())
}

/// Downloads one dataset file to `output`.
#[tracing::instrument(skip(file_id))]
async fn fetch(dataset: &str, file_id: Option<String>, output: &str) -> Result<()> {
    let client = AvaandmedClient::from_env().await?;

    let file_id = match file_id {
        Some(id) => id,
        None => {
            let info = client.dataset_info(dataset).await?;
            info.csv_file()
                .map(|f| f.id.clone())
                .ok_or_else(|| anyhow!("Dataset '{dataset}' has no CSV file"))?
        }
    };

    let bytes = client.fetch_dataset_file(dataset, &file_id).await?;
    std::fs::write(output, &bytes).with_context(|| format!("Failed to write '{output}'"))?;

    info!(output, bytes = bytes.len(), "Dataset saved");
    Ok(())
}

/// Runs the analysis pipeline over a local CSV and writes its outputs.
#[tracing::instrument(skip(translations, config, export))]
fn run_analysis(
    input: &str,
    translations: &str,
    config: &RunConfig,
    output: &str,
    export: Option<&str>,
) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("Failed to read '{input}'"))?;
    let table = parse_table(&bytes)?;
    let translations = Translations::load(translations)?;

    let result = analyze(table, &translations, config)?;

    if !result.translation.is_clean() {
        warn!(
            untranslated = result.translation.untranslated.len(),
            stale = result.translation.stale.len(),
            "Translation table does not match the extract exactly"
        );
    }

    write_joined_series_file(output, &result.joined)?;
    info!(output, days = result.joined.rows.len(), "Joined day series written");

    if let Some(path) = export {
        write_record_export_file(path, &result.filtered, config.intervention_date)?;
        info!(path, records = result.filtered.len(), "Filtered records exported");
    }

    print_pretty(&result.normalize);
    for stats in &result.stats {
        print_json(stats)?;
    }
    for stats in &result.intervention {
        print_json(stats)?;
    }

    Ok(())
}
