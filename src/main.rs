use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

use location_normalizer::app::batch_use_case::NormalizeBatchUseCase;
use location_normalizer::app::ports::LocationSink;
use location_normalizer::config::AppConfig;
use location_normalizer::infra::ndjson_sink::NdjsonSink;
use location_normalizer::infra::ndjson_source::{LinesSource, NdjsonSource};
use location_normalizer::observability;
use location_normalizer::registry::registry;
use location_normalizer::{LocationInput, LocationNormalizer};

#[derive(Parser)]
#[command(name = "location-normalizer")]
#[command(about = "Normalize free-text lead locations to US city and state")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to $LOCATION_NORMALIZER_CONFIG, then normalizer.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a single location string and print the result as JSON
    Normalize {
        /// The raw location text
        text: String,
        /// Organization name or other text to mine when the location is empty
        #[arg(long)]
        hint: Option<String>,
    },
    /// Normalize every row of a file
    Batch {
        /// Input file
        #[arg(long)]
        input: PathBuf,
        /// Output file for normalized rows (NDJSON); stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
        /// How to read the input
        #[arg(long, value_enum, default_value_t = InputFormat::Ndjson)]
        format: InputFormat,
    },
    /// List the state registry
    States,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    /// One JSON object per line
    Ndjson,
    /// One raw location per line
    Lines,
}

fn run_batch(
    config: &AppConfig,
    input: &Path,
    output: Option<&Path>,
    format: InputFormat,
) -> Result<()> {
    let use_case = NormalizeBatchUseCase::new(&config.normalizer);
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?,
    );

    let mut sink: Box<dyn LocationSink> = match output {
        Some(path) => Box::new(
            NdjsonSink::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(NdjsonSink::new(io::stdout().lock())),
    };

    let summary = match format {
        InputFormat::Ndjson => use_case.run(NdjsonSource::new(reader, &config.batch), &mut *sink),
        InputFormat::Lines => use_case.run(LinesSource::new(reader), &mut *sink),
    }
    .context("Batch normalization failed")?;

    info!(input = %input.display(), "Batch complete");
    // Summary goes to stderr when rows are streamed to stdout
    let report = serde_json::to_string_pretty(&summary)?;
    if output.is_some() {
        println!("{}", report);
    } else {
        eprintln!("{}", report);
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    observability::init_logging();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Normalize { text, hint } => {
            let normalizer = LocationNormalizer::new(&config.normalizer);
            let mut input = LocationInput::new(text);
            input.context_hint = hint;
            let location = normalizer.normalize(&input);
            println!("{}", serde_json::to_string_pretty(&location)?);
        }
        Commands::Batch {
            input,
            output,
            format,
        } => {
            run_batch(&config, &input, output.as_deref(), format)?;
        }
        Commands::States => {
            for state in registry().states() {
                println!("{}\t{}", state.abbreviation, state.name);
            }
        }
    }
    Ok(())
}
