//! csv-to-parquet: convert a CSV file to Parquet, detecting its encoding.
//!
//! Every outcome is reported as a log line; the process exits with status 0
//! even when the conversion fails.

use clap::Parser;
use medium_core::config::{Compression, ConfigOverrides, ConversionMode, ConvertConfig};
use medium_core::logging::{self, get_logger, LogLevel, Logger};
use medium_exec::pipeline::COMPONENT;
use medium_exec::{convert_with_mode, ConversionOutcome};
use medium_io::{detect_encoding, resolve_label, DetectOptions, DetectionSource, EncodingLabel};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "csv-to-parquet")]
#[command(about = "Convert CSV files to Parquet format.", long_about = None)]
struct Cli {
    /// Path to the input CSV file
    #[arg(short = 'c', long)]
    csv_file: PathBuf,

    /// Path to the output Parquet file
    #[arg(short = 'p', long)]
    parquet_file: PathBuf,

    /// Encoding of the CSV file (skips detection)
    #[arg(short, long)]
    encoding: Option<String>,

    /// JSON file with configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rows per record batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Read buffer size in bytes
    #[arg(long)]
    block_size: Option<usize>,

    /// Field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Treat the first line as data rather than a header
    #[arg(long)]
    no_header: bool,

    /// Log progress every N batches
    #[arg(long)]
    progress_every: Option<u64>,

    /// Parquet compression: snappy, zstd or uncompressed
    #[arg(long)]
    compression: Option<Compression>,

    /// Load the whole table before writing (single pass, more memory)
    #[arg(long)]
    in_memory: bool,

    /// Minimum log level
    #[arg(long)]
    log_level: Option<LogLevel>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            read_block_size: self.block_size,
            batch_size: self.batch_size,
            delimiter: self.delimiter,
            has_header: self.no_header.then_some(false),
            progress_every: self.progress_every,
            compression: self.compression,
            mode: self.in_memory.then_some(ConversionMode::InMemory),
            log_level: self.log_level,
            ..Default::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let cfg = load_config(&cli);
    let level = cfg
        .as_ref()
        .map(|c| c.log_level)
        .unwrap_or_else(|_| cli.log_level.unwrap_or_default());
    logging::init(level);
    let logger = get_logger(COMPONENT, level);

    let result = match cfg {
        Ok(cfg) => run(&cli, &cfg, &logger),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        logger.error(format!("Unexpected error: {e}"));
    }
}

/// Defaults, then environment, then `--config`, then flags.
fn load_config(cli: &Cli) -> medium_core::Result<ConvertConfig> {
    let mut cfg = ConvertConfig::from_env();
    if let Some(path) = &cli.config {
        cfg.apply(&ConfigOverrides::from_json_file(path)?)?;
    }
    cfg.apply(&cli.overrides())?;
    cfg.validate()?;
    Ok(cfg)
}

fn resolve_encoding(
    cli: &Cli,
    cfg: &ConvertConfig,
    logger: &Logger,
) -> Result<EncodingLabel, medium_io::Error> {
    let label = match &cli.encoding {
        Some(explicit) => resolve_label(explicit)?,
        None => detect_encoding(&cli.csv_file, &DetectOptions::from_config(cfg))?,
    };
    match label.source() {
        DetectionSource::Fallback => logger.warn(format!(
            "'{}' is empty; assuming {}",
            cli.csv_file.display(),
            label
        )),
        DetectionSource::Heuristic if !label.is_confident() => logger.warn(format!(
            "Low-confidence encoding guess for '{}': {}",
            cli.csv_file.display(),
            label
        )),
        _ => {}
    }
    Ok(label)
}

fn run(cli: &Cli, cfg: &ConvertConfig, logger: &Logger) -> Result<(), Box<dyn std::error::Error>> {
    let encoding = resolve_encoding(cli, cfg, logger)?;
    logger.info(format!(
        "Inferred encoding for '{}': {}",
        cli.csv_file.display(),
        encoding
    ));

    match convert_with_mode(&cli.csv_file, &cli.parquet_file, &encoding, cfg) {
        ConversionOutcome::Converted(report) => {
            logger.info(format!(
                "Successfully converted '{}' to '{}'.",
                cli.csv_file.display(),
                cli.parquet_file.display()
            ));
            logger.debug(serde_json::to_string(&report)?);
        }
        ConversionOutcome::Failed { message } => logger.error(message),
    }
    Ok(())
}
