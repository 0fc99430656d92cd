//! CSV → Parquet conversion.
//!
//! Streaming mode keeps at most one batch in memory: the writer is created
//! lazily from the first batch's schema and every batch becomes one row group.
//! In-memory mode reads the whole table before writing anything.
//!
//! Either way the writer, once opened, is closed before returning, and
//! failures come back as `ConversionOutcome::Failed` rather than `Err`.

use std::path::Path;
use std::time::Instant;

use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use thiserror::Error;

use medium_core::config::{ConversionMode, ConvertConfig};
use medium_core::logging::{get_logger, Logger};
use medium_io::{CsvBatchReader, CsvOptions, EncodingLabel, ParquetWriter};

use crate::outcome::{ConversionOutcome, ConversionReport};
use crate::progress::BatchProgress;

/// Component name the pipeline logs under.
pub const COMPONENT: &str = "csv_to_parquet";

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Config(#[from] medium_core::Error),
    #[error(transparent)]
    Io(#[from] medium_io::Error),
}

type Result<T> = std::result::Result<T, ExecError>;

/// Run the conversion selected by `cfg.mode`.
pub fn convert_with_mode<P, Q>(
    csv: P,
    parquet: Q,
    encoding: &EncodingLabel,
    cfg: &ConvertConfig,
) -> ConversionOutcome
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    match cfg.mode {
        ConversionMode::Streaming => convert_csv_to_parquet(csv, parquet, encoding, cfg),
        ConversionMode::InMemory => convert_in_memory(csv, parquet, encoding, cfg),
    }
}

/// Stream `csv` into `parquet`, one row group per batch.
pub fn convert_csv_to_parquet<P, Q>(
    csv: P,
    parquet: Q,
    encoding: &EncodingLabel,
    cfg: &ConvertConfig,
) -> ConversionOutcome
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (csv, parquet) = (csv.as_ref(), parquet.as_ref());
    let logger = get_logger(COMPONENT, cfg.log_level);
    let started = Instant::now();

    let mut writer: Option<ParquetWriter> = None;
    let mut progress = BatchProgress::new(cfg.progress_every);
    let streamed = stream_batches(csv, parquet, encoding, cfg, &mut writer, &mut progress, &logger);
    let closed = close_writer(writer);

    let schema = match settle(csv, streamed, closed, &logger) {
        Ok(schema) => schema,
        Err(e) => return failed(csv, &e),
    };

    logger.info(format!(
        "Conversion complete. Total batches: {}",
        progress.batches()
    ));
    finish(encoding, &schema, &progress, started)
}

/// Read every batch of `csv` into memory, then write them in one go.
pub fn convert_in_memory<P, Q>(
    csv: P,
    parquet: Q,
    encoding: &EncodingLabel,
    cfg: &ConvertConfig,
) -> ConversionOutcome
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (csv, parquet) = (csv.as_ref(), parquet.as_ref());
    let logger = get_logger(COMPONENT, cfg.log_level);
    let started = Instant::now();

    let (schema, batches) = match read_table(csv, encoding, cfg) {
        Ok(table) => table,
        Err(e) => return failed(csv, &e),
    };

    let mut progress = BatchProgress::new(cfg.progress_every);
    for batch in &batches {
        progress.record(batch.num_rows());
    }
    logger.info(format!(
        "Loaded {} batches ({} rows) into memory",
        progress.batches(),
        progress.rows()
    ));

    let mut writer: Option<ParquetWriter> = None;
    let written = write_table(parquet, &batches, cfg, &mut writer);
    let closed = close_writer(writer);
    if let Err(e) = settle(csv, written, closed, &logger) {
        return failed(csv, &e);
    }

    logger.info(format!(
        "Conversion complete. Total batches: {}",
        progress.batches()
    ));
    finish(encoding, &schema, &progress, started)
}

fn stream_batches(
    csv: &Path,
    parquet: &Path,
    encoding: &EncodingLabel,
    cfg: &ConvertConfig,
    writer: &mut Option<ParquetWriter>,
    progress: &mut BatchProgress,
    logger: &Logger,
) -> Result<SchemaRef> {
    cfg.validate()?;
    let reader = CsvBatchReader::open(csv, encoding, &CsvOptions::from_config(cfg))?;
    let schema = reader.schema();

    for batch in reader {
        let batch = batch?;
        if writer.is_none() {
            // Fixed for the rest of the run.
            *writer = Some(ParquetWriter::to_path(
                parquet,
                batch.schema(),
                cfg.compression,
            )?);
        }
        if let Some(w) = writer.as_mut() {
            w.write_row_group(&batch)?;
        }
        if progress.record(batch.num_rows()) {
            logger.info(format!("Processed {} batches...", progress.batches()));
        }
    }
    Ok(schema)
}

fn read_table(
    csv: &Path,
    encoding: &EncodingLabel,
    cfg: &ConvertConfig,
) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    cfg.validate()?;
    let reader = CsvBatchReader::open(csv, encoding, &CsvOptions::from_config(cfg))?;
    let schema = reader.schema();
    let batches = reader.collect::<medium_io::Result<Vec<_>>>()?;
    Ok((schema, batches))
}

fn write_table(
    parquet: &Path,
    batches: &[RecordBatch],
    cfg: &ConvertConfig,
    writer: &mut Option<ParquetWriter>,
) -> Result<()> {
    let Some(first) = batches.first() else {
        return Ok(());
    };
    let w = writer.insert(ParquetWriter::to_path(
        parquet,
        first.schema(),
        cfg.compression,
    )?);
    for batch in batches {
        w.write_batch(batch)?;
    }
    Ok(())
}

/// Close the writer if one was opened. Returns whether a file was produced.
fn close_writer(writer: Option<ParquetWriter>) -> Result<bool> {
    match writer {
        Some(w) => {
            w.close()?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Combine the body's result with the close result. A body failure wins;
/// a close failure after it is only logged.
fn settle<T>(csv: &Path, body: Result<T>, closed: Result<bool>, logger: &Logger) -> Result<T> {
    match (body, closed) {
        (Ok(value), Ok(written)) => {
            if !written {
                logger.warn(format!(
                    "No records found in '{}'; no output file was written",
                    csv.display()
                ));
            }
            Ok(value)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(_)) => Err(e),
        (Err(e), Err(close_err)) => {
            logger.warn(format!("Closing the output after a failure also failed: {close_err}"));
            Err(e)
        }
    }
}

fn finish(
    encoding: &EncodingLabel,
    schema: &SchemaRef,
    progress: &BatchProgress,
    started: Instant,
) -> ConversionOutcome {
    ConversionOutcome::Converted(ConversionReport {
        batches: progress.batches(),
        rows: progress.rows(),
        encoding: encoding.name().to_string(),
        columns: schema.fields().iter().map(|f| f.name().clone()).collect(),
        output_written: progress.batches() > 0,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

fn failed(csv: &Path, err: &ExecError) -> ConversionOutcome {
    ConversionOutcome::Failed {
        message: format!("Error converting '{}' to Parquet: {}", csv.display(), err),
    }
}
