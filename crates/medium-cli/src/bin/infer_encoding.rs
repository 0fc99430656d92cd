//! infer-encoding: report the detected text encoding of a file.

use clap::Parser;
use medium_core::config::{ConfigOverrides, ConvertConfig};
use medium_core::logging::{self, get_logger, LogLevel};
use medium_io::{detect_encoding, DetectOptions};
use std::path::PathBuf;

const COMPONENT: &str = "infer_encoding";

#[derive(Parser, Debug)]
#[command(name = "infer-encoding")]
#[command(about = "Infer the encoding of a file.", long_about = None)]
struct Cli {
    /// Path to the file to infer encoding
    #[arg(short = 'f', long)]
    file_path: PathBuf,

    /// Bytes sampled from the start of the file
    #[arg(long)]
    sample_size: Option<usize>,

    /// Minimum log level
    #[arg(long)]
    log_level: Option<LogLevel>,
}

fn main() {
    let cli = Cli::parse();

    let mut cfg = ConvertConfig::from_env();
    let loaded = load_config(&cli, &mut cfg);

    logging::init(cfg.log_level);
    let logger = get_logger(COMPONENT, cfg.log_level);
    if let Err(e) = loaded {
        logger.error(format!("Unexpected error: {e}"));
        return;
    }

    match detect_encoding(&cli.file_path, &DetectOptions::from_config(&cfg)) {
        Ok(label) => {
            logger.info(format!(
                "Inferred encoding for '{}': {}",
                cli.file_path.display(),
                label
            ));
            logger.debug(format!(
                "source={:?} confident={}",
                label.source(),
                label.is_confident()
            ));
        }
        Err(e) => logger.error(format!("Unexpected error: {e}")),
    }
}

/// Layer the flags over `cfg`, then validate. `cfg` keeps the applied log
/// level even when validation fails, so the error is logged at that level.
fn load_config(cli: &Cli, cfg: &mut ConvertConfig) -> medium_core::Result<()> {
    cfg.apply(&ConfigOverrides {
        sample_size: cli.sample_size,
        log_level: cli.log_level,
        ..Default::default()
    })?;
    cfg.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_is_required() {
        assert!(Cli::try_parse_from(["infer-encoding"]).is_err());
        let cli = Cli::try_parse_from(["infer-encoding", "-f", "data.csv"]).unwrap();
        assert_eq!(cli.file_path, PathBuf::from("data.csv"));
        assert!(cli.sample_size.is_none());
    }

    #[test]
    fn sample_size_flag_parses() {
        let cli =
            Cli::try_parse_from(["infer-encoding", "--file-path", "x", "--sample-size", "512"])
                .unwrap();
        assert_eq!(cli.sample_size, Some(512));

        let mut cfg = ConvertConfig::default();
        load_config(&cli, &mut cfg).unwrap();
        assert_eq!(cfg.sample_size, 512);
    }

    #[test]
    fn zero_sample_size_is_rejected() {
        let cli =
            Cli::try_parse_from(["infer-encoding", "-f", "x", "--sample-size", "0"]).unwrap();
        let mut cfg = ConvertConfig::default();
        let err = load_config(&cli, &mut cfg).unwrap_err();
        assert!(err.to_string().contains("sample_size"), "{err}");
    }
}
