use arrow_schema::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Result type local to medium-io.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error inferring encoding for '{path}': {source}")]
    Detect {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Arrow(#[from] ArrowError),

    #[error("{0}")]
    Parquet(#[from] ParquetError),
}
