use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TripDataError {
    #[error("Invalid trip type: {0}")]
    UnknownCategory(String),

    #[error("Invalid month {0}, expecting YYYY-MM")]
    InvalidMonth(String),

    #[error("Directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("No parquet files found in {}", .0.display())]
    NoParquetFiles(PathBuf),

    #[error("Download failed! {url} returned {status}")]
    HttpStatus { url: String, status: StatusCode },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    DuckDb(#[from] duckdb::Error),
}
