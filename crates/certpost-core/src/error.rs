//! Certpost error taxonomy.
//!
//! One enum, one variant per failure domain. The pipeline maps these onto
//! per-row outcomes; only `Config` is allowed to abort the process.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CertpostError>;

#[derive(Error, Debug)]
pub enum CertpostError {
    /// Missing or malformed configuration — fatal at startup.
    #[error("Config error: {0}")]
    Config(String),

    /// Missing or unparseable row data — the row is skipped, never the sweep.
    #[error("Data error: {0}")]
    Data(String),

    /// Source table read/write failure.
    #[error("Sheet error: {0}")]
    Sheet(String),

    /// Certificate rendering or PDF conversion failure — fatal for the
    /// row's attempt, the row stays unmarked and retries next sweep.
    #[error("Render error: {0}")]
    Render(String),

    /// Mail delivery failure — recovered locally, row marked not-sent.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
