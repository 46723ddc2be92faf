//! Gateway traits — the seams to the external collaborators.
//!
//! The sweep engine only ever talks to these; concrete implementations live
//! in certpost-sheets, certpost-render, and certpost-channels, with in-memory
//! fakes for tests.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CertificateMail, CertificateVars, RawRow};

/// Source table — ordered rows, header lookup, single-cell write-back.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// The header row (sheet row 1).
    async fn read_header(&self) -> Result<Vec<String>>;

    /// All data rows in sheet order, starting at sheet row 2.
    async fn read_all_rows(&self) -> Result<Vec<RawRow>>;

    /// Write one cell at 1-based (row, column).
    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<()>;
}

/// Certificate document renderer.
#[async_trait]
pub trait RenderGateway: Send + Sync {
    /// Produce the certificate markup for one recipient.
    async fn render(&self, vars: &CertificateVars) -> Result<String>;

    /// Convert markup to a PDF file at `output`.
    async fn to_pdf(&self, markup: &str, output: &Path) -> Result<()>;
}

/// Mail transport.
#[async_trait]
pub trait MailGateway: Send + Sync {
    /// Deliver one certificate email with its PDF attachment.
    async fn send(&self, mail: &CertificateMail) -> Result<()>;
}
