//! Payload types crossing the gateway seams.

use std::path::PathBuf;

use serde_json::Value;

/// One data row as read from the source table, cells still loosely typed.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based sheet row (first data row is 2).
    pub row: usize,
    pub cells: Vec<Value>,
}

/// Variables substituted into the certificate template.
#[derive(Debug, Clone)]
pub struct CertificateVars {
    pub name: String,
    pub course: String,
    pub month: String,
}

/// One outgoing certificate email.
#[derive(Debug, Clone)]
pub struct CertificateMail {
    pub to: String,
    pub name: String,
    pub course: String,
    pub month: String,
    pub attachment_path: PathBuf,
}
