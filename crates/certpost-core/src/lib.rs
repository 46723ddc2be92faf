//! # Certpost Core
//!
//! Shared foundation for the certificate delivery service: configuration,
//! error taxonomy, the spreadsheet record model, time normalization, and
//! the gateway traits the other crates implement.

pub mod config;
pub mod error;
pub mod record;
pub mod timefmt;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::{CertpostError, Result};
pub use record::{Record, SweepContext, find_column};
pub use traits::{MailGateway, RenderGateway, SheetStore};
pub use types::{CertificateMail, CertificateVars, RawRow};
