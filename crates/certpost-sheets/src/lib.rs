//! # Certpost Sheets
//!
//! Source table gateway implementations: the Google Sheets v4 REST client
//! used in production, and an in-memory grid for tests.

pub mod google;
pub mod memory;

pub use google::GoogleSheetStore;
pub use memory::MemorySheetStore;
