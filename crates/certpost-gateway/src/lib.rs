//! # Certpost Gateway
//! HTTP surface of the service — a read-only health report.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
