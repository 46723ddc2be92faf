//! # Certpost Scheduler
//!
//! The idempotent per-row processing loop: once a minute, sweep every row of
//! the source table, decide what each row needs, and push due rows through
//! render → persist → send → write-back. Rows fail independently; the sweep
//! never aborts on a row error.
//!
//! ```text
//! Sweeper (tokio interval, 60s)
//!   └── SweepEngine::run_sweep
//!         ├── SheetStore: header + all rows
//!         ├── eligibility: Skip / Due / InvalidDate per row
//!         └── CertificatePipeline (Due rows only)
//!               ├── RenderGateway: markup → PDF file
//!               ├── MailGateway: HTML + attachment
//!               └── write-back: "Yes" / "No"
//! ```

pub mod eligibility;
pub mod engine;
pub mod pipeline;

pub use eligibility::{RowAction, SkipReason, evaluate};
pub use engine::{SweepEngine, SweepStats, spawn_sweeper};
pub use pipeline::{CertificatePipeline, RowOutcome};
