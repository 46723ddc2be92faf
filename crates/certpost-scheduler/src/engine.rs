//! Sweep engine — one full pass over the source table, and the minute loop
//! that drives it.
//!
//! Rows are processed strictly sequentially; the spreadsheet is mutated in
//! place per row and there is no locking discipline that would make
//! concurrent mutation safe. Firings are serialized by running the sweep
//! inline in the timer loop. There is no cross-process coordination: two
//! replicas would race on the same sheet.

use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;

use certpost_core::config::AppConfig;
use certpost_core::error::Result;
use certpost_core::record::{Record, STATUS_COLUMN, SweepContext, find_column};
use certpost_core::traits::{MailGateway, RenderGateway, SheetStore};

use crate::eligibility::{RowAction, SkipReason, evaluate};
use crate::pipeline::{CertificatePipeline, RowOutcome};

/// Counters for one sweep, for the log line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub invalid: usize,
}

/// Sweeps the source table and pushes due rows through the pipeline.
pub struct SweepEngine {
    store: Arc<dyn SheetStore>,
    pipeline: CertificatePipeline,
    timezone: Tz,
}

impl SweepEngine {
    pub fn new(
        store: Arc<dyn SheetStore>,
        renderer: Arc<dyn RenderGateway>,
        mailer: Arc<dyn MailGateway>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            pipeline: CertificatePipeline::new(renderer, mailer, &config.render.output_dir),
            timezone: config.timezone,
        }
    }

    /// One full sweep at the current instant in the configured timezone.
    pub async fn run_sweep(&self) -> Result<SweepStats> {
        self.run_sweep_at(SweepContext::now(self.timezone)).await
    }

    /// One full sweep at a fixed instant (injectable for tests).
    pub async fn run_sweep_at(&self, ctx: SweepContext) -> Result<SweepStats> {
        let header = self.store.read_header().await?;
        let status_col = find_column(&header, STATUS_COLUMN);
        if status_col.is_none() {
            tracing::warn!("⚠️ No '{STATUS_COLUMN}' column — outcomes will not be persisted");
        }

        let rows = self.store.read_all_rows().await?;
        if rows.is_empty() {
            tracing::info!("No user data found in the sheet");
            return Ok(SweepStats::default());
        }

        let mut stats = SweepStats::default();
        for raw in &rows {
            let record = Record::from_cells(raw.row, &header, &raw.cells);
            match evaluate(&record, &ctx) {
                RowAction::Skip(SkipReason::AlreadySent) => {
                    tracing::debug!("Certificate already sent for {}, skipping", record.name);
                    stats.skipped += 1;
                }
                RowAction::Skip(SkipReason::NotDue) => {
                    stats.skipped += 1;
                }
                RowAction::Skip(SkipReason::Incomplete) => {
                    tracing::warn!("Skipping incomplete record at row {} ({})", record.row, record.name);
                    // Normalize missing/garbled state so the cell reads "No".
                    self.write_status(status_col, record.row, false).await;
                    stats.skipped += 1;
                }
                RowAction::InvalidDate => {
                    tracing::error!(
                        "Invalid date format for {}: {}",
                        record.name,
                        record.date_of_completion
                    );
                    stats.invalid += 1;
                }
                RowAction::Due => {
                    tracing::info!(
                        "Processing {}: date = '{}', time = '{}'",
                        record.name,
                        record.date_of_completion,
                        record.scheduled_time
                    );
                    match self.pipeline.process(&record).await {
                        RowOutcome::Sent => {
                            self.write_status(status_col, record.row, true).await;
                            stats.sent += 1;
                        }
                        RowOutcome::SendFailed => {
                            self.write_status(status_col, record.row, false).await;
                            stats.failed += 1;
                        }
                        // Render failures leave the row untouched so the
                        // next sweep retries from scratch.
                        RowOutcome::RenderFailed => {
                            stats.failed += 1;
                        }
                    }
                }
            }
        }
        Ok(stats)
    }

    /// Write "Yes"/"No" to the status column, if it exists. A failed
    /// write-back is logged and swallowed; the row simply retries.
    async fn write_status(&self, status_col: Option<usize>, row: usize, sent: bool) {
        let Some(col) = status_col else { return };
        let value = if sent { "Yes" } else { "No" };
        if let Err(e) = self.store.write_cell(row, col, value).await {
            tracing::warn!("⚠️ Write-back failed for row {row}: {e}");
        }
    }
}

/// Drive the engine once per `period_secs`. A late tick still fires (the
/// misfire is absorbed rather than dropped); sweeps are serialized because
/// each runs to completion before the next tick is awaited.
pub async fn spawn_sweeper(engine: Arc<SweepEngine>, period_secs: u64) {
    tracing::info!("⏰ Sweeper started (every {period_secs}s)");
    let mut interval = tokio::time::interval(Duration::from_secs(period_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match engine.run_sweep().await {
            Ok(stats) => {
                if stats != SweepStats::default() {
                    tracing::info!(
                        "📬 Sweep done: {} sent, {} failed, {} skipped, {} invalid",
                        stats.sent,
                        stats.failed,
                        stats.skipped,
                        stats.invalid
                    );
                }
            }
            Err(e) => tracing::error!("❌ Sweep failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use certpost_core::error::CertpostError;
    use certpost_core::types::{CertificateMail, CertificateVars};
    use certpost_sheets::MemorySheetStore;

    struct MockRenderer {
        fail: bool,
        renders: Mutex<usize>,
    }

    #[async_trait]
    impl RenderGateway for MockRenderer {
        async fn render(&self, vars: &CertificateVars) -> certpost_core::Result<String> {
            if self.fail {
                return Err(CertpostError::Render("template exploded".into()));
            }
            *self.renders.lock().unwrap() += 1;
            Ok(format!("<html>{}</html>", vars.name))
        }

        async fn to_pdf(&self, _markup: &str, _output: &Path) -> certpost_core::Result<()> {
            Ok(())
        }
    }

    struct MockMailer {
        fail: bool,
        sent: Mutex<Vec<CertificateMail>>,
    }

    #[async_trait]
    impl MailGateway for MockMailer {
        async fn send(&self, mail: &CertificateMail) -> certpost_core::Result<()> {
            if self.fail {
                return Err(CertpostError::Transport("relay refused".into()));
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    fn header_row() -> Vec<Value> {
        vec![
            json!("Name"),
            json!("Course"),
            json!("Month"),
            json!("Date of Completion"),
            json!("Scheduled Time"),
            json!("Email"),
            json!("Certificate Sent"),
        ]
    }

    fn asha_row(sent: &str) -> Vec<Value> {
        vec![
            json!("Asha"),
            json!("Phonics L1"),
            json!("June"),
            json!("06/10/2024"),
            json!(0.625),
            json!("a@x.com"),
            json!(sent),
        ]
    }

    fn ctx(time: &str) -> SweepContext {
        SweepContext {
            current_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            current_time: time.to_string(),
        }
    }

    fn engine(
        grid: Vec<Vec<Value>>,
        render_fail: bool,
        mail_fail: bool,
    ) -> (SweepEngine, Arc<MemorySheetStore>, Arc<MockRenderer>, Arc<MockMailer>) {
        let store = Arc::new(MemorySheetStore::new(grid));
        let renderer = Arc::new(MockRenderer {
            fail: render_fail,
            renders: Mutex::new(0),
        });
        let mailer = Arc::new(MockMailer {
            fail: mail_fail,
            sent: Mutex::new(Vec::new()),
        });
        let engine = SweepEngine {
            store: store.clone(),
            pipeline: CertificatePipeline::new(
                renderer.clone(),
                mailer.clone(),
                &std::env::temp_dir().join("certpost-test-sweep"),
            ),
            timezone: chrono_tz::Asia::Kolkata,
        };
        (engine, store, renderer, mailer)
    }

    #[tokio::test]
    async fn test_due_row_sent_and_marked_yes() {
        let (engine, store, _, mailer) =
            engine(vec![header_row(), asha_row("No")], false, false);
        let stats = engine.run_sweep_at(ctx("15:00")).await.unwrap();
        assert_eq!(stats.sent, 1);
        assert_eq!(store.cell(2, 7), json!("Yes"));

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@x.com");
        assert!(sent[0].attachment_path.ends_with("Asha_Phonics L1_June.pdf"));
    }

    #[tokio::test]
    async fn test_mail_failure_marks_no_and_row_stays_eligible() {
        let (engine, store, _, _) = engine(vec![header_row(), asha_row("No")], false, true);
        let stats = engine.run_sweep_at(ctx("15:00")).await.unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.sent, 0);
        assert_eq!(store.cell(2, 7), json!("No"));

        // Under past-due semantics the next sweep retries the row.
        let (engine2, store2, _, mailer2) =
            engine_from_store(store, false, false);
        let stats = engine2.run_sweep_at(ctx("15:01")).await.unwrap();
        assert_eq!(stats.sent, 1);
        assert_eq!(store2.cell(2, 7), json!("Yes"));
        assert_eq!(mailer2.sent.lock().unwrap().len(), 1);
    }

    fn engine_from_store(
        store: Arc<MemorySheetStore>,
        render_fail: bool,
        mail_fail: bool,
    ) -> (SweepEngine, Arc<MemorySheetStore>, Arc<MockRenderer>, Arc<MockMailer>) {
        let renderer = Arc::new(MockRenderer {
            fail: render_fail,
            renders: Mutex::new(0),
        });
        let mailer = Arc::new(MockMailer {
            fail: mail_fail,
            sent: Mutex::new(Vec::new()),
        });
        let engine = SweepEngine {
            store: store.clone(),
            pipeline: CertificatePipeline::new(
                renderer.clone(),
                mailer.clone(),
                &std::env::temp_dir().join("certpost-test-sweep"),
            ),
            timezone: chrono_tz::Asia::Kolkata,
        };
        (engine, store, renderer, mailer)
    }

    #[tokio::test]
    async fn test_render_failure_leaves_row_untouched() {
        let (engine, store, _, mailer) =
            engine(vec![header_row(), asha_row("No")], true, false);
        let stats = engine.run_sweep_at(ctx("15:00")).await.unwrap();
        assert_eq!(stats.failed, 1);
        // No write-back, no mail.
        assert_eq!(store.cell(2, 7), json!("No"));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_already_sent_is_a_pure_noop() {
        let (engine, store, renderer, mailer) =
            engine(vec![header_row(), asha_row("Yes")], false, false);
        let stats = engine.run_sweep_at(ctx("15:00")).await.unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(*renderer.renders.lock().unwrap(), 0);
        assert!(mailer.sent.lock().unwrap().is_empty());
        assert_eq!(store.cell(2, 7), json!("Yes"));
    }

    #[tokio::test]
    async fn test_incomplete_row_gets_defensive_no() {
        let mut row = asha_row("");
        row[5] = json!(""); // empty email
        let (engine, store, _, mailer) = engine(vec![header_row(), row], false, false);
        let stats = engine.run_sweep_at(ctx("15:00")).await.unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(store.cell(2, 7), json!("No"));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_date_produces_no_writeback() {
        let mut row = asha_row("No");
        row[3] = json!("13/40/2024");
        let (engine, store, _, _) = engine(vec![header_row(), row], false, false);
        let stats = engine.run_sweep_at(ctx("15:00")).await.unwrap();
        assert_eq!(stats.invalid, 1);
        assert_eq!(store.cell(2, 7), json!("No"));
    }

    #[tokio::test]
    async fn test_garbage_time_row_is_skipped_even_past_date() {
        let mut row = asha_row("No");
        row[3] = json!("06/01/2024"); // past completion date
        row[4] = json!("noonish");
        let (engine, store, renderer, mailer) = engine(vec![header_row(), row], false, false);
        let stats = engine.run_sweep_at(ctx("15:00")).await.unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.sent, 0);
        assert_eq!(*renderer.renders.lock().unwrap(), 0);
        assert!(mailer.sent.lock().unwrap().is_empty());
        assert_eq!(store.cell(2, 7), json!("No"));
    }

    #[tokio::test]
    async fn test_not_yet_due_rows_wait() {
        let (engine, _, renderer, _) =
            engine(vec![header_row(), asha_row("No")], false, false);
        let stats = engine.run_sweep_at(ctx("14:59")).await.unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(*renderer.renders.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_status_column_outcome_not_persisted() {
        let header: Vec<Value> = vec![
            json!("Name"),
            json!("Course"),
            json!("Month"),
            json!("Date of Completion"),
            json!("Scheduled Time"),
            json!("Email"),
        ];
        let row: Vec<Value> = asha_row("No").into_iter().take(6).collect();
        let (engine, store, _, mailer) = engine(vec![header, row], false, false);
        let stats = engine.run_sweep_at(ctx("15:00")).await.unwrap();
        // Mail still goes out, but nothing is written back.
        assert_eq!(stats.sent, 1);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
        assert_eq!(store.cell(2, 7), Value::Null);
    }

    #[tokio::test]
    async fn test_empty_sheet_is_a_noop() {
        let (engine, _, _, _) = engine(vec![header_row()], false, false);
        let stats = engine.run_sweep_at(ctx("15:00")).await.unwrap();
        assert_eq!(stats, SweepStats::default());
    }
}
