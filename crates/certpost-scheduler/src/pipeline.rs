//! Certificate pipeline — render, persist, send, for one due row.
//!
//! Each step reports a tagged outcome instead of propagating. A render
//! failure leaves the row unmarked (it retries next sweep); a send failure
//! marks it not-sent. Side effects are not atomic: the PDF may exist on
//! disk even when the send fails.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use certpost_core::record::Record;
use certpost_core::traits::{MailGateway, RenderGateway};
use certpost_core::types::{CertificateMail, CertificateVars};

/// Result of one row's attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Rendered, persisted, delivered.
    Sent,
    /// Rendered and persisted, but delivery failed.
    SendFailed,
    /// Rendering or PDF conversion failed; nothing delivered.
    RenderFailed,
}

/// Render → persist → send for due rows.
pub struct CertificatePipeline {
    renderer: Arc<dyn RenderGateway>,
    mailer: Arc<dyn MailGateway>,
    output_dir: PathBuf,
}

impl CertificatePipeline {
    pub fn new(
        renderer: Arc<dyn RenderGateway>,
        mailer: Arc<dyn MailGateway>,
        output_dir: &Path,
    ) -> Self {
        Self {
            renderer,
            mailer,
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Process one due row to completion. Never panics, never propagates:
    /// the caller decides what to write back from the outcome.
    pub async fn process(&self, record: &Record) -> RowOutcome {
        let vars = CertificateVars {
            name: record.name.clone(),
            course: record.course.clone(),
            month: record.month.clone(),
        };

        let markup = match self.renderer.render(&vars).await {
            Ok(markup) => markup,
            Err(e) => {
                tracing::error!("❌ Render failed for {}: {e}", record.name);
                return RowOutcome::RenderFailed;
            }
        };

        let output_path = self.output_path(record);
        if let Err(e) = self.renderer.to_pdf(&markup, &output_path).await {
            tracing::error!("❌ PDF conversion failed for {}: {e}", record.name);
            return RowOutcome::RenderFailed;
        }

        let mail = CertificateMail {
            to: record.email.clone(),
            name: record.name.clone(),
            course: record.course.clone(),
            month: record.month.clone(),
            attachment_path: output_path.clone(),
        };
        match self.mailer.send(&mail).await {
            Ok(()) => {
                tracing::info!(
                    "✅ Certificate saved and sent for {}: {}",
                    record.name,
                    output_path.display()
                );
                RowOutcome::Sent
            }
            Err(e) => {
                tracing::error!("❌ Failed to send email to {}: {e}", record.name);
                RowOutcome::SendFailed
            }
        }
    }

    /// `<output_dir>/<name>_<course>_<month>.pdf`, spaces in the name
    /// replaced. Rows sharing all three fields collide; not deduplicated.
    fn output_path(&self, record: &Record) -> PathBuf {
        let safe_name = record.name.replace(' ', "_");
        self.output_dir
            .join(format!("{safe_name}_{}_{}.pdf", record.course, record.month))
    }
}
