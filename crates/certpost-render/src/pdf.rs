//! PDF conversion via wkhtmltopdf.
//!
//! Markup is piped to the binary on stdin; page geometry matches the
//! certificate artwork (215mm × 158mm landscape card, no margins, 300 dpi).

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use certpost_core::error::{CertpostError, Result};

/// wkhtmltopdf driver.
pub struct PdfConverter {
    binary: PathBuf,
}

impl PdfConverter {
    pub fn new(binary: &Path) -> Self {
        Self {
            binary: binary.to_path_buf(),
        }
    }

    /// Convert `markup` into a PDF at `output`.
    pub async fn convert(&self, markup: &str, output: &Path) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .args(Self::page_args())
            .arg("-")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CertpostError::Render(format!(
                    "Cannot launch {}: {e}",
                    self.binary.display()
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(markup.as_bytes())
                .await
                .map_err(|e| CertpostError::Render(format!("Piping markup failed: {e}")))?;
            // Close stdin so the converter sees EOF.
            drop(stdin);
        }

        let result = child
            .wait_with_output()
            .await
            .map_err(|e| CertpostError::Render(format!("wkhtmltopdf wait failed: {e}")))?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(CertpostError::Render(format!(
                "wkhtmltopdf exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        tracing::debug!("📄 PDF written: {}", output.display());
        Ok(())
    }

    fn page_args() -> [&'static str; 17] {
        [
            "--enable-local-file-access",
            "--no-stop-slow-scripts",
            "--quiet",
            "--margin-top",
            "0mm",
            "--margin-bottom",
            "0mm",
            "--margin-left",
            "0mm",
            "--margin-right",
            "0mm",
            "--page-width",
            "215mm",
            "--page-height",
            "158mm",
            "--dpi",
            "300",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_args_geometry() {
        let args = PdfConverter::page_args();
        assert!(args.contains(&"--page-width"));
        assert!(args.contains(&"215mm"));
        assert!(args.contains(&"158mm"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_render_error() {
        let converter = PdfConverter::new(Path::new("/nonexistent/wkhtmltopdf"));
        let err = converter
            .convert("<html></html>", Path::new("/tmp/out.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, CertpostError::Render(_)));
    }
}
