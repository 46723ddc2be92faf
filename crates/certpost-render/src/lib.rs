//! # Certpost Render
//!
//! Render gateway: certificate HTML templating with inlined branding assets,
//! and PDF conversion by driving wkhtmltopdf as a child process.

pub mod pdf;
pub mod template;

use std::path::Path;

use async_trait::async_trait;

use certpost_core::config::RenderConfig;
use certpost_core::error::Result;
use certpost_core::traits::RenderGateway;
use certpost_core::types::CertificateVars;

pub use pdf::PdfConverter;
pub use template::CertificateTemplate;

/// Production renderer: template substitution + wkhtmltopdf.
pub struct HtmlCertificateRenderer {
    template: CertificateTemplate,
    converter: PdfConverter,
}

impl HtmlCertificateRenderer {
    /// Load the template and branding assets; errors here are fatal at
    /// startup rather than mid-sweep.
    pub fn new(config: &RenderConfig) -> Result<Self> {
        Ok(Self {
            template: CertificateTemplate::load(&config.template_path, &config.assets_dir)?,
            converter: PdfConverter::new(&config.wkhtmltopdf_path),
        })
    }
}

#[async_trait]
impl RenderGateway for HtmlCertificateRenderer {
    async fn render(&self, vars: &CertificateVars) -> Result<String> {
        Ok(self.template.render(vars))
    }

    async fn to_pdf(&self, markup: &str, output: &Path) -> Result<()> {
        self.converter.convert(markup, output).await
    }
}
