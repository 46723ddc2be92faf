//! Certificate HTML templating.
//!
//! The template file carries `{{name}}`-style placeholders. Branding images
//! (logo, certify seal, signature) are read once at load and inlined as
//! base64 data URLs so the markup is self-contained for the PDF converter.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use certpost_core::error::{CertpostError, Result};
use certpost_core::types::CertificateVars;

/// Loaded template plus pre-encoded branding assets.
#[derive(Debug)]
pub struct CertificateTemplate {
    html: String,
    logo_url: String,
    certify_url: String,
    signature_url: String,
}

impl CertificateTemplate {
    /// Read the template and encode the three branding images from
    /// `assets_dir` (logo.png, certify.png, sign.png).
    pub fn load(template_path: &Path, assets_dir: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(template_path).map_err(|e| {
            CertpostError::Render(format!(
                "Cannot read template {}: {e}",
                template_path.display()
            ))
        })?;
        Ok(Self {
            html,
            logo_url: data_url(&assets_dir.join("logo.png"))?,
            certify_url: data_url(&assets_dir.join("certify.png"))?,
            signature_url: data_url(&assets_dir.join("sign.png"))?,
        })
    }

    /// Substitute recipient variables and asset URLs into the markup.
    pub fn render(&self, vars: &CertificateVars) -> String {
        self.html
            .replace("{{name}}", &vars.name)
            .replace("{{course}}", &vars.course)
            .replace("{{month}}", &vars.month)
            .replace("{{logo_url}}", &self.logo_url)
            .replace("{{certify_url}}", &self.certify_url)
            .replace("{{signature_url}}", &self.signature_url)
    }
}

/// Encode an image file as a `data:image/png` URL.
fn data_url(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| {
        CertpostError::Render(format!("Cannot read asset {}: {e}", path.display()))
    })?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("certpost-test-template");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("template.html"),
            "<h1>{{name}}</h1><p>{{course}} — {{month}}</p><img src=\"{{logo_url}}\">",
        )
        .unwrap();
        for asset in ["logo.png", "certify.png", "sign.png"] {
            std::fs::write(dir.join(asset), b"pngbytes").unwrap();
        }
        dir
    }

    #[test]
    fn test_render_substitution() {
        let dir = write_fixture();
        let template = CertificateTemplate::load(&dir.join("template.html"), &dir).unwrap();
        let html = template.render(&CertificateVars {
            name: "Asha".into(),
            course: "Phonics L1".into(),
            month: "June".into(),
        });
        assert!(html.contains("<h1>Asha</h1>"));
        assert!(html.contains("Phonics L1"));
        assert!(html.contains("data:image/png;base64,"));
        assert!(!html.contains("{{"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_template_is_render_error() {
        let err = CertificateTemplate::load(
            Path::new("/nonexistent/template.html"),
            Path::new("/nonexistent"),
        )
        .unwrap_err();
        assert!(matches!(err, CertpostError::Render(_)));
    }
}
