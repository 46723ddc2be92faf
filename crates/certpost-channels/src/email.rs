//! Email channel — async SMTP sending via lettre.
//!
//! Builds a multipart message (HTML congratulations body with an unsubscribe
//! footer + the certificate PDF attachment) and delivers it over a STARTTLS
//! relay. Every failure maps to `Transport` so the caller can recover
//! per row instead of aborting the sweep.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use certpost_core::config::SmtpConfig;
use certpost_core::error::{CertpostError, Result};
use certpost_core::traits::MailGateway;
use certpost_core::types::CertificateMail;

/// SMTP implementation of the mail gateway.
pub struct SmtpMailer {
    config: SmtpConfig,
    unsubscribe_link: String,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig, unsubscribe_link: String) -> Self {
        Self {
            config,
            unsubscribe_link,
        }
    }

    /// HTML body of the congratulations email.
    fn compose_body(&self, mail: &CertificateMail) -> String {
        format!(
            r#"<html>
<body>
    <p>Dear {name},</p>
    <p>Congratulations! You have successfully completed the {course} course on {month}.</p>
    <p>Please find your certificate attached.</p>
    <br><br>
    <p style="font-size:12px;color:gray;">
        If you no longer wish to receive emails, you can <a href="{link}">unsubscribe here</a>.
    </p>
</body>
</html>"#,
            name = mail.name,
            course = mail.course,
            month = mail.month,
            link = self.unsubscribe_link,
        )
    }

    /// Assemble the full multipart message.
    fn build_message(&self, mail: &CertificateMail, pdf: Vec<u8>) -> Result<Message> {
        let from: Mailbox = self
            .config
            .sender
            .parse()
            .map_err(|e| CertpostError::Transport(format!("Invalid sender address: {e}")))?;
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| CertpostError::Transport(format!("Invalid recipient {}: {e}", mail.to)))?;

        let filename = mail
            .attachment_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "certificate.pdf".to_string());
        let content_type = ContentType::parse("application/pdf")
            .map_err(|e| CertpostError::Transport(format!("Attachment content type: {e}")))?;
        let attachment = Attachment::new(filename).body(Body::new(pdf), content_type);

        let body = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(self.compose_body(mail));

        Message::builder()
            .from(from)
            .to(to)
            .subject(format!("Certificate of Achievement: {}", mail.course))
            .multipart(MultiPart::mixed().singlepart(body).singlepart(attachment))
            .map_err(|e| CertpostError::Transport(format!("Building email: {e}")))
    }
}

#[async_trait]
impl MailGateway for SmtpMailer {
    async fn send(&self, mail: &CertificateMail) -> Result<()> {
        let pdf = tokio::fs::read(&mail.attachment_path).await.map_err(|e| {
            CertpostError::Transport(format!(
                "Cannot read attachment {}: {e}",
                mail.attachment_path.display()
            ))
        })?;
        let message = self.build_message(mail, pdf)?;

        let creds = Credentials::new(self.config.user.clone(), self.config.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)
            .map_err(|e| CertpostError::Transport(format!("SMTP relay: {e}")))?
            .port(self.config.port)
            .credentials(creds)
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| CertpostError::Transport(format!("SMTP send: {e}")))?;

        tracing::info!("📤 Certificate sent to {} at {}", mail.name, mail.to);
        Ok(())
    }
}
