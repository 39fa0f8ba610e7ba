use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};
use std::sync::Mutex;
use std::time::Duration;

use crate::config::SmtpConfig;

/// Out-of-band delivery of a verification code. Fire-and-forget from the
/// orchestrator's point of view: a failed send never invalidates the
/// already persisted code.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_verification_code(&self, to_email: &str, code: &str)
        -> Result<(), anyhow::Error>;
}

#[derive(Clone)]
pub struct EmailService {
    mailer: SmtpTransport,
    from_email: String,
}

impl EmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self, anyhow::Error> {
        let creds = Credentials::new(config.user.clone(), config.app_password.clone());

        let mailer = SmtpTransport::relay(&config.host)
            .map_err(|e| anyhow::anyhow!("SMTP relay setup failed: {}", e))?
            .credentials(creds)
            .port(587)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(host = %config.host, "Email service initialized");

        Ok(Self {
            mailer,
            from_email: config.user.clone(),
        })
    }
}

#[async_trait]
impl EmailProvider for EmailService {
    async fn send_verification_code(
        &self,
        to_email: &str,
        code: &str,
    ) -> Result<(), anyhow::Error> {
        let html_body = format!(
            r#"<html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>Your verification code</h2>
                    <p>Use this code to finish signing in:</p>
                    <p style="font-size: 28px; letter-spacing: 4px; font-weight: bold;">{}</p>
                    <p style="color: #666; font-size: 12px;">
                        The code expires shortly and can be used once. If you didn't try to sign in, please ignore this email.
                    </p>
                </body>
            </html>"#,
            code
        );

        let plain_body = format!(
            "Your verification code\n\nUse this code to finish signing in: {}\n\nThe code expires shortly and can be used once. If you didn't try to sign in, please ignore this email.",
            code
        );

        let email = Message::builder()
            .from(self.from_email.parse()?)
            .to(to_email.parse()?)
            .subject("Your verification code")
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )?;

        // Send on the blocking pool; the SMTP transport is synchronous.
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email)).await?;

        match result {
            Ok(_) => {
                tracing::info!(to = %to_email, "Verification code email sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, to = %to_email, "Failed to send verification code email");
                Err(anyhow::anyhow!("SMTP send failed: {}", e))
            }
        }
    }
}

/// Recording stand-in used by tests and local wiring.
#[derive(Default)]
pub struct MockEmailService {
    sent: Mutex<Vec<(String, String)>>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(to_email, code)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("mock email lock poisoned").clone()
    }
}

#[async_trait]
impl EmailProvider for MockEmailService {
    async fn send_verification_code(
        &self,
        to_email: &str,
        code: &str,
    ) -> Result<(), anyhow::Error> {
        self.sent
            .lock()
            .expect("mock email lock poisoned")
            .push((to_email.to_string(), code.to_string()));
        Ok(())
    }
}
