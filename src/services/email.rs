use crate::config::email::{EmailConfig, DEFAULT_APP_URL};
use anyhow::Result;
use chrono::Duration;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::{Arc, Mutex};

/// A message accepted by the in-memory transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// Keeps messages in process; used by tests and local development.
    Memory(Arc<Mutex<Vec<SentEmail>>>),
    /// SMTP is not configured; sends are logged and skipped.
    Disabled,
}

#[derive(Clone)]
pub struct EmailService {
    transport: MailTransport,
    from_address: String,
    app_url: String,
}

impl EmailService {
    /// Build from environment variables. If SMTP is not configured, email
    /// sending is skipped.
    pub fn from_env() -> Self {
        Self::from_config(EmailConfig::from_env())
    }

    pub fn from_config(cfg: EmailConfig) -> Self {
        let transport = match &cfg.smtp {
            Some(smtp) => {
                let creds =
                    Credentials::new(smtp.smtp_username.clone(), smtp.smtp_password.clone());
                match AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.smtp_host) {
                    Ok(builder) => {
                        MailTransport::Smtp(builder.port(smtp.smtp_port).credentials(creds).build())
                    }
                    Err(e) => {
                        tracing::warn!("Failed to build SMTP transport: {e}");
                        MailTransport::Disabled
                    }
                }
            }
            None => MailTransport::Disabled,
        };

        Self {
            transport,
            from_address: cfg.from_address,
            app_url: cfg.app_url,
        }
    }

    /// Service that records every message instead of delivering it.
    pub fn in_memory() -> Self {
        Self {
            transport: MailTransport::Memory(Arc::new(Mutex::new(Vec::new()))),
            from_address: "Notebook <noreply@localhost>".to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }

    /// Returns true if SMTP is configured and available.
    pub fn is_configured(&self) -> bool {
        matches!(self.transport, MailTransport::Smtp(_))
    }

    /// Messages captured by the in-memory transport, oldest first.
    pub fn sent(&self) -> Vec<SentEmail> {
        match &self.transport {
            MailTransport::Memory(outbox) => outbox
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
            _ => Vec::new(),
        }
    }

    pub async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        valid_for: Option<Duration>,
    ) -> Result<()> {
        let expiry_line = match valid_for {
            Some(ttl) => format!("This code expires in {} minutes.", ttl.num_minutes().max(1)),
            None => "This code does not expire.".to_string(),
        };
        let body = format!(
            "Welcome! Your verification code is: {code}\n\nEnter it on the verification page to activate your account. {expiry_line}"
        );

        self.send_email(to, "Your verification code", &body).await
    }

    pub async fn send_password_reset(
        &self,
        to: &str,
        token: &str,
        valid_for: Duration,
    ) -> Result<()> {
        let link = format!("{}/reset-password/{}", self.app_url, token);
        let body = format!(
            "A password reset was requested for your account.\n\nOpen the link below to choose a new password:\n\n{}\n\nThis link expires in {} minutes. If you did not request this, you can safely ignore this email.",
            link,
            valid_for.num_minutes().max(1)
        );

        self.send_email(to, "Reset your password", &body).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let transport = match &self.transport {
            MailTransport::Smtp(t) => t,
            MailTransport::Memory(outbox) => {
                outbox
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(SentEmail {
                        to: to.to_string(),
                        subject: subject.to_string(),
                        body: body.to_string(),
                    });
                tracing::debug!("Captured email to {to}: {subject}");
                return Ok(());
            }
            MailTransport::Disabled => {
                tracing::debug!("SMTP not configured, skipping email to {to}");
                return Ok(());
            }
        };

        let from_mailbox: Mailbox =
            self.from_address
                .parse()
                .map_err(|e: lettre::address::AddressError| {
                    anyhow::anyhow!("Invalid from address '{}': {}", self.from_address, e)
                })?;
        let to_mailbox: Mailbox = to.parse().map_err(|e: lettre::address::AddressError| {
            anyhow::anyhow!("Invalid to address '{}': {}", to, e)
        })?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        transport.send(email).await?;
        tracing::info!("Email sent to {to}: {subject}");
        Ok(())
    }
}
