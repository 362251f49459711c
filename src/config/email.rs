use std::env;

pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

#[derive(Clone)]
pub struct SmtpConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
}

#[derive(Clone)]
pub struct EmailConfig {
    /// `None` when SMTP is not configured; mail is then skipped.
    pub smtp: Option<SmtpConfig>,
    pub from_address: String,
    /// Base URL used to build links in outgoing mail.
    pub app_url: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        let smtp = smtp_from_env();
        let from_address = env::var("SMTP_FROM").unwrap_or_else(|_| match &smtp {
            Some(cfg) => format!("Notebook <{}>", cfg.smtp_username),
            None => "Notebook <noreply@localhost>".to_string(),
        });
        let app_url = env::var("APP_URL")
            .unwrap_or_else(|_| DEFAULT_APP_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            smtp,
            from_address,
            app_url,
        }
    }
}

fn smtp_from_env() -> Option<SmtpConfig> {
    let smtp_host = env::var("SMTP_HOST").ok()?;
    let smtp_port = env::var("SMTP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(587);
    let smtp_username = env::var("SMTP_USERNAME").ok()?;
    let smtp_password = env::var("SMTP_PASSWORD").ok()?;

    Some(SmtpConfig {
        smtp_host,
        smtp_port,
        smtp_username,
        smtp_password,
    })
}
