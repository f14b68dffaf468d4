use super::{must_var, opt_var, parse_var, var_or};
use crate::error::AppError;

/// Outbound mail transport, chosen by `MAIL_EMAIL_FOR` (1 SendGrid, 2 SMTP).
#[derive(Clone, PartialEq, Eq)]
pub enum MailProvider {
    SendGrid {
        api_key: String,
    },
    Smtp {
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
    },
}

impl std::fmt::Debug for MailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailProvider::SendGrid { .. } => f.write_str("SendGrid"),
            MailProvider::Smtp { host, port, .. } => write!(f, "Smtp({host}:{port})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub provider: MailProvider,
    pub from: String,
    pub display_name: String,
    /// Inbox receiving contact-form messages.
    pub to: String,
}

impl MailSettings {
    pub fn from_env() -> Result<Self, AppError> {
        let provider = match var_or("MAIL_EMAIL_FOR", "2").trim() {
            "1" => MailProvider::SendGrid {
                api_key: must_var("MAIL_API_KEY")?,
            },
            "2" => MailProvider::Smtp {
                host: must_var("MAIL_HOST")?,
                port: parse_var("MAIL_PORT", 587)?,
                username: opt_var("MAIL_USERNAME"),
                password: opt_var("MAIL_PASSWORD"),
            },
            other => {
                return Err(AppError::config(format!(
                    "MAIL_EMAIL_FOR must be 1 (SendGrid) or 2 (SMTP), got '{other}'"
                )))
            }
        };

        Ok(Self {
            provider,
            from: must_var("MAIL_FROM")?,
            display_name: var_or("MAIL_DISPLAY_NAME", "Product Management"),
            to: must_var("MAIL_TO")?,
        })
    }
}
