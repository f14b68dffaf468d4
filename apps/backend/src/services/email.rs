//! Outbound mail.
//!
//! `EmailSender` is the seam handlers use; `mailer_from_settings` picks the
//! transport configured by `MAIL_EMAIL_FOR`.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::config::{MailProvider, MailSettings};
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::logging::pii::Redacted;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub reply_to: Option<String>,
}

impl OutgoingEmail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html_body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html_body: html_body.into(),
            reply_to: None,
        }
    }

    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `email`. Transport failures surface as `FailedToSendEmail`.
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), AppError>;

    /// Inbox receiving contact-form messages, when one is configured.
    fn contact_inbox(&self) -> Option<&str> {
        None
    }
}

fn send_failed() -> AppError {
    AppError::from(MessageKey::FailedToSendEmail)
}

/// Used when no mail settings are available. Every send fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMailer;

#[async_trait]
impl EmailSender for DisabledMailer {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        error!(to = %Redacted(&email.to), "mail transport is not configured");
        Err(send_failed())
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    contact_inbox: String,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings) -> Result<Self, AppError> {
        let MailProvider::Smtp {
            host,
            port,
            username,
            password,
        } = &settings.provider
        else {
            return Err(AppError::config("SMTP mailer requires SMTP settings"));
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::config(format!("invalid SMTP relay '{host}': {e}")))?
            .port(*port);
        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: sender_mailbox(settings)?,
            contact_inbox: settings.to.clone(),
        })
    }
}

fn sender_mailbox(settings: &MailSettings) -> Result<Mailbox, AppError> {
    let address = settings
        .from
        .parse()
        .map_err(|e| AppError::config(format!("MAIL_FROM is not an address: {e}")))?;
    Ok(Mailbox::new(Some(settings.display_name.clone()), address))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, AppError> {
    address
        .parse()
        .map_err(|_| AppError::bad_request(format!("'{address}' is not a valid email address")))
}

/// MIME message for `email` sent from `from`.
pub fn build_message(from: &Mailbox, email: &OutgoingEmail) -> Result<Message, AppError> {
    let mut builder = Message::builder()
        .from(from.clone())
        .to(parse_mailbox(&email.to)?)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_HTML);
    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }
    builder
        .body(email.html_body.clone())
        .map_err(|e| AppError::internal(format!("mail build failed: {e}")))
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let message = build_message(&self.from, email)?;
        match self.transport.send(message).await {
            Ok(_) => {
                info!(to = %Redacted(&email.to), subject = %email.subject, "email sent via SMTP");
                Ok(())
            }
            Err(e) => {
                error!(to = %Redacted(&email.to), error = %e, "SMTP delivery failed");
                Err(send_failed())
            }
        }
    }

    fn contact_inbox(&self) -> Option<&str> {
        Some(&self.contact_inbox)
    }
}

pub struct SendGridMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
    display_name: String,
    contact_inbox: String,
}

impl SendGridMailer {
    pub fn new(settings: &MailSettings) -> Result<Self, AppError> {
        let MailProvider::SendGrid { api_key } = &settings.provider else {
            return Err(AppError::config("SendGrid mailer requires an API key"));
        };
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: api_key.clone(),
            from: settings.from.clone(),
            display_name: settings.display_name.clone(),
            contact_inbox: settings.to.clone(),
        })
    }

    fn payload(&self, email: &OutgoingEmail) -> Value {
        sendgrid_payload(&self.from, &self.display_name, email)
    }
}

/// Request body for SendGrid's v3 `mail/send`.
pub fn sendgrid_payload(from: &str, display_name: &str, email: &OutgoingEmail) -> Value {
    let mut body = json!({
        "personalizations": [{ "to": [{ "email": email.to }] }],
        "from": { "email": from, "name": display_name },
        "subject": email.subject,
        "content": [{ "type": "text/html", "value": email.html_body }],
    });
    if let Some(reply_to) = &email.reply_to {
        body["reply_to"] = json!({ "email": reply_to });
    }
    body
}

#[async_trait]
impl EmailSender for SendGridMailer {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(&self.api_key)
            .json(&self.payload(email))
            .send()
            .await
            .map_err(|e| {
                error!(to = %Redacted(&email.to), error = %e, "SendGrid request failed");
                send_failed()
            })?;

        let status = response.status();
        if status.is_success() {
            info!(to = %Redacted(&email.to), subject = %email.subject, "email sent via SendGrid");
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            error!(to = %Redacted(&email.to), status = status.as_u16(), detail, "SendGrid rejected email");
            Err(send_failed())
        }
    }

    fn contact_inbox(&self) -> Option<&str> {
        Some(&self.contact_inbox)
    }
}

pub fn mailer_from_settings(settings: &MailSettings) -> Result<Arc<dyn EmailSender>, AppError> {
    Ok(match settings.provider {
        MailProvider::SendGrid { .. } => Arc::new(SendGridMailer::new(settings)?),
        MailProvider::Smtp { .. } => Arc::new(SmtpMailer::new(settings)?),
    })
}

/// HTML body of a contact-form message.
pub fn contact_message_html(first_name: &str, body: &str) -> String {
    format!(
        "<p><strong>From:</strong> {}</p><p>{}</p>",
        escape_html(first_name),
        escape_html(body).replace('\n', "<br/>")
    )
}

/// HTML body carrying a single-use token the user pastes back into the app.
pub fn token_message_html(intro: &str, token: &str) -> String {
    format!(
        "<p>{}</p><p><code>{}</code></p>",
        escape_html(intro),
        escape_html(token)
    )
}

/// Forward a contact-form message to the configured inbox, replying to the
/// visitor.
pub async fn send_contact_message(
    mailer: &dyn EmailSender,
    first_name: &str,
    body: &str,
    reply_to: &str,
) -> Result<(), AppError> {
    let Some(inbox) = mailer.contact_inbox() else {
        error!("no contact inbox configured");
        return Err(send_failed());
    };
    let email = OutgoingEmail::new(
        inbox,
        format!("Contact form: {first_name}"),
        contact_message_html(first_name, body),
    )
    .reply_to(reply_to.trim());
    mailer.send_email(&email).await?;
    info!(reply_to = %Redacted(reply_to), "contact message forwarded");
    Ok(())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
