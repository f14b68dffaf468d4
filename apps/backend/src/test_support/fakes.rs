//! In-memory stand-ins for external services.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::auth::google::{GoogleTokenVerifier, GoogleUser};
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::services::email::{EmailSender, OutgoingEmail};

/// Records every email instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose sends always fail.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        if self.fail {
            return Err(MessageKey::FailedToSendEmail.into());
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        Ok(())
    }

    fn contact_inbox(&self) -> Option<&str> {
        Some("inbox@example.com")
    }
}

/// Accepts exactly one token and answers with a fixed Google identity.
#[derive(Debug, Clone)]
pub struct StaticGoogleVerifier {
    pub accepted_token: String,
    pub user: GoogleUser,
}

impl StaticGoogleVerifier {
    pub fn new(accepted_token: &str, email: &str, subject: &str) -> Self {
        Self {
            accepted_token: accepted_token.to_string(),
            user: GoogleUser {
                email: email.to_string(),
                name: "Google User".to_string(),
                subject: subject.to_string(),
            },
        }
    }
}

#[async_trait]
impl GoogleTokenVerifier for StaticGoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleUser, AppError> {
        if id_token == self.accepted_token {
            Ok(self.user.clone())
        } else {
            Err(MessageKey::InvalidGoogleToken.into())
        }
    }
}
