//! DTOs for users_sea adapter.

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub email: String,
    pub user_name: String,
    pub password_hash: Option<String>,
    pub phone_number: Option<String>,
    pub google_subject: Option<String>,
    pub email_confirmed: bool,
}

impl UserCreate {
    pub fn new(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            user_name: email.clone(),
            email,
            password_hash: None,
            phone_number: None,
            google_subject: None,
            email_confirmed: false,
        }
    }

    pub fn with_password_hash(mut self, password_hash: impl Into<String>) -> Self {
        self.password_hash = Some(password_hash.into());
        self
    }

    pub fn with_phone_number(mut self, phone_number: Option<String>) -> Self {
        self.phone_number = phone_number;
        self
    }

    pub fn with_google_subject(mut self, subject: impl Into<String>) -> Self {
        self.google_subject = Some(subject.into());
        self
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }

    /// Google accounts arrive with a verified address.
    pub fn email_confirmed(mut self) -> Self {
        self.email_confirmed = true;
        self
    }
}

/// Column-level changes to an existing user. `None` leaves the column alone.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub user_name: Option<String>,
    pub password_hash: Option<String>,
    pub email_confirmed: Option<bool>,
    pub phone_number_confirmed: Option<bool>,
    pub two_factor_enabled: Option<bool>,
    pub two_factor_secret: Option<Option<String>>,
    pub lockout_end: Option<Option<time::OffsetDateTime>>,
    pub access_failed_count: Option<i32>,
    pub blocked_from_cash: Option<bool>,
    pub google_subject: Option<Option<String>>,
}
