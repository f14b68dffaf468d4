//! Registration, email confirmation and password changes.

use sea_orm::ConnectionTrait;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use super::{
    hash_mail_token, new_mail_token, ChangePasswordDto, ConfirmEmailDto, RegisterDto,
    ResetPasswordDto,
};
use crate::auth::password::{hash_password, meets_policy, verify_password};
use crate::auth::roles::Role;
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::logging::pii::Redacted;
use crate::repos::tokens::{self as token_repo, TokenPurpose};
use crate::repos::users::{self, User, UserCreate, UserUpdate};
use crate::services::email::{token_message_html, EmailSender, OutgoingEmail};

/// Lifetime of mailed confirmation and reset tokens.
pub const MAIL_TOKEN_LIFETIME: Duration = Duration::days(1);

async fn checked_password(password: &str) -> Result<String, AppError> {
    if !meets_policy(password) {
        return Err(MessageKey::WeakPassword.into());
    }
    hash_password(password).await
}

/// Store a fresh token for `purpose` and mail it to the user.
async fn mail_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    mailer: &dyn EmailSender,
    user: &User,
    purpose: TokenPurpose,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let token = new_mail_token();
    token_repo::store_user_token(
        conn,
        &user.id,
        purpose,
        &hash_mail_token(&token),
        now + MAIL_TOKEN_LIFETIME,
    )
    .await?;

    let (subject, intro) = match purpose {
        TokenPurpose::EmailConfirmation => (
            "Confirm your email",
            "Use this code to confirm your email address:",
        ),
        TokenPurpose::PasswordReset => (
            "Reset your password",
            "Use this code to reset your password:",
        ),
    };
    mailer
        .send_email(&OutgoingEmail::new(
            &user.email,
            subject,
            token_message_html(intro, &token),
        ))
        .await
}

/// Create an account and mail its confirmation token. Returns the new id.
pub async fn register<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    mailer: &dyn EmailSender,
    dto: &RegisterDto,
    now: OffsetDateTime,
) -> Result<String, AppError> {
    let role = match dto.role.as_deref().filter(|r| !r.trim().is_empty()) {
        None => None,
        Some(raw) => match raw.trim().parse::<Role>() {
            Ok(Role::Admin) => return Err(MessageKey::AdminRoleNotAllowed.into()),
            Ok(role) => Some(role),
            Err(()) => {
                warn!(role = raw, "ignoring unknown role at registration");
                None
            }
        },
    };

    if users::find_user_by_email(conn, &dto.email).await?.is_some() {
        return Err(MessageKey::EmailAlreadyInUse.into());
    }
    let password_hash = checked_password(&dto.password).await?;

    let create = UserCreate::new(dto.email.trim())
        .with_password_hash(password_hash)
        .with_phone_number(dto.phone_number.clone().filter(|p| !p.trim().is_empty()));
    let roles: Vec<&str> = role.iter().map(|r| r.as_str()).collect();
    let user = users::create_user(conn, create, &roles).await?;

    mail_token(conn, mailer, &user, TokenPurpose::EmailConfirmation, now).await?;
    info!(user_id = %user.id, "user registered");
    Ok(user.id)
}

pub async fn confirm_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: &ConfirmEmailDto,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let Some(user) = users::find_user_by_email(conn, &dto.email).await? else {
        return Err(MessageKey::EmailNotAssociated.into());
    };
    let consumed = token_repo::consume_user_token(
        conn,
        &user.id,
        TokenPurpose::EmailConfirmation,
        &hash_mail_token(&dto.token),
        now,
    )
    .await?;
    if !consumed {
        return Err(MessageKey::EmailConfirmationFailed.into());
    }
    let update = UserUpdate {
        email_confirmed: Some(true),
        ..Default::default()
    };
    users::update_user(conn, &user.id, update).await?;
    info!(user_id = %user.id, "email confirmed");
    Ok(())
}

pub async fn forgot_password<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    mailer: &dyn EmailSender,
    email: &str,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let Some(user) = users::find_user_by_email(conn, email).await? else {
        info!(email = %Redacted(email), "password reset for unknown email");
        return Err(MessageKey::EmailNotAssociated.into());
    };
    mail_token(conn, mailer, &user, TokenPurpose::PasswordReset, now).await?;
    info!(user_id = %user.id, "password reset token sent");
    Ok(())
}

pub async fn reset_password<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: &ResetPasswordDto,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let Some(user) = users::find_user_by_email(conn, &dto.email).await? else {
        return Err(MessageKey::UserWithEmailNotFound.into());
    };
    let password_hash = checked_password(&dto.new_password).await?;
    let consumed = token_repo::consume_user_token(
        conn,
        &user.id,
        TokenPurpose::PasswordReset,
        &hash_mail_token(&dto.token),
        now,
    )
    .await?;
    if !consumed {
        return Err(MessageKey::InvalidPasswordResetToken.into());
    }
    let update = UserUpdate {
        password_hash: Some(password_hash),
        access_failed_count: Some(0),
        lockout_end: Some(None),
        ..Default::default()
    };
    users::update_user(conn, &user.id, update).await?;
    info!(user_id = %user.id, "password reset");
    Ok(())
}

pub async fn change_password<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    dto: &ChangePasswordDto,
) -> Result<(), AppError> {
    let Some(user) = users::find_user_by_id(conn, user_id).await? else {
        return Err(MessageKey::UserWithIdNotFound.into());
    };
    let current_ok = match user.password_hash.as_deref() {
        Some(hash) => verify_password(&dto.current_password, hash).await,
        None => false,
    };
    if !current_ok {
        return Err(MessageKey::CurrentPasswordIncorrect.into());
    }
    let update = UserUpdate {
        password_hash: Some(checked_password(&dto.new_password).await?),
        ..Default::default()
    };
    users::update_user(conn, &user.id, update).await?;
    info!(user_id, "password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::entities::{user_roles, user_tokens, users as user_entity};
    use crate::test_support::fixtures::{user_model, user_with_password, FIXED_NOW};
    use crate::test_support::RecordingMailer;

    fn token_model(purpose: TokenPurpose) -> user_tokens::Model {
        user_tokens::Model {
            id: 1,
            user_id: "u1".into(),
            purpose: purpose.as_str().into(),
            token_hash: hash_mail_token("tok"),
            expires_at: FIXED_NOW + MAIL_TOKEN_LIFETIME,
            consumed_at: None,
        }
    }

    fn register_dto(role: Option<&str>) -> RegisterDto {
        RegisterDto {
            email: "new@example.com".into(),
            password: "Secret1!".into(),
            phone_number: Some("0790000000".into()),
            role: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn admin_role_is_refused_without_touching_storage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = register(&db, &RecordingMailer::new(), &register_dto(Some("admin")), FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: AdminRoleCannotBeAssignedAtRegistration");
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model("u1", "new@example.com")]])
            .into_connection();
        let err = register(&db, &RecordingMailer::new(), &register_dto(None), FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: ThisEmailAddressIsAlreadyInUse");
    }

    #[tokio::test]
    async fn weak_password_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .into_connection();
        let mut dto = register_dto(None);
        dto.password = "password".into();
        let err = register(&db, &RecordingMailer::new(), &dto, FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: PasswordDoesNotMeetComplexityRequirements"
        );
    }

    #[tokio::test]
    async fn registration_mails_a_confirmation_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .append_query_results([vec![user_model("u1", "new@example.com")]])
            .append_query_results([vec![user_roles::Model {
                user_id: "u1".into(),
                role: "CustomerExperience".into(),
            }]])
            .append_query_results([vec![token_model(TokenPurpose::EmailConfirmation)]])
            .into_connection();
        let mailer = RecordingMailer::new();

        let id = register(&db, &mailer, &register_dto(Some("CustomerExperience")), FIXED_NOW)
            .await
            .unwrap();
        assert_eq!(id, "u1");

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "new@example.com");
        assert_eq!(sent[0].subject, "Confirm your email");

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("email_confirmation"), "{log}");
        assert!(log.contains("CustomerExperience"), "{log}");
    }

    #[tokio::test]
    async fn failed_mail_fails_registration() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .append_query_results([vec![user_model("u1", "new@example.com")]])
            .append_query_results([vec![token_model(TokenPurpose::EmailConfirmation)]])
            .into_connection();
        let err = register(&db, &RecordingMailer::failing(), &register_dto(None), FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: FailedToSendEmail");
    }

    #[tokio::test]
    async fn confirm_with_unknown_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .into_connection();
        let dto = ConfirmEmailDto {
            email: "x@example.com".into(),
            token: "tok".into(),
        };
        let err = confirm_email(&db, &dto, FIXED_NOW).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: TheProvidedEmailAddressIsNotAssociatedWithAnyAccount"
        );
    }

    #[tokio::test]
    async fn confirm_with_used_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model("u1", "a@example.com")]])
            .append_query_results([Vec::<user_tokens::Model>::new()])
            .into_connection();
        let dto = ConfirmEmailDto {
            email: "a@example.com".into(),
            token: "tok".into(),
        };
        let err = confirm_email(&db, &dto, FIXED_NOW).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: EmailConfirmationFailedTheProvidedTokenIsEitherInvalidOrHasAlreadyBeenUsed"
        );
    }

    #[tokio::test]
    async fn confirm_marks_the_address() {
        let user = user_model("u1", "a@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![token_model(TokenPurpose::EmailConfirmation)]])
            .append_query_results([vec![token_model(TokenPurpose::EmailConfirmation)]])
            .append_query_results([vec![user]])
            .into_connection();
        let dto = ConfirmEmailDto {
            email: "a@example.com".into(),
            token: "tok".into(),
        };
        confirm_email(&db, &dto, FIXED_NOW).await.unwrap();

        let log = db.into_transaction_log();
        let last = format!("{:?}", log.last().unwrap());
        assert!(last.contains("email_confirmed"), "{last}");
    }

    #[tokio::test]
    async fn reset_requires_a_matching_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model("u1", "a@example.com")]])
            .append_query_results([Vec::<user_tokens::Model>::new()])
            .into_connection();
        let dto = ResetPasswordDto {
            email: "a@example.com".into(),
            token: "wrong".into(),
            new_password: "Newpass1!".into(),
        };
        let err = reset_password(&db, &dto, FIXED_NOW).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: InvalidOrExpiredPasswordResetTokenForThisEmail"
        );
    }

    #[tokio::test]
    async fn forgot_password_mails_a_reset_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model("u1", "a@example.com")]])
            .append_query_results([vec![token_model(TokenPurpose::PasswordReset)]])
            .into_connection();
        let mailer = RecordingMailer::new();
        forgot_password(&db, &mailer, "a@example.com", FIXED_NOW)
            .await
            .unwrap();
        assert_eq!(mailer.sent()[0].subject, "Reset your password");
    }

    #[tokio::test]
    async fn change_password_checks_the_current_one() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_with_password("u1", "a@example.com", "Secret1!")]])
            .into_connection();
        let dto = ChangePasswordDto {
            current_password: "Wrong1!x".into(),
            new_password: "Newpass1!".into(),
        };
        let err = change_password(&db, "u1", &dto).await.unwrap_err();
        assert_eq!(err.to_string(), "Bad request: CurrentPasswordIsIncorrect");
    }

    #[tokio::test]
    async fn change_password_for_missing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .into_connection();
        let dto = ChangePasswordDto {
            current_password: "Secret1!".into(),
            new_password: "Newpass1!".into(),
        };
        let err = change_password(&db, "u9", &dto).await.unwrap_err();
        assert_eq!(err.to_string(), "Bad request: UserWithThisIdNotFound");
    }
}
