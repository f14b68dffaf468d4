//! Google sign-in and account linking.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::google::{GoogleTokenVerifier, GoogleUser};
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::repos::users::{self, UserUpdate};
use crate::services::tokens::{issue_session, SessionUser};
use crate::state::SecurityConfig;

/// A linked account signs straight in; otherwise the verified identity goes
/// back to the client so it can finish registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GoogleSignIn {
    SignedIn(SessionUser),
    NeedsRegistration(GoogleUser),
}

pub async fn register_and_login_with_google<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    verifier: &dyn GoogleTokenVerifier,
    id_token: &str,
    security: &SecurityConfig,
    ip: &str,
    now: OffsetDateTime,
) -> Result<GoogleSignIn, AppError> {
    let google = verifier.verify(id_token).await?;
    match users::find_user_by_google_subject(conn, &google.subject).await? {
        Some(user) => Ok(GoogleSignIn::SignedIn(
            issue_session(conn, &user, security, ip, now).await?,
        )),
        None => {
            info!("google identity without a linked account");
            Ok(GoogleSignIn::NeedsRegistration(google))
        }
    }
}

/// Attach the Google identity to the signed-in user. Returns the outcome
/// message for both the linked and already-linked cases.
pub async fn link_account_with_google<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    verifier: &dyn GoogleTokenVerifier,
    user_id: &str,
    id_token: &str,
) -> Result<MessageKey, AppError> {
    let google = verifier.verify(id_token).await?;
    let user = users::require_user(conn, user_id).await?;
    if user.google_subject.is_some() {
        return Ok(MessageKey::GoogleAlreadyLinked);
    }
    if users::find_user_by_google_subject(conn, &google.subject)
        .await?
        .is_some()
    {
        warn!(user_id, "google identity already linked to another account");
        return Err(MessageKey::GoogleLinkFailed.into());
    }

    let update = UserUpdate {
        google_subject: Some(Some(google.subject)),
        ..Default::default()
    };
    if let Err(e) = users::update_user(conn, &user.id, update).await {
        warn!(user_id, error = %e, "linking google account failed");
        return Err(MessageKey::GoogleLinkFailed.into());
    }
    info!(user_id, "google account linked");
    Ok(MessageKey::GoogleLinked)
}

pub async fn login_with_google_portal<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    verifier: &dyn GoogleTokenVerifier,
    id_token: &str,
    security: &SecurityConfig,
    ip: &str,
    now: OffsetDateTime,
) -> Result<SessionUser, AppError> {
    let google = verifier.verify(id_token).await?;
    let Some(user) = users::find_user_by_google_subject(conn, &google.subject).await? else {
        return Err(MessageKey::GoogleNotLinked.into());
    };
    issue_session(conn, &user, security, ip, now).await
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::entities::users as user_entity;
    use crate::test_support::fixtures::{test_security, user_model, FIXED_NOW};
    use crate::test_support::StaticGoogleVerifier;

    fn verifier() -> StaticGoogleVerifier {
        StaticGoogleVerifier::new("good-token", "g@example.com", "google-sub-1")
    }

    #[tokio::test]
    async fn unlinked_identity_is_returned_for_registration() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .into_connection();
        let outcome = register_and_login_with_google(
            &db,
            &verifier(),
            "good-token",
            &test_security(),
            "127.0.0.1",
            FIXED_NOW,
        )
        .await
        .unwrap();
        let body = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"email": "g@example.com", "name": "Google User", "subject": "google-sub-1"})
        );
    }

    #[tokio::test]
    async fn bad_token_is_rejected_before_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = login_with_google_portal(
            &db,
            &verifier(),
            "forged",
            &test_security(),
            "127.0.0.1",
            FIXED_NOW,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: InvalidGoogleToken");
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn portal_requires_a_linked_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .into_connection();
        let err = login_with_google_portal(
            &db,
            &verifier(),
            "good-token",
            &test_security(),
            "127.0.0.1",
            FIXED_NOW,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Your Account Is Not Linked With Google");
    }

    #[tokio::test]
    async fn already_linked_is_not_an_error() {
        let mut user = user_model("u1", "a@example.com");
        user.google_subject = Some("google-sub-1".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();
        let outcome = link_account_with_google(&db, &verifier(), "u1", "good-token")
            .await
            .unwrap();
        assert_eq!(outcome, MessageKey::GoogleAlreadyLinked);
    }

    #[tokio::test]
    async fn identity_owned_by_someone_else_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model("u1", "a@example.com")]])
            .append_query_results([vec![user_model("u2", "b@example.com")]])
            .into_connection();
        let err = link_account_with_google(&db, &verifier(), "u1", "good-token")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: FailedToLinkYourGoogleAccountWithYourExistingAccount"
        );
    }

    #[tokio::test]
    async fn linking_stores_the_subject() {
        let user = user_model("u1", "a@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_query_results([Vec::<user_entity::Model>::new()])
            .append_query_results([vec![user]])
            .into_connection();
        let outcome = link_account_with_google(&db, &verifier(), "u1", "good-token")
            .await
            .unwrap();
        assert_eq!(outcome, MessageKey::GoogleLinked);

        let log = db.into_transaction_log();
        let last = format!("{:?}", log.last().unwrap());
        assert!(last.contains("google-sub-1"), "{last}");
    }
}
