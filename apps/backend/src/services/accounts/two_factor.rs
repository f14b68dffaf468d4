//! Authenticator-app (TOTP) enrolment.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::info;

use crate::auth::totp;
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::repos::users::{self, User, UserUpdate};

/// Enrolment result; both fields are `null` after disabling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorSetupDto {
    pub qr_code_image: Option<String>,
    pub secret_key: Option<String>,
}

async fn user_or_not_found<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<User, AppError> {
    users::find_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| MessageKey::UserNotFound.into())
}

pub async fn is_two_factor_enabled<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<bool, AppError> {
    Ok(user_or_not_found(conn, user_id).await?.two_factor_enabled)
}

/// Enabling stores a fresh secret every time, invalidating older enrolments.
pub async fn enable_two_factor<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    enable: bool,
) -> Result<TwoFactorSetupDto, AppError> {
    let user = user_or_not_found(conn, user_id).await?;

    if !enable {
        let update = UserUpdate {
            two_factor_enabled: Some(false),
            two_factor_secret: Some(None),
            ..Default::default()
        };
        users::update_user(conn, &user.id, update).await?;
        info!(user_id, "two-factor authentication disabled");
        return Ok(TwoFactorSetupDto {
            qr_code_image: None,
            secret_key: None,
        });
    }

    let setup = totp::new_setup(&user.email)?;
    let update = UserUpdate {
        two_factor_enabled: Some(true),
        two_factor_secret: Some(Some(setup.secret.clone())),
        ..Default::default()
    };
    users::update_user(conn, &user.id, update).await?;
    info!(user_id, "two-factor authentication enabled");

    Ok(TwoFactorSetupDto {
        qr_code_image: Some(setup.qr_code_png_base64),
        secret_key: Some(setup.secret),
    })
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::entities::users as user_entity;
    use crate::test_support::fixtures::user_model;

    #[tokio::test]
    async fn missing_user_is_reported() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .into_connection();
        let err = is_two_factor_enabled(&db, "nobody").await.unwrap_err();
        assert_eq!(err.to_string(), "Bad request: UserNotFound");
    }

    #[tokio::test]
    async fn enabling_returns_a_secret_and_qr_code() {
        let user = user_model("u1", "a@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![user]])
            .into_connection();
        let setup = enable_two_factor(&db, "u1", true).await.unwrap();
        let secret = setup.secret_key.unwrap();
        assert!(!setup.qr_code_image.unwrap().is_empty());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(&secret), "{log}");
    }

    #[tokio::test]
    async fn disabling_clears_everything() {
        let mut user = user_model("u1", "a@example.com");
        user.two_factor_enabled = true;
        user.two_factor_secret = Some("SECRET".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![user]])
            .into_connection();
        let setup = enable_two_factor(&db, "u1", false).await.unwrap();
        assert_eq!(
            serde_json::to_value(setup).unwrap(),
            serde_json::json!({"qrCodeImage": null, "secretKey": null})
        );
    }
}
