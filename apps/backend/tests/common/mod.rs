#![allow(dead_code)]

// tests/common/mod.rs
use product_backend::auth::jwt::{mint_access_token, TokenSubject};
use product_backend::infra::state::build_state;
use product_backend::state::app_state::AppState;
use product_backend::test_support::fixtures::{test_security, FIXED_NOW};
use sea_orm::DatabaseConnection;
use time::OffsetDateTime;

// Logging is auto-installed for every test binary that mounts `common`
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// State without a database; handlers that need one answer 503.
pub async fn state_without_db() -> AppState {
    build_state()
        .with_security(test_security())
        .build()
        .await
        .expect("build state without db")
}

/// State over a prepared `MockDatabase` connection.
pub async fn state_with(conn: DatabaseConnection) -> AppState {
    build_state()
        .with_security(test_security())
        .with_connection(conn)
        .build()
        .await
        .expect("build state with mock db")
}

/// `Authorization` header value for a fresh token carrying `roles`.
pub fn bearer(user_id: &str, roles: &[&str]) -> String {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    let email = format!("{user_id}@example.com");
    let (token, _) = mint_access_token(
        TokenSubject {
            user_id,
            email: &email,
            user_name: &email,
            roles: &roles,
        },
        OffsetDateTime::now_utc(),
        &test_security(),
    )
    .expect("mint test token");
    format!("Bearer {token}")
}

/// Same as [`bearer`] but already expired.
pub fn expired_bearer(user_id: &str) -> String {
    let email = format!("{user_id}@example.com");
    let (token, _) = mint_access_token(
        TokenSubject {
            user_id,
            email: &email,
            user_name: &email,
            roles: &[],
        },
        FIXED_NOW,
        &test_security(),
    )
    .expect("mint expired token");
    format!("Bearer {token}")
}
