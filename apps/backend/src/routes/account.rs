//! `/Account` endpoints: sessions, credentials, two-factor, Google sign-in,
//! OTP and administrative account changes.
//!
//! Login and the OTP endpoints record failures that must survive the error
//! response, so they run on the pooled connection rather than in a
//! transaction. The same goes for `DeleteUser`, which locks the account when
//! the delete is refused.

use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::RateLimiter;
use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse, Route};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::db::require_db;
use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::extractors::{AdminUser, ClientIp, CurrentUser, ValidatedJson};
use crate::http::ApiResponse;
use crate::middleware::rate_limit::auth_rate_limit_config;
use crate::services::accounts::{
    self, AdminChangePasswordDto, BlockFromCashDto, ChangeEmailDto, ChangePasswordDto,
    ConfirmEmailDto, ContactEmailDto, ForgotPasswordDto, GoogleSignIn, LockAccountDto, LoginDto,
    RegisterDto, ResetPasswordDto, TwoFactorLoginDto,
};
use crate::services::email::send_contact_message;
use crate::services::otp::{self, OtpType, VerifyOtpDto};
use crate::services::tokens::{self, SessionUser};
use crate::state::AppState;

pub const REFRESH_COOKIE: &str = "RefreshToken";
pub const DASHBOARD_REFRESH_COOKIE: &str = "DashboardRefreshToken";

/// HttpOnly cookie carrying the session's refresh token until it expires.
fn refresh_cookie(name: &'static str, session: &SessionUser) -> Cookie<'static> {
    Cookie::build(name, session.refresh_token.clone())
        .path("/")
        .http_only(true)
        .expires(session.refresh_token_expiration)
        .finish()
}

fn session_response(cookie_name: &'static str, session: &SessionUser) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(refresh_cookie(cookie_name, session))
        .json(session)
}

fn message(key: MessageKey) -> HttpResponse {
    ApiResponse::with_message(200, key).into_http()
}

/// Users act on their own account; admins may act on anyone's.
fn ensure_self_or_admin(user: &CurrentUser, target_id: &str) -> Result<(), AppError> {
    if user.user_id == target_id || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    #[serde(rename = "userId", alias = "UserId", alias = "id")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(alias = "Id")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct EnableTwoFactorQuery {
    #[serde(rename = "userId", alias = "UserId")]
    pub user_id: String,
    pub enable: bool,
}

#[derive(Debug, Deserialize)]
pub struct GoogleTokenQuery {
    #[serde(rename = "accessToken", alias = "AccessToken")]
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SendOtpQuery {
    pub phone: String,
    #[serde(default, rename = "type")]
    pub otp_type: OtpType,
}

#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevokeTokenBody {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TwoFactorStatus {
    is_two_factor_enabled: bool,
}

// ---- sessions ---------------------------------------------------------------

async fn login(
    app_state: web::Data<AppState>,
    ip: ClientIp,
    body: ValidatedJson<LoginDto>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let now = OffsetDateTime::now_utc();
    let session = accounts::login(db, &body, &app_state.security, ip.as_str(), now).await?;
    Ok(session_response(DASHBOARD_REFRESH_COOKIE, &session))
}

async fn two_factor_login(
    app_state: web::Data<AppState>,
    ip: ClientIp,
    body: ValidatedJson<TwoFactorLoginDto>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let now = OffsetDateTime::now_utc();
    let session =
        accounts::two_factor_login(db, &body, &app_state.security, ip.as_str(), now).await?;
    let cookie = if body.is_portal {
        DASHBOARD_REFRESH_COOKIE
    } else {
        REFRESH_COOKIE
    };
    Ok(session_response(cookie, &session))
}

async fn rotate(
    req: &HttpRequest,
    app_state: &AppState,
    cookie_name: &'static str,
) -> Result<HttpResponse, AppError> {
    let Some(presented) = req.cookie(cookie_name).map(|c| c.value().to_string()) else {
        return Err(AppError::unauthorized(MessageKey::InvalidToken));
    };
    let security = app_state.security.clone();
    let now = OffsetDateTime::now_utc();
    let session = with_txn(app_state, move |txn| {
        Box::pin(async move { tokens::rotate_refresh_token(txn, &presented, &security, now).await })
    })
    .await?;
    Ok(session_response(cookie_name, &session))
}

async fn refresh_token(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    rotate(&req, &app_state, REFRESH_COOKIE).await
}

async fn dashboard_refresh_token(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    rotate(&req, &app_state, DASHBOARD_REFRESH_COOKIE).await
}

async fn revoke(
    req: &HttpRequest,
    app_state: &AppState,
    cookie_name: &str,
    body: Option<web::Json<RevokeTokenBody>>,
) -> Result<HttpResponse, AppError> {
    let presented = req
        .cookie(cookie_name)
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|b| b.into_inner().token));
    let db = require_db(app_state)?;
    tokens::revoke_refresh_token(db, presented.as_deref(), OffsetDateTime::now_utc()).await?;
    Ok(message(MessageKey::TokenRevoked))
}

async fn revoke_token(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: Option<web::Json<RevokeTokenBody>>,
) -> Result<HttpResponse, AppError> {
    revoke(&req, &app_state, REFRESH_COOKIE, body).await
}

async fn revoke_dashboard_token(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: Option<web::Json<RevokeTokenBody>>,
) -> Result<HttpResponse, AppError> {
    revoke(&req, &app_state, DASHBOARD_REFRESH_COOKIE, body).await
}

// ---- two-factor ---------------------------------------------------------------

async fn is_two_factor_enabled(
    user: CurrentUser,
    app_state: web::Data<AppState>,
    query: web::Query<UserIdQuery>,
) -> Result<HttpResponse, AppError> {
    let target = query.into_inner().user_id.unwrap_or_else(|| user.user_id.clone());
    ensure_self_or_admin(&user, &target)?;
    let db = require_db(&app_state)?;
    let enabled = accounts::is_two_factor_enabled(db, &target).await?;
    Ok(HttpResponse::Ok().json(TwoFactorStatus {
        is_two_factor_enabled: enabled,
    }))
}

async fn enable_two_factor(
    user: CurrentUser,
    app_state: web::Data<AppState>,
    query: web::Query<EnableTwoFactorQuery>,
) -> Result<HttpResponse, AppError> {
    let EnableTwoFactorQuery { user_id, enable } = query.into_inner();
    ensure_self_or_admin(&user, &user_id)?;
    let db = require_db(&app_state)?;
    let setup = accounts::enable_two_factor(db, &user_id, enable).await?;
    Ok(HttpResponse::Ok().json(setup))
}

// ---- registration and credentials ---------------------------------------------

async fn register(
    app_state: web::Data<AppState>,
    body: ValidatedJson<RegisterDto>,
) -> Result<HttpResponse, AppError> {
    let mailer = app_state.mailer.clone();
    let dto = body.into_inner();
    let now = OffsetDateTime::now_utc();
    with_txn(&app_state, move |txn| {
        Box::pin(async move { accounts::register(txn, mailer.as_ref(), &dto, now).await })
    })
    .await?;
    Ok(message(MessageKey::UserRegistered))
}

async fn confirm_email(
    app_state: web::Data<AppState>,
    body: ValidatedJson<ConfirmEmailDto>,
) -> Result<HttpResponse, AppError> {
    let dto = body.into_inner();
    let now = OffsetDateTime::now_utc();
    with_txn(&app_state, move |txn| {
        Box::pin(async move { accounts::confirm_email(txn, &dto, now).await })
    })
    .await?;
    Ok(message(MessageKey::EmailConfirmed))
}

async fn forgot_password(
    app_state: web::Data<AppState>,
    body: ValidatedJson<ForgotPasswordDto>,
) -> Result<HttpResponse, AppError> {
    let mailer = app_state.mailer.clone();
    let email = body.into_inner().email;
    let now = OffsetDateTime::now_utc();
    with_txn(&app_state, move |txn| {
        Box::pin(async move { accounts::forgot_password(txn, mailer.as_ref(), &email, now).await })
    })
    .await?;
    Ok(message(MessageKey::PasswordResetEmailSent))
}

async fn reset_password(
    app_state: web::Data<AppState>,
    body: ValidatedJson<ResetPasswordDto>,
) -> Result<HttpResponse, AppError> {
    let dto = body.into_inner();
    let now = OffsetDateTime::now_utc();
    with_txn(&app_state, move |txn| {
        Box::pin(async move { accounts::reset_password(txn, &dto, now).await })
    })
    .await?;
    Ok(message(MessageKey::PasswordResetSuccessful))
}

async fn change_password(
    user: CurrentUser,
    app_state: web::Data<AppState>,
    query: web::Query<IdQuery>,
    body: ValidatedJson<ChangePasswordDto>,
) -> Result<HttpResponse, AppError> {
    let target = query.into_inner().id;
    ensure_self_or_admin(&user, &target)?;
    let db = require_db(&app_state)?;
    accounts::change_password(db, &target, &body).await?;
    Ok(message(MessageKey::PasswordChanged))
}

async fn delete_user(
    AdminUser(admin): AdminUser,
    app_state: web::Data<AppState>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    accounts::delete_user(db, &admin.user_id, &query.id).await?;
    Ok(message(MessageKey::UserDeleted))
}

// ---- administration -------------------------------------------------------------

async fn change_email(
    AdminUser(admin): AdminUser,
    app_state: web::Data<AppState>,
    body: ValidatedJson<ChangeEmailDto>,
) -> Result<HttpResponse, AppError> {
    let dto = body.into_inner();
    with_txn(&app_state, move |txn| {
        Box::pin(async move { accounts::change_email(txn, &admin.user_id, &dto).await })
    })
    .await?;
    Ok(message(MessageKey::EmailChanged))
}

async fn admin_change_password(
    AdminUser(admin): AdminUser,
    app_state: web::Data<AppState>,
    body: ValidatedJson<AdminChangePasswordDto>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    accounts::change_password_for(db, &admin.user_id, &body).await?;
    Ok(message(MessageKey::PasswordResetSuccessful))
}

async fn lock_or_unlock(
    AdminUser(admin): AdminUser,
    app_state: web::Data<AppState>,
    body: ValidatedJson<LockAccountDto>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let outcome = accounts::lock_or_unlock(db, &admin.user_id, &body).await?;
    Ok(message(outcome))
}

async fn block_from_cash(
    AdminUser(admin): AdminUser,
    app_state: web::Data<AppState>,
    body: ValidatedJson<BlockFromCashDto>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    accounts::block_from_cash(db, &admin.user_id, &body).await?;
    Ok(message(MessageKey::CashStatusUpdated))
}

async fn blocked_from_cash(
    user: CurrentUser,
    app_state: web::Data<AppState>,
    query: web::Query<UserIdQuery>,
) -> Result<HttpResponse, AppError> {
    let target = query.into_inner().user_id.unwrap_or_else(|| user.user_id.clone());
    let db = require_db(&app_state)?;
    let blocked = accounts::blocked_from_cash(db, &target).await?;
    Ok(HttpResponse::Ok().json(json!({ "blockedFromCash": blocked })))
}

// ---- Google ---------------------------------------------------------------------

async fn register_and_login_with_google(
    app_state: web::Data<AppState>,
    ip: ClientIp,
    query: web::Query<GoogleTokenQuery>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let outcome = accounts::register_and_login_with_google(
        db,
        app_state.google.as_ref(),
        &query.access_token,
        &app_state.security,
        ip.as_str(),
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(match &outcome {
        GoogleSignIn::SignedIn(session) => session_response(REFRESH_COOKIE, session),
        GoogleSignIn::NeedsRegistration(_) => HttpResponse::Ok().json(&outcome),
    })
}

async fn link_account_with_google(
    user: CurrentUser,
    app_state: web::Data<AppState>,
    query: web::Query<GoogleTokenQuery>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let outcome = accounts::link_account_with_google(
        db,
        app_state.google.as_ref(),
        &user.user_id,
        &query.access_token,
    )
    .await?;
    Ok(message(outcome))
}

async fn login_with_google_portal(
    app_state: web::Data<AppState>,
    ip: ClientIp,
    query: web::Query<GoogleTokenQuery>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let session = accounts::login_with_google_portal(
        db,
        app_state.google.as_ref(),
        &query.access_token,
        &app_state.security,
        ip.as_str(),
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(session_response(REFRESH_COOKIE, &session))
}

// ---- OTP and contact --------------------------------------------------------------

async fn send_otp(
    app_state: web::Data<AppState>,
    ip: ClientIp,
    query: web::Query<SendOtpQuery>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let SendOtpQuery { phone, otp_type } = query.into_inner();
    otp::send_otp(db, &phone, otp_type, ip.as_str(), OffsetDateTime::now_utc()).await?;
    Ok(message(MessageKey::OtpSent))
}

async fn verify_otp(
    app_state: web::Data<AppState>,
    ip: ClientIp,
    body: ValidatedJson<VerifyOtpDto>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let session = otp::verify_otp(
        db,
        &body.phone,
        &body.otp,
        &app_state.security,
        ip.as_str(),
        OffsetDateTime::now_utc(),
    )
    .await?;
    Ok(session_response(REFRESH_COOKIE, &session))
}

async fn otp_sent_count(
    app_state: web::Data<AppState>,
    query: web::Query<PhoneQuery>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let expiry = otp::latest_otp_expiry(db, &query.phone).await?;
    let date = expiry.and_then(|at| at.format(&time::format_description::well_known::Rfc3339).ok());
    Ok(HttpResponse::Ok().json(json!({ "date": date })))
}

async fn is_phone_number_confirmed(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let confirmed = otp::is_phone_number_confirmed(db, &user.user_id).await?;
    let answer = if confirmed { "True" } else { "False" };
    Ok(ApiResponse::with_message(200, answer).into_http())
}

async fn send_email(
    app_state: web::Data<AppState>,
    body: ValidatedJson<ContactEmailDto>,
) -> Result<HttpResponse, AppError> {
    send_contact_message(
        app_state.mailer.as_ref(),
        &body.first_name,
        &body.body,
        &body.reply_to,
    )
    .await?;
    Ok(message(MessageKey::EmailSent))
}

/// Credential endpoints that share the per-IP limit.
fn credential_routes() -> Vec<(&'static str, Route)> {
    vec![
        ("/Account/Login", web::post().to(login)),
        ("/Account/TwoFactorLogin", web::post().to(two_factor_login)),
        ("/Account/SendOTP", web::post().to(send_otp)),
        ("/Account/VerifyOTP", web::post().to(verify_otp)),
    ]
}

/// Mount the account routes. With a backend, the credential endpoints are
/// rate limited per client IP; without one (tests) they are mounted bare.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Option<InMemoryBackend>) {
    for (path, route) in credential_routes() {
        match &limiter {
            Some(backend) => {
                let limit = RateLimiter::builder(backend.clone(), auth_rate_limit_config().build())
                    .add_headers()
                    .build();
                cfg.service(web::resource(path).wrap(limit).route(route));
            }
            None => {
                cfg.service(web::resource(path).route(route));
            }
        }
    }

    cfg.route("/Account/refreshToken", web::get().to(refresh_token))
        .route("/Account/DashboardRefreshToken", web::get().to(dashboard_refresh_token))
        .route("/Account/RevokeToken", web::post().to(revoke_token))
        .route("/Account/revokeTokenForDashboard", web::post().to(revoke_dashboard_token))
        .route("/Account/IsTwoFactorEnabled", web::get().to(is_two_factor_enabled))
        .route(
            "/Account/EnableTwoFactorAuthenticationAsync",
            web::post().to(enable_two_factor),
        )
        .route("/Account/Register", web::post().to(register))
        .route("/Account/ConfirmEmail", web::post().to(confirm_email))
        .route("/Account/ForgotPassword", web::post().to(forgot_password))
        .route("/Account/ResetPassword", web::post().to(reset_password))
        .route("/Account/ChangePassword", web::post().to(change_password))
        .route("/Account/DeleteUser", web::delete().to(delete_user))
        .route("/Account/change-email", web::post().to(change_email))
        .route("/Account/change-password", web::post().to(admin_change_password))
        .route("/Account/lock-or-unlock-account", web::post().to(lock_or_unlock))
        .route("/Account/block-from-cash", web::post().to(block_from_cash))
        .route("/Account/BlockedFromCash", web::get().to(blocked_from_cash))
        .route(
            "/Account/RegisterAndLoginWithGoogle",
            web::post().to(register_and_login_with_google),
        )
        .route(
            "/Account/LinkAccountWithGoogle",
            web::post().to(link_account_with_google),
        )
        .route(
            "/Account/LoginWithGooglePortal",
            web::post().to(login_with_google_portal),
        )
        .route("/Account/GetOtpSentCountForUser", web::get().to(otp_sent_count))
        .route(
            "/Account/IsPhoneNumberConfirmed",
            web::get().to(is_phone_number_confirmed),
        )
        .route("/Account/SendEmail", web::post().to(send_email));
}
