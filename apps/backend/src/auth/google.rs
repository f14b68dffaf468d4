//! Google ID-token verification.
//!
//! Tokens are RS256 JWTs signed by a key from Google's JWKS. Keys are cached
//! per JWKS URL for an hour and refetched early when a token names a `kid`
//! the cache does not hold, at most once per [`MIN_REFETCH_INTERVAL`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::errors::MessageKey;

pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);
/// Unknown `kid`s inside this window are rejected against the cached set.
pub const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

/// Identity asserted by a verified Google token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleUser {
    pub email: String,
    pub name: String,
    pub subject: String,
}

#[async_trait]
pub trait GoogleTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<GoogleUser, AppError>;
}

/// Used when `GOOGLE_CLIENT_ID` is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGoogleVerifier;

#[async_trait]
impl GoogleTokenVerifier for DisabledGoogleVerifier {
    async fn verify(&self, _id_token: &str) -> Result<GoogleUser, AppError> {
        Err(MessageKey::GoogleSignInDisabled.into())
    }
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

struct CachedJwks {
    jwks: JwkSet,
    fetched_at: Instant,
}

static JWKS_CACHE: Lazy<DashMap<String, CachedJwks>> = Lazy::new(DashMap::new);

pub struct JwksGoogleVerifier {
    client_id: String,
    jwks_url: String,
    http: reqwest::Client,
}

impl JwksGoogleVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_jwks_url(client_id, GOOGLE_JWKS_URL)
    }

    pub fn with_jwks_url(client_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            jwks_url: jwks_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Cached set and its age.
    fn cached(&self) -> Option<(JwkSet, Duration)> {
        JWKS_CACHE
            .get(&self.jwks_url)
            .map(|entry| (entry.jwks.clone(), entry.fetched_at.elapsed()))
    }

    async fn fetch(&self) -> Result<JwkSet, AppError> {
        info!(jwks_url = %self.jwks_url, "Fetching Google JWKS");
        let jwks: JwkSet = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AppError::internal(format!("JWKS fetch failed: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::internal(format!("JWKS parse failed: {e}")))?;

        JWKS_CACHE.insert(
            self.jwks_url.clone(),
            CachedJwks {
                jwks: jwks.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(jwks)
    }

    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AppError> {
        let jwks = match self.cached() {
            Some((jwks, age)) if !should_refetch(age, jwks.find(kid).is_some()) => jwks,
            _ => self.fetch().await?,
        };
        let jwk = jwks.find(kid).ok_or_else(|| {
            warn!(kid, "Google token signed with unknown key");
            AppError::from(MessageKey::InvalidGoogleToken)
        })?;
        DecodingKey::from_jwk(jwk).map_err(|e| AppError::internal(format!("unusable JWK: {e}")))
    }
}

/// Whether a set fetched `age` ago must be fetched again. An expired set
/// always is; a fresh one only when it lacks the `kid` and the last fetch is
/// older than [`MIN_REFETCH_INTERVAL`].
fn should_refetch(age: Duration, has_kid: bool) -> bool {
    if age >= JWKS_CACHE_TTL {
        return true;
    }
    !has_kid && age >= MIN_REFETCH_INTERVAL
}

/// Issuer, audience and expiry checks for a Google token.
pub fn google_validation(client_id: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[client_id]);
    validation.set_issuer(&GOOGLE_ISSUERS);
    validation
}

#[async_trait]
impl GoogleTokenVerifier for JwksGoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<GoogleUser, AppError> {
        let invalid = || AppError::from(MessageKey::InvalidGoogleToken);

        let header = decode_header(id_token).map_err(|_| invalid())?;
        let kid = header.kid.ok_or_else(invalid)?;
        let key = self.key_for(&kid).await?;

        let claims = decode::<GoogleClaims>(id_token, &key, &google_validation(&self.client_id))
            .map_err(|e| {
                debug!(error = %e, "Google token rejected");
                invalid()
            })?
            .claims;

        let email = claims.email.ok_or_else(invalid)?;
        Ok(GoogleUser {
            name: claims.name.unwrap_or_else(|| email.clone()),
            email,
            subject: claims.sub,
        })
    }
}
