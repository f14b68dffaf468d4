use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_with::formats::PreferMany;
use serde_with::{serde_as, OneOrMany};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

/// Claims included in our backend-issued access tokens.
#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub email: String,
    /// User id
    #[serde(rename = "nameid")]
    pub user_id: String,
    /// A single role is accepted as a bare string when decoding
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    #[serde(default)]
    pub role: Vec<String>,
    #[serde(rename = "NameEn")]
    pub name_en: String,
    #[serde(rename = "NameAr")]
    pub name_ar: String,
    pub iss: String,
    pub aud: String,
    /// Not-before (seconds since epoch)
    pub nbf: i64,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.iter().any(|r| r == role)
    }
}

/// Who the token is minted for.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub user_name: &'a str,
    pub roles: &'a [String],
}

/// Mint a HS256 JWT access token valid for the configured number of hours.
pub fn mint_access_token(
    subject: TokenSubject<'_>,
    now: OffsetDateTime,
    security: &SecurityConfig,
) -> Result<(String, Claims), AppError> {
    let iat = now.unix_timestamp();
    let exp = (now + Duration::hours(security.token_duration_hours)).unix_timestamp();

    let claims = Claims {
        email: subject.email.to_string(),
        user_id: subject.user_id.to_string(),
        role: subject.roles.to_vec(),
        name_en: subject.user_name.to_string(),
        name_ar: subject.user_name.to_string(),
        iss: security.issuer.clone(),
        aud: security.audience.clone(),
        nbf: iat,
        iat,
        exp,
    };

    let token = encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))?;

    Ok((token, claims))
}

/// Verify signature, issuer, audience, `nbf` and `exp` with no leeway.
pub fn verify_access_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(security.algorithm);
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.set_issuer(&[security.issuer.as_str()]);
    validation.set_audience(&[security.audience.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        let reason = match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => "token_expired",
            jsonwebtoken::errors::ErrorKind::ImmatureSignature => "token_not_yet_valid",
            jsonwebtoken::errors::ErrorKind::InvalidSignature => "invalid_signature",
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => "invalid_issuer",
            jsonwebtoken::errors::ErrorKind::InvalidAudience => "invalid_audience",
            _ => "invalid_token",
        };
        debug!(reason, "access token rejected");
        AppError::unauthenticated()
    })
}
