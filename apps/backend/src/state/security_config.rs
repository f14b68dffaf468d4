use jsonwebtoken::Algorithm;

/// JWT signing and validation settings.
#[derive(Clone)]
pub struct SecurityConfig {
    /// HMAC key for signing and verifying access tokens
    pub jwt_secret: Vec<u8>,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub audience: String,
    /// Access-token lifetime
    pub token_duration_hours: i64,
}

impl SecurityConfig {
    pub fn new(
        jwt_secret: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        token_duration_hours: i64,
    ) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
            audience: audience.into(),
            token_duration_hours,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_duration_hours", &self.token_duration_hours)
            .finish_non_exhaustive()
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(
            b"default_secret_for_tests_only_0123456789".to_vec(),
            "product-management-tests",
            "product-management-tests",
            1,
        )
    }
}
