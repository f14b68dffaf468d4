use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::debug;

use crate::auth::jwt::Claims;
use crate::auth::roles::Role;
use crate::error::AppError;

/// The caller behind a verified bearer token.
///
/// Reads the `Claims` the `JwtExtract` middleware left in the request
/// extensions; a request without them is answered with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl CurrentUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles
            .iter()
            .any(|r| r.parse::<Role>() == Ok(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    fn require_any(self, allowed: &[Role]) -> Result<Self, AppError> {
        if allowed.iter().any(|role| self.has_role(*role)) {
            Ok(self)
        } else {
            debug!(user_id = %self.user_id, ?allowed, "role check failed");
            Err(AppError::forbidden())
        }
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            roles: claims.role,
        }
    }
}

fn current_user(req: &HttpRequest) -> Result<CurrentUser, AppError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .map(CurrentUser::from)
        .ok_or_else(AppError::unauthenticated)
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(current_user(req))
    }
}

/// Caller holding the `Admin` role (403 otherwise).
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(current_user(req).and_then(|u| u.require_any(&[Role::Admin])).map(AdminUser))
    }
}

/// Caller holding `Admin` or `CustomerExperience`.
#[derive(Debug, Clone)]
pub struct StaffUser(pub CurrentUser);

impl FromRequest for StaffUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            current_user(req)
                .and_then(|u| u.require_any(&[Role::Admin, Role::CustomerExperience]))
                .map(StaffUser),
        )
    }
}
