//! Security-relevant events, logged with a stable `event` field so they can be
//! filtered and alerted on.

use tracing::{info, warn};

use crate::logging::pii::Redacted;
use crate::trace_ctx;

pub fn login_failed(reason: &str, email: &str) {
    let trace_id = trace_ctx::trace_id();
    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        email = %Redacted(email),
        reason,
        "Authentication failure"
    );
}

pub fn account_locked(user_id: &str, until: time::OffsetDateTime) {
    let trace_id = trace_ctx::trace_id();
    warn!(
        event = "SECURITY_ACCOUNT_LOCKED",
        %trace_id,
        user_id,
        until = %until,
        "Account locked"
    );
}

pub fn refresh_token_rejected(reason: &str) {
    let trace_id = trace_ctx::trace_id();
    warn!(
        event = "SECURITY_REFRESH_REJECTED",
        %trace_id,
        reason,
        "Refresh token rejected"
    );
}

pub fn admin_action(action: &str, actor_id: &str, target_user_id: &str) {
    let trace_id = trace_ctx::trace_id();
    info!(
        event = "SECURITY_ADMIN_ACTION",
        %trace_id,
        action,
        actor_id,
        target_user_id,
        "Administrative account change"
    );
}

pub fn rate_limit_hit(endpoint: &str) {
    let trace_id = trace_ctx::trace_id();
    warn!(
        event = "SECURITY_RATE_LIMIT_HIT",
        %trace_id,
        endpoint,
        "Rate limit exceeded"
    );
}
