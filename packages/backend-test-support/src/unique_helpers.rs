//! Unique values for test data that must not collide between runs.

use uuid::Uuid;

/// `{prefix}-{uuid}`.
pub fn unique_str(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// `{prefix}-{uuid}@example.test`.
pub fn unique_email(prefix: &str) -> String {
    format!("{}@example.test", unique_str(prefix))
}
