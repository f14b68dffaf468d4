//! Task-local trace context for web requests.
//!
//! `RequestTrace` opens the scope for each request; anything running inside the
//! handler future (services, repos, error rendering) can read the id without it
//! being threaded through every call.

use std::fmt;

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

/// Trace id stored in request extensions by `RequestTrace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trace id of the current task, or `"unknown"` outside a request.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Run `future` with `trace_id` as the task-local trace id.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn outside_scope_is_unknown() {
        assert_eq!(trace_id(), "unknown");
    }

    #[tokio::test]
    async fn scope_is_visible_and_restored() {
        let out = with_trace_id("outer".into(), async {
            assert_eq!(trace_id(), "outer");
            let inner = with_trace_id("inner".into(), async { trace_id() }).await;
            assert_eq!(trace_id(), "outer");
            inner
        })
        .await;

        assert_eq!(out, "inner");
        assert_eq!(trace_id(), "unknown");
    }

    #[test]
    fn trace_id_displays_raw_value() {
        assert_eq!(TraceId("abc".into()).to_string(), "abc");
    }
}
