use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::RuntimeEnv;

const DEFAULT_FILTER: &str = "info,actix_web=info,sqlx=warn,sea_orm=warn";

/// Install the global subscriber. JSON lines in production, compact text in
/// development.
pub fn init_tracing(env: RuntimeEnv) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);

    match env {
        RuntimeEnv::Prod => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_ansi(false)
                    .json(),
            )
            .init(),
        RuntimeEnv::Dev => registry
            .with(fmt::layer().with_target(true).compact())
            .init(),
    }
}
