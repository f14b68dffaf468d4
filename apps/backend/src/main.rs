use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use db_infra::config::db::DbProfile;
use product_backend::auth::google::{DisabledGoogleVerifier, GoogleTokenVerifier, JwksGoogleVerifier};
use product_backend::config::{AppConfig, RuntimeEnv};
use product_backend::infra::state::build_state;
use product_backend::middleware::rate_limit::auth_rate_limit_backend;
use product_backend::middleware::{
    cors_middleware, ClientIpCapture, JwtExtract, RequestTrace, SecurityHeaders,
    StructuredLogger, TraceSpan,
};
use product_backend::routes;
use product_backend::services::email::mailer_from_settings;
use product_backend::telemetry;
use tracing::{error, info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let env = RuntimeEnv::from_env().install();
    telemetry::init_tracing(env);

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let config = match AppConfig::from_env(env) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let mailer = match mailer_from_settings(&config.mail) {
        Ok(mailer) => mailer,
        Err(e) => {
            error!(error = %e, "mail transport could not be created");
            std::process::exit(1);
        }
    };

    let google: Arc<dyn GoogleTokenVerifier> = match &config.google_client_id {
        Some(client_id) => Arc::new(JwksGoogleVerifier::new(client_id.clone())),
        None => {
            warn!("GOOGLE_CLIENT_ID not set, Google sign-in disabled");
            Arc::new(DisabledGoogleVerifier)
        }
    };

    let app_state = match build_state()
        .with_env(env)
        .with_db(DbProfile::Prod)
        .with_security(config.security.clone())
        .with_mailer(mailer)
        .with_google(google)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    info!("database connected");

    let data = web::Data::new(app_state);
    // One backend so every worker shares the same counters.
    let limiter = auth_rate_limit_backend();
    let host = config.server.host.clone();
    let port = config.server.port;

    info!(%host, port, env = ?env, "starting product backend");

    HttpServer::new(move || {
        let limiter = limiter.clone();
        App::new()
            .wrap(JwtExtract)
            .wrap(TraceSpan)
            .wrap(ClientIpCapture)
            .wrap(StructuredLogger)
            .wrap(SecurityHeaders)
            .wrap(RequestTrace)
            .wrap(cors_middleware())
            .app_data(data.clone())
            .configure(move |cfg| routes::configure_with_limiter(cfg, Some(limiter)))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
