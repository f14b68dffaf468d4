//! Test service builder.
//! Given an AppState, build an initialized Actix **test service** with the
//! same middleware stack `main` installs, minus CORS and rate limiting.

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::Error as ActixError;
use actix_web::{
    web::{self, ServiceConfig},
    App,
};

use crate::middleware::{
    ClientIpCapture, JwtExtract, RequestTrace, SecurityHeaders, StructuredLogger, TraceSpan,
};
use crate::state::app_state::AppState;

type RoutesFn = Box<dyn FnOnce(&mut ServiceConfig) + Send>;

pub fn create_test_app_builder(state: AppState) -> TestAppBuilder {
    TestAppBuilder {
        state,
        routes: None,
    }
}

/// Production routes over `state`.
pub async fn create_test_app(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = ActixError> {
    create_test_app_builder(state).build().await
}

pub struct TestAppBuilder {
    state: AppState,
    routes: Option<RoutesFn>,
}

impl TestAppBuilder {
    /// Mount `f` instead of the production routes.
    pub fn with_routes<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceConfig) + Send + 'static,
    {
        self.routes = Some(Box::new(f));
        self
    }

    pub async fn build(
        self,
    ) -> impl Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = ActixError>
    {
        let app = App::new()
            .wrap(JwtExtract)
            .wrap(TraceSpan)
            .wrap(ClientIpCapture)
            .wrap(StructuredLogger)
            .wrap(SecurityHeaders)
            .wrap(RequestTrace)
            .app_data(web::Data::new(self.state));

        let app = match self.routes {
            Some(f) => app.configure(f),
            None => app.configure(crate::routes::configure),
        };

        actix_web::test::init_service(app).await
    }
}
