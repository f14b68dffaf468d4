//! Helpers shared by the backend's unit and integration tests: one-time
//! logging setup, `ApiResponse` body assertions and unique test data.

pub mod api_response;
pub mod logging;
pub mod unique_helpers;
