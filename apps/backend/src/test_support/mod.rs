//! Helpers shared by unit and integration tests.

pub mod app_builder;
pub mod fakes;
pub mod fixtures;

pub use app_builder::create_test_app;
pub use fakes::{RecordingMailer, StaticGoogleVerifier};
