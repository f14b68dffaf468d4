//! Error handling for the product management backend.

pub mod domain;
pub mod messages;

pub use domain::DomainError;
pub use messages::MessageKey;
