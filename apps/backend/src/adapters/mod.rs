//! Storage adapters. Functions return `DbErr`; the repos layer maps them to
//! `DomainError`.

pub mod activity_sea;
pub mod lookups_sql;
pub mod otps_sea;
pub mod refresh_tokens_sea;
pub mod user_tokens_sea;
pub mod users_sea;
