pub mod core;

pub use core::{connect, orchestrate_migration, sanitize_db_url};
