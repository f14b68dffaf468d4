//! Repository functions for the domain layer. Generic over `ConnectionTrait`
//! so the same calls run on a pool or inside a transaction.

pub mod activity;
pub mod crud;
pub mod lookups;
pub mod otps;
pub mod products;
pub mod tokens;
pub mod users;
