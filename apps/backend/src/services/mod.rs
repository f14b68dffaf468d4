//! Business logic. Services are free functions over any `ConnectionTrait`,
//! so handlers can pass the pool or an open transaction.

pub mod accounts;
pub mod cache;
pub mod email;
pub mod lookups;
pub mod otp;
pub mod products;
pub mod tokens;
