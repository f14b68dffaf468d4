pub mod google;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod roles;
pub mod totp;
