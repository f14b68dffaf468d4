pub mod access_guards;
pub mod login;
pub mod refresh;
