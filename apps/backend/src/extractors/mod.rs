pub mod client_ip;
pub mod current_user;
pub mod validated_json;

pub use client_ip::ClientIp;
pub use current_user::{AdminUser, CurrentUser, StaffUser};
pub use validated_json::{Validate, ValidatedJson};
