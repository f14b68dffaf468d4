pub mod audits;
pub mod login_logs;
pub mod products;
pub mod refresh_tokens;
pub mod user_roles;
pub mod user_tokens;
pub mod users;
pub mod users_otp;

pub use audits::Entity as Audits;
pub use login_logs::Entity as LoginLogs;
pub use products::Entity as Products;
pub use products::Model as Product;
pub use refresh_tokens::Entity as RefreshTokens;
pub use user_roles::Entity as UserRoles;
pub use user_tokens::Entity as UserTokens;
pub use users::Entity as Users;
pub use users::Model as User;
pub use users_otp::Entity as UsersOtp;
