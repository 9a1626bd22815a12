//! Database repositories

pub mod audit;
pub mod refresh_token;
pub mod user;

pub use audit::AuditRepo;
pub use refresh_token::RefreshTokenRepo;
pub use user::UserRepo;
