//! Data transfer objects

pub mod account;
pub mod admin;
pub mod auth;

pub use account::*;
pub use admin::*;
pub use auth::*;
