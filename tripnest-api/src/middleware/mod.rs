pub mod auth;

pub use auth::{SessionClaims, SessionUser, SESSION_COOKIE};
