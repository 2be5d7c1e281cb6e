pub mod auth;

pub use auth::{JwtAuthMiddleware, RequesterId};
