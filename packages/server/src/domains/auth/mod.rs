//! Auth domain - bearer check for the front door and the access token
//! handed to matched players
//!
//! The signing context is built once at startup and shared through the
//! HTTP state; nothing here is global.

pub mod bearer;
pub mod jwt;

pub use bearer::check_bearer;
pub use jwt::{AccessClaims, TokenSigner};
