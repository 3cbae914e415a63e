// HTTP routes
pub mod health;
pub mod jwks;
pub mod play;

pub use health::*;
pub use jwks::*;
pub use play::*;
