// Open Match matchmaking services - core library
//
// Shared by the director (fetch → allocate → assign loop), the match function
// and evaluator gRPC services, and the player-facing game front door.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
