//! Tickets domain - player tickets and waiting for their assignment
//!
//! Shared by the game front door and the smoke-test client.

pub mod assignment;
pub mod client;
pub mod player;

pub use assignment::{wait_for_assignment, ServerInfo};
pub use client::{create_ticket, MatchResult, TicketClient, TICKET_TIMEOUT};
pub use player::{PlayerAttributes, SESSION_TAG};
