//! Match function domain - the reference pairing function served over gRPC
//!
//! For each profile: query every pool's tickets, drop duplicates, pair them
//! up in arrival order and stream one proposal per pair.

pub mod pairing;
pub mod service;

pub use pairing::{dedupe_tickets, make_matches, MATCH_FUNCTION_NAME, TICKETS_PER_MATCH};
pub use service::{serve, MatchFunctionService};
