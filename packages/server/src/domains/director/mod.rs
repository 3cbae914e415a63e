//! Director domain - turns match proposals into game server assignments
//!
//! Once per tick:
//!   build profile → FetchMatches → for each match: allocate → AssignTickets
//!
//! Matches are processed one after another. A failure only ever abandons the
//! match it happened in; the tickets resurface on a later fetch.

pub mod assign;
pub mod cycle;
pub mod fetch;
pub mod profile;
pub mod scheduler;

pub use assign::{assign_tickets, assignment_group};
pub use cycle::{CycleReport, Director, DirectorSettings, MatchOutcome};
pub use fetch::fetch_matches;
pub use profile::{build_profile, function_config};
pub use scheduler::run_scheduler;
