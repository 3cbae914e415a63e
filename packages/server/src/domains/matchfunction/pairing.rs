use std::collections::HashSet;

use open_match_api::{Match, Ticket};
use uuid::Uuid;

/// Name recorded on every proposal this function makes.
pub const MATCH_FUNCTION_NAME: &str = "matchfunction";

pub const TICKETS_PER_MATCH: usize = 2;

/// Keep the first ticket seen for each id, preserving order.
pub fn dedupe_tickets(tickets: Vec<Ticket>) -> Vec<Ticket> {
    let mut seen = HashSet::new();
    tickets
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}

/// Pair consecutive tickets. A trailing odd ticket is left for a later run.
pub fn make_matches(profile_name: &str, tickets: &[Ticket]) -> Vec<Match> {
    tickets
        .chunks_exact(TICKETS_PER_MATCH)
        .map(|pair| Match {
            match_id: format!("match-{}", Uuid::new_v4()),
            match_profile: profile_name.to_string(),
            match_function: MATCH_FUNCTION_NAME.to_string(),
            tickets: pair.to_vec(),
        })
        .collect()
}
