//! Builders for Open Match messages used across the integration tests.

use open_match_api::{Match, MatchProfile, Pool, Ticket};

pub const TEST_BEARER_TOKEN: &str = "test-token-abc";
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TEST_RSA_KEY: &str = include_str!("../fixtures/jwt_test_key.pem");

pub fn ticket(id: &str) -> Ticket {
    Ticket {
        id: id.to_string(),
        ..Default::default()
    }
}

pub fn proposal(id: &str, ticket_ids: &[&str]) -> Match {
    Match {
        match_id: id.to_string(),
        match_profile: "simple-2player-profile".to_string(),
        match_function: "matchfunction".to_string(),
        tickets: ticket_ids.iter().map(|t| ticket(t)).collect(),
    }
}

pub fn profile(pools: &[&str]) -> MatchProfile {
    MatchProfile {
        name: "simple-2player-profile".to_string(),
        pools: pools
            .iter()
            .map(|p| Pool {
                name: p.to_string(),
                ..Default::default()
            })
            .collect(),
    }
}
