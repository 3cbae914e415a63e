use std::collections::HashMap;

use open_match_api::{SearchFields, Ticket};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tag carried by every player session ticket.
pub const SESSION_TAG: &str = "mode.session";

/// Search attributes for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAttributes {
    pub region: String,
    pub skill: f64,
    pub latency: f64,
}

impl PlayerAttributes {
    /// Skill uniform in `[0, 2)`, latency exponential with a 50 ms mean.
    pub fn random(region: &str) -> Self {
        let mut rng = rand::thread_rng();
        let skill = 2.0 * rng.gen::<f64>();
        let latency = -50.0 * (1.0 - rng.gen::<f64>()).ln();

        Self {
            region: region.to_string(),
            skill,
            latency,
        }
    }

    /// Ticket carrying these attributes. The id is left for the backend.
    pub fn to_ticket(&self) -> Ticket {
        Ticket {
            search_fields: Some(SearchFields {
                double_args: HashMap::from([
                    ("skill".to_string(), self.skill),
                    ("latency".to_string(), self.latency),
                ]),
                string_args: HashMap::from([("region".to_string(), self.region.clone())]),
                tags: vec![SESSION_TAG.to_string()],
            }),
            ..Default::default()
        }
    }
}
