use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AgonesError, Result};

pub const API_VERSION: &str = "allocation.agones.dev/v1";
pub const KIND: &str = "GameServerAllocation";
pub const FLEET_LABEL: &str = "agones.dev/fleet";

/// State Agones reports when a game server was handed out.
pub const STATE_ALLOCATED: &str = "Allocated";

/// Name of the port that carries game traffic.
pub const GAME_PORT_NAME: &str = "game";

/// Request body for a `GameServerAllocation`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameServerAllocation {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    pub spec: AllocationSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectMeta {
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationSpec {
    pub required: LabelSelector,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    pub match_labels: BTreeMap<String, String>,
}

impl GameServerAllocation {
    /// Allocation request selecting any ready server from `fleet`.
    pub fn for_fleet(namespace: &str, fleet: &str) -> Self {
        let mut match_labels = BTreeMap::new();
        match_labels.insert(FLEET_LABEL.to_string(), fleet.to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: Some(ObjectMeta {
                namespace: namespace.to_string(),
            }),
            spec: AllocationSpec {
                required: LabelSelector { match_labels },
            },
        }
    }
}

/// Response body; only the status matters to callers.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GameServerAllocationResult {
    #[serde(default)]
    pub status: AllocationStatus,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ports: Vec<GameServerPort>,
    pub game_server_name: Option<String>,
    pub node_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct GameServerPort {
    #[serde(default)]
    pub name: String,
    pub port: Option<i64>,
}

/// A reserved game server. Only valid for the match it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub address: String,
    pub port: u16,
    pub game_server_name: Option<String>,
}

impl Allocation {
    /// `address:port`, the string handed to waiting clients.
    pub fn connection(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Pick the game traffic port: the one named `game`, else the first usable one.
pub fn select_game_port(ports: &[GameServerPort]) -> Option<u16> {
    let usable = |p: &&GameServerPort| {
        p.port
            .and_then(|n| u16::try_from(n).ok())
            .is_some_and(|n| n > 0)
    };

    ports
        .iter()
        .filter(usable)
        .find(|p| p.name == GAME_PORT_NAME)
        .or_else(|| ports.iter().find(usable))
        .and_then(|p| p.port)
        .and_then(|n| u16::try_from(n).ok())
}

impl AllocationStatus {
    /// Validate the status and turn it into an [`Allocation`].
    pub fn into_allocation(self) -> Result<Allocation> {
        if self.state != STATE_ALLOCATED {
            return Err(AgonesError::NotAllocated(self.state));
        }
        if self.address.is_empty() {
            return Err(AgonesError::MissingAddress);
        }
        if self.ports.is_empty() {
            return Err(AgonesError::MissingPorts);
        }
        let port = select_game_port(&self.ports).ok_or(AgonesError::NoGamePort)?;

        Ok(Allocation {
            address: self.address,
            port,
            game_server_name: self.game_server_name,
        })
    }
}
