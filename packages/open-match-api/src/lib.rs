//! Open Match v1 API types and gRPC stubs.
//!
//! Generated from `proto/api/*.proto`. Everything lives in the `openmatch`
//! protobuf package, so RPC paths are `/openmatch.<Service>/<Method>` and the
//! stubs talk to a stock Open Match deployment.

#![allow(clippy::large_enum_variant)]
#![allow(clippy::derive_partial_eq_without_eq)]

tonic::include_proto!("openmatch");

pub use backend_service_client::BackendServiceClient;
pub use backend_service_server::{BackendService, BackendServiceServer};
pub use evaluator_client::EvaluatorClient;
pub use evaluator_server::{Evaluator, EvaluatorServer};
pub use frontend_service_client::FrontendServiceClient;
pub use frontend_service_server::{FrontendService, FrontendServiceServer};
pub use match_function_client::MatchFunctionClient;
pub use match_function_server::{MatchFunction, MatchFunctionServer};
pub use query_service_client::QueryServiceClient;
pub use query_service_server::{QueryService, QueryServiceServer};

impl Match {
    /// Ids of every ticket in the match, in proposal order.
    pub fn ticket_ids(&self) -> Vec<String> {
        self.tickets.iter().map(|t| t.id.clone()).collect()
    }
}

impl FunctionConfig {
    /// gRPC endpoint descriptor for a match function.
    pub fn grpc(host: impl Into<String>, port: i32) -> Self {
        Self {
            host: host.into(),
            port,
            r#type: function_config::Type::Grpc as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_fetch_matches_response_decodes_match_field() {
        let response = FetchMatchesResponse {
            r#match: Some(Match {
                match_id: "match-1".to_string(),
                match_profile: "simple-2player-profile".to_string(),
                match_function: "matchfunction".to_string(),
                tickets: vec![
                    Ticket {
                        id: "a".to_string(),
                        ..Default::default()
                    },
                    Ticket {
                        id: "b".to_string(),
                        ..Default::default()
                    },
                ],
            }),
        };

        let bytes = response.encode_to_vec();
        let decoded = FetchMatchesResponse::decode(bytes.as_slice()).unwrap();
        let m = decoded.r#match.unwrap();
        assert_eq!(m.ticket_ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_empty_response_has_no_match() {
        let decoded = FetchMatchesResponse::decode(&[][..]).unwrap();
        assert!(decoded.r#match.is_none());
    }

    #[test]
    fn test_function_config_grpc() {
        let config = FunctionConfig::grpc("matchfunction", 50502);
        assert_eq!(config.r#type(), function_config::Type::Grpc);
        assert_eq!(config.port, 50502);
    }
}
