use open_match_api::{FunctionConfig, MatchProfile, Pool};

/// Profile rebuilt from configuration at the start of every cycle.
pub fn build_profile(name: &str, pool_names: &[String]) -> MatchProfile {
    MatchProfile {
        name: name.to_string(),
        pools: pool_names
            .iter()
            .map(|pool| Pool {
                name: pool.clone(),
                ..Default::default()
            })
            .collect(),
    }
}

/// Where the backend should reach the match function.
pub fn function_config(host: &str, port: u16) -> FunctionConfig {
    FunctionConfig::grpc(host, i32::from(port))
}
