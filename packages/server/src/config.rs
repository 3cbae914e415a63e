use anyhow::{bail, Context, Result};
use agones_client::TlsFiles;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Deadline for the FetchMatches stream.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Deadline for AssignTickets and the other unary ticket calls.
pub const ASSIGN_TIMEOUT: Duration = Duration::from_secs(10);
/// Deadline for a QueryTickets stream.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Variable source; `env::var` in production, a map in tests.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn var_or(lookup: Lookup, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(lookup: Lookup, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.is_empty()) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

fn secs_or(lookup: Lookup, key: &str, default: u64) -> Result<Duration> {
    parse_or(lookup, key, default).map(Duration::from_secs)
}

/// How the director reserves game servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorMode {
    /// `GameServerAllocation` through the Kubernetes API.
    Cluster,
    /// POST to the Agones allocator service.
    Http,
}

impl FromStr for AllocatorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cluster" | "k8s" | "kubernetes" => Ok(Self::Cluster),
            "http" | "https" | "service" => Ok(Self::Http),
            other => bail!("AGONES_ALLOCATOR_MODE must be 'cluster' or 'http', got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    pub mode: AllocatorMode,
    pub namespace: String,
    pub fleet: String,
    pub endpoint: Option<String>,
    pub port: u16,
    pub tls: Option<TlsFiles>,
    /// Kubernetes API server for cluster mode outside a pod.
    pub api_server: Option<String>,
    pub api_token: Option<String>,
    pub api_ca: Option<PathBuf>,
}

impl AllocatorConfig {
    pub fn from_lookup(lookup: Lookup) -> Result<Self> {
        let mode: AllocatorMode = var_or(lookup, "AGONES_ALLOCATOR_MODE", "cluster").parse()?;
        let endpoint = lookup("AGONES_ALLOCATOR_ENDPOINT").filter(|v| !v.is_empty());

        if mode == AllocatorMode::Http && endpoint.is_none() {
            bail!("AGONES_ALLOCATOR_ENDPOINT must be set when AGONES_ALLOCATOR_MODE=http");
        }

        let tls = match (
            lookup("AGONES_CLIENT_CERT"),
            lookup("AGONES_CLIENT_KEY"),
            lookup("AGONES_CA_CERT"),
        ) {
            (Some(cert), Some(key), Some(ca)) => Some(TlsFiles {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
                ca: PathBuf::from(ca),
            }),
            _ => None,
        };

        Ok(Self {
            mode,
            namespace: var_or(lookup, "AGONES_NAMESPACE", "game"),
            fleet: var_or(lookup, "AGONES_FLEET", "ue5-gameserver-fleet"),
            endpoint,
            port: parse_or(lookup, "AGONES_ALLOCATOR_PORT", 443)?,
            tls,
            api_server: lookup("AGONES_API_SERVER").filter(|v| !v.is_empty()),
            api_token: lookup("AGONES_API_TOKEN").filter(|v| !v.is_empty()),
            api_ca: lookup("AGONES_API_CA_CERT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        })
    }
}

/// Director configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct DirectorConfig {
    pub backend_addr: String,
    pub match_function_host: String,
    pub match_function_port: u16,
    pub profile_name: String,
    pub pool_names: Vec<String>,
    pub fetch_interval: Duration,
    pub fetch_timeout: Duration,
    pub assign_timeout: Duration,
    pub allocator: AllocatorConfig,
}

impl DirectorConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup) -> Result<Self> {
        let pool_names: Vec<String> = var_or(lookup, "MATCH_POOLS", "everyone")
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if pool_names.is_empty() {
            bail!("MATCH_POOLS must name at least one pool");
        }

        Ok(Self {
            backend_addr: var_or(
                lookup,
                "OPEN_MATCH_BACKEND_SERVICE",
                "open-match-backend.open-match.svc.cluster.local:50505",
            ),
            match_function_host: var_or(
                lookup,
                "MATCH_FUNCTION_HOST",
                "matchfunction.open-match.svc.cluster.local",
            ),
            match_function_port: parse_or(lookup, "MATCH_FUNCTION_PORT", 50502)?,
            profile_name: var_or(lookup, "MATCH_PROFILE_NAME", "simple-2player-profile"),
            pool_names,
            fetch_interval: secs_or(lookup, "FETCH_INTERVAL", 5)?,
            fetch_timeout: FETCH_TIMEOUT,
            assign_timeout: ASSIGN_TIMEOUT,
            allocator: AllocatorConfig::from_lookup(lookup)?,
        })
    }
}

/// Match function configuration (listen port comes from the CLI)
#[derive(Debug, Clone)]
pub struct MatchFunctionConfig {
    pub query_addr: String,
    pub query_timeout: Duration,
}

impl MatchFunctionConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup) -> Result<Self> {
        let host = var_or(
            lookup,
            "OPEN_MATCH_QUERY_SERVICE",
            "open-match-query.open-match.svc.cluster.local",
        );
        let port: u16 = parse_or(lookup, "OPEN_MATCH_QUERY_SERVICE_PORT", 50503)?;

        Ok(Self {
            query_addr: format!("{}:{}", host, port),
            query_timeout: QUERY_TIMEOUT,
        })
    }
}

/// Token signing algorithm for the access token handed to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtAlgorithm {
    /// Shared secret.
    Hs256,
    /// RSA key pair, public half served at `/.well-known/jwks.json`.
    Rs256,
}

impl FromStr for JwtAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::Hs256),
            "RS256" => Ok(Self::Rs256),
            other => bail!("JWT_ALGORITHM must be HS256 or RS256, got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub algorithm: JwtAlgorithm,
    pub secret: String,
    pub private_key_path: Option<PathBuf>,
    pub expiration_minutes: i64,
}

/// Game front door configuration
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub frontend_addr: String,
    pub assignment_timeout: Duration,
    pub bearer_token: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl FrontendConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup) -> Result<Self> {
        Ok(Self {
            frontend_addr: frontend_addr(lookup),
            assignment_timeout: secs_or(lookup, "ASSIGNMENT_TIMEOUT", 60)?,
            bearer_token: var_or(lookup, "BEARER_TOKEN", "secret-token-12345"),
            port: parse_or(lookup, "PORT", 8080)?,
            jwt: JwtConfig {
                algorithm: var_or(lookup, "JWT_ALGORITHM", "HS256").parse()?,
                secret: var_or(
                    lookup,
                    "JWT_SECRET_KEY",
                    "your-secret-key-change-in-production",
                ),
                private_key_path: lookup("JWT_PRIVATE_KEY_PATH")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from),
                expiration_minutes: parse_or(lookup, "JWT_EXPIRATION_MINUTES", 60)?,
            },
        })
    }
}

/// Matchmaking smoke-test client configuration
#[derive(Debug, Clone)]
pub struct TestClientConfig {
    pub frontend_addr: String,
    pub assignment_timeout: Duration,
}

impl TestClientConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup) -> Result<Self> {
        Ok(Self {
            frontend_addr: frontend_addr(lookup),
            assignment_timeout: secs_or(lookup, "ASSIGNMENT_TIMEOUT", 60)?,
        })
    }
}

fn frontend_addr(lookup: Lookup) -> String {
    var_or(
        lookup,
        "OPEN_MATCH_FRONTEND_SERVICE",
        "open-match-frontend.open-match.svc.cluster.local:50504",
    )
}
