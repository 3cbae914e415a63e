use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgonesError>;

#[derive(Error, Debug)]
pub enum AgonesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Allocation API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GameServer allocation failed, state: {0}")]
    NotAllocated(String),

    #[error("GameServer allocation missing address")]
    MissingAddress,

    #[error("GameServer allocation missing ports")]
    MissingPorts,

    #[error("No game port found in allocation")]
    NoGamePort,

    #[error("Configuration error: {0}")]
    Config(String),
}
