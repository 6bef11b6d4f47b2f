use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Playback failed: {0}")]
    Playback(String),
    #[error("Result provider failed: {0}")]
    Provider(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] figment::Error),
    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}
