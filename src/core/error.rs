use thiserror::Error;

/// Failure taxonomy for the scanner. None of these are fatal to the
/// process: network and data errors degrade a page to empty, config
/// errors reset the settings file to defaults.
#[derive(Debug, Error)]
pub enum SniperError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed auction page: {0}")]
    Data(String),

    #[error("configuration error: {0}")]
    Config(String),
}
