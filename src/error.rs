use thiserror::Error;

/// Typed failures for store and data-provider operations. Classification
/// misses and gate rejections are ordinary `None` outcomes, never errors.
#[derive(Debug, Error)]
pub enum SignalBotError {
    #[error("no data available for {0}")]
    DataUnavailable(String),

    #[error("unknown tracked signal id {0}")]
    UnknownSignal(String),

    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
