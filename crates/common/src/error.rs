use std::time::Duration;

use thiserror::Error;

/// Failure to obtain the channel listing. Fatal to the current cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Listing endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Listing body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Listing request timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure to deliver one alert. Recovered locally by the monitor.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Messaging API rejected the message ({status}): {description}")]
    Api { status: u16, description: String },

    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure to persist the notified set.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Reasons a monitor cycle aborts.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Channel fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Dedup store write failed: {0}")]
    Store(#[from] StoreError),
}
