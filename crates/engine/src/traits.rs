//! Seams between the monitor loop and its I/O collaborators.

use sentinel_common::error::{FetchError, NotifyError};
use sentinel_common::types::Channel;

/// Supplies the current full listing of channels.
#[async_trait::async_trait]
pub trait ChannelSource: Send + Sync {
    /// Fetch every channel. An empty listing is valid.
    async fn fetch_channels(&self) -> Result<Vec<Channel>, FetchError>;

    /// Human-readable name for this source (e.g., "warpcast").
    fn source_name(&self) -> &str;
}

/// Delivers one alert for a matched channel.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel: &Channel) -> Result<(), NotifyError>;

    /// Human-readable name for this destination (e.g., "telegram").
    fn channel_name(&self) -> &str;
}
