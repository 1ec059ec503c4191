//! Channel listing client for the Warpcast `all-channels` endpoint.

use sentinel_common::error::FetchError;
use sentinel_common::types::{Channel, ChannelListing};
use sentinel_engine::ChannelSource;

/// Longest error body kept in a `FetchError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// Fetches the full channel listing with one GET per cycle.
#[derive(Debug, Clone)]
pub struct WarpcastSource {
    url: String,
    client: reqwest::Client,
}

impl WarpcastSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl ChannelSource for WarpcastSource {
    async fn fetch_channels(&self) -> Result<Vec<Channel>, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let listing: ChannelListing = serde_json::from_slice(&bytes)?;
        let decoded = listing.decode();

        tracing::debug!(
            url = %self.url,
            channels = decoded.channels.len(),
            undecodable = decoded.undecodable,
            "Fetched channel listing"
        );

        Ok(decoded.channels)
    }

    fn source_name(&self) -> &str {
        "warpcast"
    }
}
