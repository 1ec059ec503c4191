use std::borrow::Borrow;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Stable identifier of a remote channel. This is the dedup key.
///
/// Always non-blank: a record whose id is missing, blank or not a scalar
/// carries `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Returns `None` for blank identifiers.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert a JSON scalar: strings are kept, integers are stringified,
    /// anything else is unusable.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value::<RawChannelId>(value)
            .ok()
            .and_then(RawChannelId::into_id)
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ChannelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Shapes an `id` field may take on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawChannelId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Other(IgnoredAny),
}

impl RawChannelId {
    fn into_id(self) -> Option<ChannelId> {
        match self {
            RawChannelId::Text(s) => ChannelId::new(s),
            RawChannelId::Signed(n) => ChannelId::new(n.to_string()),
            RawChannelId::Unsigned(n) => ChannelId::new(n.to_string()),
            RawChannelId::Other(_) => None,
        }
    }
}

fn deserialize_channel_id<'de, D>(deserializer: D) -> Result<Option<ChannelId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawChannelId>::deserialize(deserializer)?;
    Ok(raw.and_then(RawChannelId::into_id))
}

/// One remote channel as observed at poll time.
///
/// `null` and absent fields are treated the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default, deserialize_with = "deserialize_channel_id")]
    pub id: Option<ChannelId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Channel {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

/// Response envelope of the channel listing endpoint:
/// `{ "result": { "channels": [ ... ] } }`.
#[derive(Debug, Default, Deserialize)]
pub struct ChannelListing {
    #[serde(default)]
    pub result: Option<ListingResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingResult {
    #[serde(default)]
    pub channels: Option<Vec<serde_json::Value>>,
}

/// Channels decoded from a listing, plus the number of array elements that
/// were not channel objects at all.
#[derive(Debug, Default)]
pub struct DecodedListing {
    pub channels: Vec<Channel>,
    pub undecodable: usize,
}

impl ChannelListing {
    /// Decode each element independently so one bad element does not sink
    /// the whole listing. A missing `result` or `channels` is an empty listing.
    pub fn decode(self) -> DecodedListing {
        let raw = self
            .result
            .and_then(|r| r.channels)
            .unwrap_or_default();

        let mut decoded = DecodedListing::default();
        for element in raw {
            match serde_json::from_value::<Channel>(element) {
                Ok(channel) => decoded.channels.push(channel),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping undecodable channel element");
                    decoded.undecodable += 1;
                }
            }
        }
        decoded
    }
}
