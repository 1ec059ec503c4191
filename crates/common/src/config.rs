use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

pub const DEFAULT_CHANNELS_API_URL: &str = "https://api.warpcast.com/v2/all-channels";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_KEYWORDS: &str = "airdrop,token launch,new token,giveaway";
pub const DEFAULT_DEDUP_STORE_PATH: &str = "notified_channels.json";
pub const DEFAULT_DEDUP_REDIS_KEY: &str = "sentinel:notified_channels";

/// When a matched channel is recorded as notified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkPolicy {
    /// Record after every dispatch attempt, even a failed one. Never alerts twice.
    #[default]
    Attempt,
    /// Record only after confirmed delivery. Failed dispatches are retried next cycle.
    Delivered,
}

impl FromStr for MarkPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attempt" => Ok(MarkPolicy::Attempt),
            "delivered" => Ok(MarkPolicy::Delivered),
            other => Err(anyhow::anyhow!(
                "MARK_POLICY must be 'attempt' or 'delivered', got '{other}'"
            )),
        }
    }
}

impl std::fmt::Display for MarkPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkPolicy::Attempt => write!(f, "attempt"),
            MarkPolicy::Delivered => write!(f, "delivered"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Telegram bot token
    pub telegram_bot_token: String,

    /// Telegram chat that receives alerts
    pub telegram_chat_id: String,

    /// Telegram Bot API base URL
    pub telegram_api_url: String,

    /// Channel listing endpoint
    pub channels_api_url: String,

    /// Lower-cased alert keywords, in configured order
    pub keywords: Vec<String>,

    /// Location of the notified-channels snapshot file
    pub dedup_store_path: PathBuf,

    /// When set, the notified set lives in Redis instead of the snapshot file
    pub redis_url: Option<String>,

    /// Redis set key holding notified channel ids
    pub dedup_redis_key: String,

    /// When a matched channel counts as notified
    pub mark_policy: MarkPolicy,

    /// Upper bound for each fetch / notify call, in seconds (default: 10)
    pub http_timeout_secs: u64,

    /// Repeat cycles on this interval instead of running once
    pub poll_interval_secs: Option<u64>,
}

impl AppConfig {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{key} environment variable is required"))
        };

        let http_timeout_secs: u64 = lookup("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a valid u64"))?;
        if http_timeout_secs == 0 {
            anyhow::bail!("HTTP_TIMEOUT_SECS must be greater than zero");
        }

        let poll_interval_secs = match lookup("POLL_INTERVAL_SECS") {
            Some(raw) if !raw.trim().is_empty() => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("POLL_INTERVAL_SECS must be a valid u64"))?;
                if secs == 0 {
                    anyhow::bail!("POLL_INTERVAL_SECS must be greater than zero");
                }
                Some(secs)
            }
            _ => None,
        };

        Ok(Self {
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            channels_api_url: lookup("CHANNELS_API_URL")
                .unwrap_or_else(|| DEFAULT_CHANNELS_API_URL.to_string()),
            keywords: parse_keywords(
                &lookup("ALERT_KEYWORDS").unwrap_or_else(|| DEFAULT_KEYWORDS.to_string()),
            ),
            dedup_store_path: lookup("DEDUP_STORE_PATH")
                .unwrap_or_else(|| DEFAULT_DEDUP_STORE_PATH.to_string())
                .into(),
            redis_url: lookup("REDIS_URL").filter(|v| !v.trim().is_empty()),
            dedup_redis_key: lookup("DEDUP_REDIS_KEY")
                .unwrap_or_else(|| DEFAULT_DEDUP_REDIS_KEY.to_string()),
            mark_policy: lookup("MARK_POLICY")
                .map(|v| v.parse::<MarkPolicy>())
                .transpose()?
                .unwrap_or_default(),
            http_timeout_secs,
            poll_interval_secs,
        })
    }
}

/// Split a comma-separated keyword list, lower-casing entries and dropping blanks.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 2] =
        [("TELEGRAM_BOT_TOKEN", "123:ABC"), ("TELEGRAM_CHAT_ID", "-10042")];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&CREDENTIALS)).unwrap();
        assert_eq!(config.telegram_bot_token, "123:ABC");
        assert_eq!(config.telegram_chat_id, "-10042");
        assert_eq!(config.channels_api_url, DEFAULT_CHANNELS_API_URL);
        assert_eq!(config.telegram_api_url, DEFAULT_TELEGRAM_API_URL);
        assert_eq!(
            config.keywords,
            vec!["airdrop", "token launch", "new token", "giveaway"]
        );
        assert_eq!(config.dedup_store_path, PathBuf::from("notified_channels.json"));
        assert_eq!(config.redis_url, None);
        assert_eq!(config.mark_policy, MarkPolicy::Attempt);
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.poll_interval_secs, None);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("TELEGRAM_CHAT_ID", "1")]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("TELEGRAM_BOT_TOKEN"));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "  "),
        ]))
        .unwrap_err()
        .to_string();
        assert!(err.contains("TELEGRAM_CHAT_ID"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.extend([
            ("ALERT_KEYWORDS", " Mint , ,FREE stuff"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("MARK_POLICY", "Delivered"),
            ("HTTP_TIMEOUT_SECS", "3"),
            ("POLL_INTERVAL_SECS", "60"),
            ("DEDUP_STORE_PATH", "/var/lib/sentinel/seen.json"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.keywords, vec!["mint", "free stuff"]);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.mark_policy, MarkPolicy::Delivered);
        assert_eq!(config.http_timeout_secs, 3);
        assert_eq!(config.poll_interval_secs, Some(60));
        assert_eq!(
            config.dedup_store_path,
            PathBuf::from("/var/lib/sentinel/seen.json")
        );
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("HTTP_TIMEOUT_SECS", "soon"));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("POLL_INTERVAL_SECS", "0"));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_invalid_mark_policy_rejected() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("MARK_POLICY", "sometimes"));
        let err = AppConfig::from_lookup(lookup_from(&pairs))
            .unwrap_err()
            .to_string();
        assert!(err.contains("MARK_POLICY"));
    }
}
