//! Wires configuration into a monitor and drives it: once, or on an interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use sentinel_common::config::AppConfig;
use sentinel_common::http::create_http_client;
use sentinel_common::redis_pool::create_redis_pool;
use sentinel_engine::{ChannelMonitor, DedupStore, FileDedupStore, KeywordMatcher, RedisDedupStore};
use sentinel_notifier::TelegramNotifier;

use crate::source::WarpcastSource;

/// Build a monitor from configuration. Picks the Redis dedup backend when
/// `REDIS_URL` is set, the snapshot file otherwise.
pub async fn build_monitor(config: &AppConfig) -> anyhow::Result<ChannelMonitor> {
    let client = create_http_client(config.http_timeout_secs)?;

    let store: Arc<dyn DedupStore> = match &config.redis_url {
        Some(url) => {
            let redis = create_redis_pool(url).await?;
            Arc::new(RedisDedupStore::new(redis, config.dedup_redis_key.clone()))
        }
        None => Arc::new(FileDedupStore::new(config.dedup_store_path.clone())),
    };

    if config.keywords.is_empty() {
        tracing::warn!("No alert keywords configured, nothing will ever match");
    }

    tracing::info!(
        store = store.backend_name(),
        keywords = ?config.keywords,
        mark_policy = %config.mark_policy,
        "Monitor configured"
    );

    let monitor = ChannelMonitor::new(
        Arc::new(WarpcastSource::new(client.clone(), config.channels_api_url.clone())),
        Arc::new(TelegramNotifier::from_config(client, config)),
        store,
        KeywordMatcher::new(&config.keywords),
    )
    .with_mark_policy(config.mark_policy)
    .with_call_timeout(Duration::from_secs(config.http_timeout_secs));

    Ok(monitor)
}

/// Run cycles on a fixed interval, forever. A failed cycle is logged and
/// the next tick proceeds.
pub async fn run_every(monitor: &ChannelMonitor, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(e) = monitor.run_cycle().await {
            tracing::error!(error = %e, "Monitor cycle failed, waiting for next tick");
        }
    }
}
