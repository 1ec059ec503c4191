use std::time::Duration;

use sentinel_common::config::AppConfig;
use sentinel_watcher::runner::{build_monitor, run_every};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sentinel_watcher=info,sentinel_engine=info,sentinel_notifier=info".into()
            }),
        )
        .json()
        .init();

    tracing::info!("Channel Sentinel watcher starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    let monitor = build_monitor(&config).await?;

    let Some(interval_secs) = config.poll_interval_secs else {
        // Single cycle; a fetch or store failure exits non-zero.
        let report = monitor.run_cycle().await?;
        tracing::info!(
            cycle_id = %report.cycle_id,
            delivered = report.delivered,
            failed = report.failed,
            "Channel Sentinel watcher finished."
        );
        return Ok(());
    };

    tracing::info!(interval_secs, "Running cycles on an interval");

    // Run until Ctrl+C
    tokio::select! {
        _ = run_every(&monitor, Duration::from_secs(interval_secs)) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("Channel Sentinel watcher stopped.");
    Ok(())
}
