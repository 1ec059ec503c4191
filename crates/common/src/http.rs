use std::time::Duration;

/// Create the shared HTTP client used by the listing source and the notifier.
///
/// `timeout_secs` bounds every request end to end.
pub fn create_http_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(5)))
        .user_agent(concat!("channel-sentinel/", env!("CARGO_PKG_VERSION")))
        .build()?;

    tracing::debug!(timeout_secs, "HTTP client created");
    Ok(client)
}
