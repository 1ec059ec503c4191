//! Monitor loop: one pass of fetch → filter → notify → persist.
//!
//! For each channel, in source order:
//! 1. Skip records without a usable id
//! 2. Skip ids already in the notified set
//! 3. Skip channels that mention no keyword
//! 4. Notify, then record the id (per `MarkPolicy`) before moving on
//!
//! A fetch failure aborts the cycle before any store mutation. A notify
//! failure is logged and the cycle continues.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sentinel_common::config::MarkPolicy;
use sentinel_common::error::{CycleError, FetchError, NotifyError};
use sentinel_common::types::Channel;

use crate::dedup::DedupStore;
use crate::matcher::KeywordMatcher;
use crate::traits::{ChannelSource, Notifier};

/// Default upper bound for each collaborator call.
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Records returned by the source.
    pub seen: usize,
    /// Records skipped for lack of a usable id.
    pub malformed: usize,
    /// Records whose id was already notified.
    pub already_notified: usize,
    /// Records that mention no keyword.
    pub unmatched: usize,
    /// New matches handed to the notifier.
    pub matched: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl CycleReport {
    fn begin() -> Self {
        let now = Utc::now();
        Self {
            cycle_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            seen: 0,
            malformed: 0,
            already_notified: 0,
            unmatched: 0,
            matched: 0,
            delivered: 0,
            failed: 0,
        }
    }
}

/// Orchestrates a single detection-and-alerting pass.
///
/// Holds no state between cycles; everything durable lives in the store.
pub struct ChannelMonitor {
    source: Arc<dyn ChannelSource>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn DedupStore>,
    matcher: KeywordMatcher,
    mark_policy: MarkPolicy,
    call_timeout: Duration,
}

impl ChannelMonitor {
    pub fn new(
        source: Arc<dyn ChannelSource>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn DedupStore>,
        matcher: KeywordMatcher,
    ) -> Self {
        Self {
            source,
            notifier,
            store,
            matcher,
            mark_policy: MarkPolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_mark_policy(mut self, mark_policy: MarkPolicy) -> Self {
        self.mark_policy = mark_policy;
        self
    }

    /// Bound each fetch and notify call.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Run one cycle. Re-running against an unchanged listing sends nothing.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let mut report = CycleReport::begin();
        let cycle_id = report.cycle_id;

        let mut notified = self.store.load().await;

        tracing::info!(
            %cycle_id,
            source = self.source.source_name(),
            store = self.store.backend_name(),
            known = notified.len(),
            keywords = self.matcher.keywords().len(),
            "Monitor cycle started"
        );

        let channels = match self.fetch().await {
            Ok(channels) => channels,
            Err(e) => {
                tracing::error!(%cycle_id, error = %e, "Channel fetch failed, aborting cycle");
                return Err(e.into());
            }
        };

        // Ids dispatched this cycle. Only matters when a failed delivery is
        // left out of the notified set.
        let mut attempted: HashSet<&str> = HashSet::new();

        for channel in &channels {
            report.seen += 1;

            let Some(id) = channel.id.as_ref() else {
                tracing::debug!(%cycle_id, name = channel.name(), "Skipping channel without id");
                report.malformed += 1;
                continue;
            };

            if notified.has(id.as_str()) {
                report.already_notified += 1;
                continue;
            }

            let Some(keyword) = self.matcher.matched_keyword(channel) else {
                report.unmatched += 1;
                continue;
            };

            if !attempted.insert(id.as_str()) {
                report.already_notified += 1;
                continue;
            }

            report.matched += 1;
            tracing::info!(%cycle_id, channel_id = %id, keyword, "New keyword match");

            let delivered = match self.notify(channel).await {
                Ok(()) => {
                    report.delivered += 1;
                    true
                }
                Err(e) => {
                    tracing::warn!(
                        %cycle_id,
                        channel_id = %id,
                        notifier = self.notifier.channel_name(),
                        error = %e,
                        "Notification failed"
                    );
                    report.failed += 1;
                    false
                }
            };

            if delivered || self.mark_policy == MarkPolicy::Attempt {
                if let Err(e) = self.store.add_and_persist(&mut notified, id).await {
                    tracing::error!(
                        %cycle_id,
                        channel_id = %id,
                        error = %e,
                        "Could not record notified channel, aborting cycle"
                    );
                    return Err(e.into());
                }
            } else {
                tracing::debug!(%cycle_id, channel_id = %id, "Left unrecorded for retry next cycle");
            }
        }

        report.finished_at = Utc::now();
        tracing::info!(
            %cycle_id,
            seen = report.seen,
            matched = report.matched,
            delivered = report.delivered,
            failed = report.failed,
            malformed = report.malformed,
            "Monitor cycle complete"
        );

        Ok(report)
    }

    async fn fetch(&self) -> Result<Vec<Channel>, FetchError> {
        tokio::time::timeout(self.call_timeout, self.source.fetch_channels())
            .await
            .unwrap_or(Err(FetchError::Timeout(self.call_timeout)))
    }

    async fn notify(&self, channel: &Channel) -> Result<(), NotifyError> {
        tokio::time::timeout(self.call_timeout, self.notifier.notify(channel))
            .await
            .unwrap_or(Err(NotifyError::Timeout(self.call_timeout)))
    }
}
