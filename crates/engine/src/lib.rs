//! Deduplicated detection-and-alerting engine.
//!
//! - `matcher`: keyword predicate over channel text
//! - `dedup`: durable set of already-notified channel ids
//! - `traits`: channel source and notifier seams
//! - `monitor`: the per-cycle orchestration loop

pub mod dedup;
pub mod matcher;
pub mod monitor;
pub mod traits;

pub use dedup::{DedupStore, FileDedupStore, NotifiedSet, RedisDedupStore};
pub use matcher::KeywordMatcher;
pub use monitor::{ChannelMonitor, CycleReport};
pub use traits::{ChannelSource, Notifier};
