//! Redis dedup backend round trip.
//!
//! Requires a running Redis and the `REDIS_URL` environment variable. Run with:
//!
//! ```bash
//! REDIS_URL="redis://localhost:6379" cargo test -p sentinel-engine --test redis -- --ignored --nocapture
//! ```

use redis::AsyncCommands;

use sentinel_common::redis_pool::create_redis_pool;
use sentinel_common::types::ChannelId;
use sentinel_engine::{DedupStore, RedisDedupStore};

#[tokio::test]
#[ignore] // Requires REDIS_URL, run explicitly with --ignored
async fn test_redis_store_round_trip() {
    let url = std::env::var("REDIS_URL").expect("REDIS_URL must be set");
    let mut redis = create_redis_pool(&url).await.unwrap();
    let key = format!("sentinel:test:{}", uuid::Uuid::new_v4());

    let store = RedisDedupStore::new(redis.clone(), key.clone());
    let mut set = store.load().await;
    assert!(set.is_empty());

    let id = ChannelId::new("drops").unwrap();
    store.add_and_persist(&mut set, &id).await.unwrap();
    store.add_and_persist(&mut set, &id).await.unwrap();

    let reloaded = store.load().await;
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.has("drops"));

    redis.del::<_, ()>(&key).await.unwrap();
}
