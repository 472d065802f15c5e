use crate::city::CityName;
use crate::persistent::PersistentStore;
use chrono::Utc;
use common::errors::CacheError;
use common::models::ForecastBundle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// How long a fetched bundle is served without asking the provider again
pub const CACHE_TTL: Duration = Duration::from_secs(60);

const KEY_PREFIX: &str = "wx_";

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by_ms = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        let _ = self
            .now_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(by_ms))
            });
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[derive(Deserialize)]
struct CacheEntry {
    #[serde(rename = "timestamp")]
    fetched_at: i64,
    data: ForecastBundle,
}

/// Per-city forecast cache living in the persistent store.
///
/// Storage problems never reach the caller: a failed read is a miss and a
/// failed write is dropped.
pub struct CityCache {
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CityCache {
    pub fn new(store: Arc<dyn PersistentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: CACHE_TTL,
        }
    }

    pub fn cache_key(city: &CityName) -> String {
        format!("{}{}", KEY_PREFIX, city.key())
    }

    pub fn get(&self, city: &CityName) -> Option<ForecastBundle> {
        match self.load(city) {
            Ok(Some(entry)) => {
                let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
                match self.clock.now_ms().checked_sub(entry.fetched_at) {
                    Some(age_ms) if (0..ttl_ms).contains(&age_ms) => Some(entry.data),
                    Some(age_ms) if age_ms >= ttl_ms => {
                        debug!(city = %city, age_ms, "Cache entry expired");
                        None
                    }
                    _ => {
                        warn!(city = %city, fetched_at = entry.fetched_at, "Ignoring cache entry with impossible timestamp");
                        None
                    }
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!(city = %city, store = self.store.name(), error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    pub fn put(&self, city: &CityName, bundle: &ForecastBundle) {
        if let Err(e) = self.save(city, bundle) {
            warn!(city = %city, store = self.store.name(), error = %e, "Failed to cache forecast");
        }
    }

    fn load(&self, city: &CityName) -> Result<Option<CacheEntry>, CacheError> {
        let Some(raw) = self.store.get(&Self::cache_key(city))? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, city: &CityName, bundle: &ForecastBundle) -> Result<(), CacheError> {
        #[derive(Serialize)]
        struct EntryRef<'a> {
            timestamp: i64,
            data: &'a ForecastBundle,
        }

        let raw = serde_json::to_string(&EntryRef {
            timestamp: self.clock.now_ms(),
            data: bundle,
        })?;
        self.store.set(&Self::cache_key(city), &raw)
    }
}
