//! In-memory caches for geocoding results and daily forecasts.
//!
//! Both caches are plain objects owned by whoever builds the resolver or
//! aggregator, so independent instances never share state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::types::{Coordinates, DailyForecast};

/// Default forecast lifetime after insertion
pub const DEFAULT_FORECAST_TTL: Duration = Duration::from_secs(10 * 60);

/// Storage for resolved locations, keyed by the exact query string.
pub trait GeocodeCache: Send + Sync {
    fn get(&self, location: &str) -> Option<Coordinates>;
    fn insert(&self, location: String, coords: Coordinates);
    fn len(&self) -> usize;
    fn clear(&self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unbounded geocode cache; entries live until `clear()` or drop.
#[derive(Debug, Default)]
pub struct MemoryGeocodeCache {
    entries: Mutex<HashMap<String, Coordinates>>,
}

impl MemoryGeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeocodeCache for MemoryGeocodeCache {
    fn get(&self, location: &str) -> Option<Coordinates> {
        self.entries.lock().get(location).copied()
    }

    fn insert(&self, location: String, coords: Coordinates) {
        self.entries.lock().insert(location, coords);
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[derive(Debug)]
struct CachedForecast {
    generation: u64,
    inserted_at: Instant,
    forecasts: Vec<DailyForecast>,
}

type ForecastEntries = Mutex<HashMap<String, CachedForecast>>;

/// Forecast cache with time-since-insert expiry.
///
/// Every insert schedules a one-shot deletion timer that reads never renew.
/// Each stored entry carries a generation number and a timer only removes
/// the generation it was scheduled for, so replacing an entry before the old
/// timer fires does not lose the replacement. Reads also check the age of
/// the entry, which covers inserts made outside a Tokio runtime.
#[derive(Debug)]
pub struct ForecastCache {
    entries: Arc<ForecastEntries>,
    ttl: Duration,
    next_generation: AtomicU64,
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new(DEFAULT_FORECAST_TTL)
    }
}

impl ForecastCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached summaries for `key` unless they have expired.
    pub fn get(&self, key: &str) -> Option<Vec<DailyForecast>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.forecasts.clone()),
            Some(_) => {
                entries.remove(key);
                tracing::debug!("Forecast cache entry for {} expired", key);
                None
            }
            None => None,
        }
    }

    /// Store `forecasts` under `key` and schedule its removal after the TTL.
    pub fn insert(&self, key: String, forecasts: Vec<DailyForecast>) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().insert(
            key.clone(),
            CachedForecast {
                generation,
                inserted_at: Instant::now(),
                forecasts,
            },
        );
        self.schedule_expiry(key, generation);
    }

    /// Number of stored entries, including expired ones not yet removed
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn schedule_expiry(&self, key: String, generation: u64) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    "No async runtime for the expiry timer of {}; relying on read-time expiry",
                    key
                );
                return;
            }
        };

        let entries = Arc::downgrade(&self.entries);
        let ttl = self.ttl;
        handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            expire(&entries, &key, generation);
        });
    }
}

fn expire(entries: &Weak<ForecastEntries>, key: &str, generation: u64) {
    // Cache already dropped
    let Some(entries) = entries.upgrade() else {
        return;
    };

    let mut entries = entries.lock();
    match entries.get(key) {
        Some(entry) if entry.generation == generation => {
            entries.remove(key);
            tracing::debug!("Forecast cache entry for {} expired", key);
        }
        Some(_) => {
            tracing::debug!("Skipping stale expiry timer for {}", key);
        }
        None => {}
    }
}
