//! Client-side state for a weather dashboard: provider client, per-city
//! cache and the store views subscribe to.

pub mod api_client;
pub mod cache;
pub mod city;
pub mod config;
pub mod dashboard;
pub mod persistent;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;

use common::errors::InitError;
use std::sync::Arc;

pub use api_client::WeatherApiClient;
pub use cache::{CACHE_TTL, CityCache, Clock, ManualClock, SystemClock};
pub use city::CityName;
pub use config::Config;
pub use dashboard::{CityLoad, DEFAULT_CITIES, DashboardLoad};
pub use persistent::{JsonFileStore, MemoryStore, PersistentStore};
pub use state::{SuggestionStatus, TemperatureUnit, WeatherState};
pub use store::WeatherStore;

/// Wire up a store from configuration with the system clock.
pub fn build_store(config: &Config) -> Result<Arc<WeatherStore>, InitError> {
    let client = Arc::new(WeatherApiClient::from_config(config)?);

    let persistent: Arc<dyn PersistentStore> = match &config.store_path {
        Some(path) => Arc::new(JsonFileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };

    let store = WeatherStore::new(client, persistent, Arc::new(SystemClock))
        .with_dashboard_concurrency(config.dashboard_concurrency);

    Ok(Arc::new(store))
}
