use crate::api_client::WeatherApiClient;
use crate::cache::{CityCache, Clock};
use crate::city::CityName;
use crate::dashboard::DEFAULT_DASHBOARD_CONCURRENCY;
use crate::persistent::PersistentStore;
use crate::state::{SuggestionStatus, TemperatureUnit, WeatherState};
use common::errors::ProviderError;
use common::models::{ForecastBundle, Suggestion};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

pub const UNIT_KEY: &str = "unit";
pub const FAVORITES_KEY: &str = "favorites";

/// Queries shorter than this never reach the provider
pub const MIN_QUERY_CHARS: usize = 2;

/// State container behind the dashboard.
///
/// Every intent mutates state in one synchronous step on the watch channel,
/// so no lock is ever held across a provider call and subscribers always
/// see whole transitions.
pub struct WeatherStore {
    client: Arc<WeatherApiClient>,
    cache: CityCache,
    persistent: Arc<dyn PersistentStore>,
    state: watch::Sender<WeatherState>,
    suggestion_generation: AtomicU64,
    pub(crate) dashboard_concurrency: usize,
}

impl WeatherStore {
    /// Build a store, restoring favorites and unit from `persistent`.
    pub fn new(
        client: Arc<WeatherApiClient>,
        persistent: Arc<dyn PersistentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = WeatherState {
            favorites: load_favorites(persistent.as_ref()),
            unit: load_unit(persistent.as_ref()),
            ..WeatherState::default()
        };

        info!(
            store = persistent.name(),
            favorites = state.favorites.len(),
            unit = state.unit.code(),
            "Weather store ready"
        );

        Self {
            client,
            cache: CityCache::new(persistent.clone(), clock),
            persistent,
            state: watch::Sender::new(state),
            suggestion_generation: AtomicU64::new(0),
            dashboard_concurrency: DEFAULT_DASHBOARD_CONCURRENCY,
        }
    }

    /// Cap on concurrent fetches in [`WeatherStore::load_dashboard`].
    pub fn with_dashboard_concurrency(mut self, max_in_flight: usize) -> Self {
        self.dashboard_concurrency = max_in_flight.max(1);
        self
    }

    pub fn dashboard_concurrency(&self) -> usize {
        self.dashboard_concurrency
    }

    /// Receiver that is notified after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    pub fn toggle_unit(&self) -> TemperatureUnit {
        let mut unit = TemperatureUnit::default();
        self.state.send_modify(|s| {
            s.unit = s.unit.toggled();
            unit = s.unit;
            self.persist(UNIT_KEY, unit.code());
        });
        unit
    }

    /// Change which city the details view shows. Does not fetch.
    pub fn set_selected_city(&self, city: Option<&str>) {
        let city = city.map(CityName::new).filter(|c| !c.is_empty());
        self.state.send_modify(|s| s.selected_city = city);
    }

    /// Returns `false` when the city was already a favorite.
    pub fn add_favorite(&self, city: &str) -> bool {
        let city = CityName::new(city);
        if city.is_empty() {
            return false;
        }

        self.state.send_if_modified(|s| {
            if s.favorites.contains(&city) {
                return false;
            }
            s.favorites.push(city.clone());
            self.persist_favorites(&s.favorites);
            true
        })
    }

    /// Returns `false` when the city was not a favorite.
    pub fn remove_favorite(&self, city: &str) -> bool {
        let city = CityName::new(city);

        self.state.send_if_modified(|s| {
            let before = s.favorites.len();
            s.favorites.retain(|c| c != &city);
            if s.favorites.len() == before {
                return false;
            }
            self.persist_favorites(&s.favorites);
            true
        })
    }

    /// Refresh autocomplete suggestions for `query`.
    ///
    /// Only the most recently started call may write suggestions; results of
    /// calls overtaken by a newer one are returned to their caller but never
    /// applied.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn request_suggestions(&self, query: &str) -> Result<Vec<Suggestion>, ProviderError> {
        let query = query.trim();
        let token = self.suggestion_generation.fetch_add(1, Ordering::SeqCst) + 1;

        if query.chars().count() < MIN_QUERY_CHARS {
            self.state.send_modify(|s| {
                s.suggestions.clear();
                s.suggestion_status = SuggestionStatus::Idle;
            });
            return Ok(Vec::new());
        }

        self.state.send_modify(|s| s.suggestion_status = SuggestionStatus::Loading);

        let result = self.client.search(query).await;

        self.state.send_if_modified(|s| {
            if self.suggestion_generation.load(Ordering::SeqCst) != token {
                debug!(query, token, "Discarding superseded suggestions");
                return false;
            }
            match &result {
                Ok(suggestions) => {
                    s.suggestions = suggestions.clone();
                    s.suggestion_status = SuggestionStatus::Succeeded;
                }
                Err(_) => {
                    s.suggestions.clear();
                    s.suggestion_status = SuggestionStatus::Failed;
                }
            }
            true
        });

        result
    }

    /// Make sure `city` has data, from cache when fresh, otherwise from the provider.
    ///
    /// Overlapping calls for one city are not coalesced; whichever finishes
    /// last is what the state holds. A failure leaves the city's previous
    /// data in place and is reported only to this caller.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn request_city_bundle(&self, city: &str) -> Result<ForecastBundle, ProviderError> {
        let city = CityName::new(city);
        if city.is_empty() {
            return Err(ProviderError::not_found(400, "city name is empty"));
        }

        if let Some(bundle) = self.cache.get(&city) {
            info!(city = %city, "Cache hit");
            self.apply_bundle(&city, bundle.clone());
            return Ok(bundle);
        }

        info!(city = %city, "Cache miss");
        let bundle = self.client.fetch_forecast(city.as_str()).await.inspect_err(|e| {
            warn!(city = %city, error = %e, "Forecast fetch failed");
        })?;

        self.cache.put(&city, &bundle);
        self.apply_bundle(&city, bundle.clone());

        Ok(bundle)
    }

    /// Select a city and load its data, as a card click does.
    pub async fn open_city(&self, city: &str) -> Result<ForecastBundle, ProviderError> {
        self.set_selected_city(Some(city));
        self.request_city_bundle(city).await
    }

    fn apply_bundle(&self, city: &CityName, bundle: ForecastBundle) {
        self.state.send_modify(|s| s.apply_bundle(city, bundle));
    }

    fn persist_favorites(&self, favorites: &[CityName]) {
        match serde_json::to_string(favorites) {
            Ok(json) => self.persist(FAVORITES_KEY, &json),
            Err(e) => warn!(error = %e, "Failed to encode favorites"),
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.persistent.set(key, value) {
            warn!(key, store = self.persistent.name(), error = %e, "Failed to persist preference");
        }
    }
}

fn load_unit(persistent: &dyn PersistentStore) -> TemperatureUnit {
    match persistent.get(UNIT_KEY) {
        Ok(Some(code)) => TemperatureUnit::from_code(&code).unwrap_or_else(|| {
            warn!(code = %code, "Unknown stored unit, using default");
            TemperatureUnit::default()
        }),
        Ok(None) => TemperatureUnit::default(),
        Err(e) => {
            warn!(error = %e, "Could not read stored unit");
            TemperatureUnit::default()
        }
    }
}

/// Stored favorites, deduplicated in their original order.
fn load_favorites(persistent: &dyn PersistentStore) -> Vec<CityName> {
    let stored: Vec<CityName> = match persistent.get(FAVORITES_KEY) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable favorites");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "Could not read stored favorites");
            Vec::new()
        }
    };

    let mut favorites: Vec<CityName> = Vec::with_capacity(stored.len());
    for city in stored {
        if !city.is_empty() && !favorites.contains(&city) {
            favorites.push(city);
        }
    }
    favorites
}
