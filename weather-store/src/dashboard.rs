use common::errors::ProviderError;
use common::models::ResponseSummary;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info, instrument, warn};

use crate::city::CityName;
use crate::store::WeatherStore;

/// Cities shown on a first visit, before anything was favorited
pub const DEFAULT_CITIES: [&str; 4] = ["Guwahati", "Moradabad", "Paris", "Kanpur"];

pub const DEFAULT_DASHBOARD_CONCURRENCY: usize = 4;

/// Outcome of loading one dashboard city
#[derive(Debug)]
pub struct CityLoad {
    pub city: CityName,
    pub error: Option<ProviderError>,
}

#[derive(Debug)]
pub struct DashboardLoad {
    pub cities: Vec<CityLoad>,
    pub summary: ResponseSummary,
}

impl WeatherStore {
    /// The cities the dashboard opens with: favorites, or the defaults when there are none.
    pub fn dashboard_cities(&self) -> Vec<CityName> {
        let favorites = self.snapshot().favorites;
        if favorites.is_empty() {
            DEFAULT_CITIES.iter().map(|c| CityName::new(c)).collect()
        } else {
            favorites
        }
    }

    /// Request bundles for every dashboard city, at most
    /// `dashboard_concurrency` at a time.
    ///
    /// Individual failures are collected, not propagated.
    #[instrument(skip(self))]
    pub async fn load_dashboard(self: &Arc<Self>) -> DashboardLoad {
        let cities = self.dashboard_cities();
        let max_in_flight = self.dashboard_concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(max_in_flight));

        info!(count = cities.len(), max_in_flight, "Loading dashboard cities");

        let mut handles = Vec::with_capacity(cities.len());

        for city in cities {
            let store = self.clone();
            let semaphore = semaphore.clone();
            let name = city.clone();

            let handle = tokio::spawn(
                async move {
                    let _permit = match semaphore.acquire().await {
                        Ok(p) => p,
                        Err(_) => {
                            return CityLoad {
                                error: Some(ProviderError::transport(None, "dashboard load aborted")),
                                city,
                            };
                        }
                    };

                    let error = store.request_city_bundle(city.as_str()).await.err();
                    if let Some(e) = &error {
                        warn!(city = %city, error = %e, "Dashboard city failed");
                    }
                    CityLoad { city, error }
                }
                .in_current_span(),
            );

            handles.push((name, handle));
        }

        let mut loads = Vec::with_capacity(handles.len());
        let mut successful = 0;
        let mut failed = 0;

        for (city, handle) in handles {
            match handle.await {
                Ok(load) => {
                    if load.error.is_none() {
                        successful += 1;
                    } else {
                        failed += 1;
                    }
                    loads.push(load);
                }
                Err(e) => {
                    error!(city = %city, error = %e, "Task join error");
                    failed += 1;
                    loads.push(CityLoad {
                        city,
                        error: Some(ProviderError::transport(None, format!("load task failed: {}", e))),
                    });
                }
            }
        }

        let total = successful + failed;

        info!(total, successful, failed, "Dashboard load completed");

        DashboardLoad {
            cities: loads,
            summary: ResponseSummary {
                total,
                successful,
                failed,
            },
        }
    }
}
