//! Read model handed to views, and the pure derivations views draw from it.

use crate::city::CityName;
use chrono::NaiveDate;
use common::models::{CurrentConditions, ForecastBundle, LocationInfo, SevenDayForecast, Suggestion};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Autocomplete rows shown under the search box
pub const VISIBLE_SUGGESTIONS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggled(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    /// Persisted form, `"C"` or `"F"`
    pub fn code(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "C" => Some(Self::Celsius),
            "F" => Some(Self::Fahrenheit),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Choose between the provider's paired Celsius/Fahrenheit readings.
    pub fn pick(self, celsius: f64, fahrenheit: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => fahrenheit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Everything a view needs to render the dashboard.
///
/// Per-city lookups may miss: a selected or favorite city may not have been
/// fetched yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherState {
    pub current_by_city: HashMap<CityName, CurrentConditions>,
    pub forecast_by_city: HashMap<CityName, SevenDayForecast>,
    pub location_by_city: HashMap<CityName, LocationInfo>,
    pub favorites: Vec<CityName>,
    pub unit: TemperatureUnit,
    pub selected_city: Option<CityName>,
    pub suggestions: Vec<Suggestion>,
    pub suggestion_status: SuggestionStatus,
}

/// Headline numbers for a city card
#[derive(Debug, Clone, PartialEq)]
pub struct CitySummary {
    pub city: CityName,
    pub temperature: f64,
    pub unit: TemperatureUnit,
    pub condition: String,
    pub icon: String,
    pub humidity: f64,
    pub wind_kph: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub temperature: f64,
    pub precip_mm: f64,
    pub wind_kph: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyPoint {
    /// `HH:MM`
    pub time: String,
    pub temperature: f64,
    pub precip_mm: f64,
    pub wind_kph: f64,
}

impl WeatherState {
    /// Store all three parts of a bundle in one step.
    pub(crate) fn apply_bundle(&mut self, city: &CityName, bundle: ForecastBundle) {
        let ForecastBundle {
            location,
            current,
            forecast,
        } = bundle;
        self.current_by_city.insert(city.clone(), current);
        self.forecast_by_city.insert(city.clone(), forecast);
        self.location_by_city.insert(city.clone(), location);
    }

    pub fn has_data(&self, city: &CityName) -> bool {
        self.current_by_city.contains_key(city)
    }

    pub fn is_favorite(&self, city: &CityName) -> bool {
        self.favorites.contains(city)
    }

    pub fn visible_suggestions(&self) -> &[Suggestion] {
        let end = self.suggestions.len().min(VISIBLE_SUGGESTIONS);
        &self.suggestions[..end]
    }

    pub fn city_summary(&self, city: &CityName) -> Option<CitySummary> {
        let current = self.current_by_city.get(city)?;
        Some(CitySummary {
            city: city.clone(),
            temperature: self.unit.pick(current.temp_c, current.temp_f),
            unit: self.unit,
            condition: current.condition.text.clone(),
            icon: current.condition.icon.clone(),
            humidity: current.humidity,
            wind_kph: current.wind_kph,
        })
    }

    pub fn daily_series(&self, city: &CityName) -> Option<Vec<DailyPoint>> {
        let forecast = self.forecast_by_city.get(city)?;
        Some(
            forecast
                .forecastday
                .iter()
                .map(|d| DailyPoint {
                    date: d.date,
                    temperature: self.unit.pick(d.day.avgtemp_c, d.day.avgtemp_f),
                    precip_mm: d.day.totalprecip_mm,
                    wind_kph: d.day.maxwind_kph,
                })
                .collect(),
        )
    }

    /// Hours of the first forecast day.
    pub fn hourly_series(&self, city: &CityName) -> Option<Vec<HourlyPoint>> {
        let forecast = self.forecast_by_city.get(city)?;
        let hours = forecast
            .forecastday
            .first()
            .map(|d| d.hour.as_slice())
            .unwrap_or_default();

        Some(
            hours
                .iter()
                .map(|h| HourlyPoint {
                    time: clock_time(&h.time).to_string(),
                    temperature: self.unit.pick(h.temp_c, h.temp_f),
                    precip_mm: h.precip_mm,
                    wind_kph: h.wind_kph,
                })
                .collect(),
        )
    }
}

/// `2024-06-01 13:00` -> `13:00`
fn clock_time(time: &str) -> &str {
    time.rsplit_once(' ').map_or(time, |(_, hm)| hm)
}
