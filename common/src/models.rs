use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Everything the provider returns for one city's forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub forecast: SevenDayForecast,
}

/// Resolved location of a forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub tz_id: Option<String>,
    pub localtime: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Weather conditions right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub last_updated: Option<String>,
    pub temp_c: f64,
    pub temp_f: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub condition: Condition,
    pub humidity: f64,
    pub wind_kph: f64,
    #[serde(default)]
    pub pressure_mb: Option<f64>,
    #[serde(default)]
    pub vis_km: Option<f64>,
    #[serde(default)]
    pub uv: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SevenDayForecast {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DaySummary,
    #[serde(default)]
    pub hour: Vec<HourForecast>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_c: f64,
    pub mintemp_f: f64,
    pub avgtemp_c: f64,
    pub avgtemp_f: f64,
    pub totalprecip_mm: f64,
    pub maxwind_kph: f64,
    pub condition: Condition,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourForecast {
    /// Local time as `YYYY-MM-DD HH:MM`
    pub time: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub precip_mm: f64,
    pub wind_kph: f64,
    pub condition: Condition,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Autocomplete match from the provider's search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub region: String,
    pub country: String,
    #[serde(default)]
    pub id: Option<u64>,
}

/// Summary of successful vs failed cities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unmodeled_provider_fields_survive_a_round_trip() {
        let raw = json!({
            "name": "Tokyo",
            "region": "Tokyo",
            "country": "Japan",
            "lat": 35.69,
            "lon": 139.69,
            "tz_id": "Asia/Tokyo",
            "localtime": "2024-01-01 09:00",
            "localtime_epoch": 1704067200
        });

        let location: LocationInfo = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(location.extra["localtime_epoch"], json!(1704067200));
        assert_eq!(serde_json::to_value(&location).unwrap(), raw);
    }

    #[test]
    fn suggestion_id_is_optional() {
        let suggestion: Suggestion = serde_json::from_value(json!({
            "name": "Paris",
            "region": "Ile-de-France",
            "country": "France"
        }))
        .unwrap();
        assert_eq!(suggestion.id, None);
    }
}
