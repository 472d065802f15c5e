use common::errors::ProviderError;
use common::http_client::HttpClient;
use common::models::{ForecastBundle, Suggestion};
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::Config;

/// Days of forecast requested for every city
pub const FORECAST_DAYS: u8 = 7;

/// Read-only client for the weatherapi.com endpoints the dashboard needs.
#[derive(Clone)]
pub struct WeatherApiClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for WeatherApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl WeatherApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: HttpClient::new(timeout, max_retries)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Self::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.http_timeout,
            config.http_max_retries,
        )
    }

    /// City autocomplete. Callers filter out queries shorter than two characters.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<Vec<Suggestion>, ProviderError> {
        let url = format!(
            "{}/search.json?key={}&q={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(query)
        );

        let suggestions: Vec<Suggestion> = self.http_client.get_json("search", &url).await?;
        info!(query = %query, count = suggestions.len(), "Search returned");

        Ok(suggestions)
    }

    /// Current conditions, location and a 7-day forecast, with air quality and alerts off.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn fetch_forecast(&self, city: &str) -> Result<ForecastBundle, ProviderError> {
        info!(city = %city, "Fetching forecast from API");

        let url = format!(
            "{}/forecast.json?key={}&q={}&days={}&aqi=no&alerts=no",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(city),
            FORECAST_DAYS
        );

        self.http_client.get_json("forecast", &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bundle_json;
    use common::errors::ProviderErrorKind;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WeatherApiClient {
        WeatherApiClient::new(server.uri(), "test-key", Duration::from_secs(2), 0).unwrap()
    }

    #[test]
    fn debug_output_hides_key() {
        let client =
            WeatherApiClient::new("http://localhost/v1/", "test-key", Duration::from_secs(1), 0)
                .unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("http://localhost/v1\""));
        assert!(!debug.contains("test-key"));
    }

    #[tokio::test]
    async fn search_sends_key_and_encoded_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("key", "test-key"))
            .and(query_param("q", "new york"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2618724, "name": "New York", "region": "New York", "country": "United States of America" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let suggestions = client(&server).search("new york").await.unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "New York");
        assert_eq!(suggestions[0].id, Some(2618724));
    }

    #[tokio::test]
    async fn forecast_requests_seven_days_without_extras() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("q", "Paris"))
            .and(query_param("days", "7"))
            .and(query_param("aqi", "no"))
            .and(query_param("alerts", "no"))
            .respond_with(ResponseTemplate::new(200).set_body_json(bundle_json("Paris", 21.0)))
            .expect(1)
            .mount(&server)
            .await;

        let bundle = client(&server).fetch_forecast("Paris").await.unwrap();

        assert_eq!(bundle.location.name, "Paris");
        assert_eq!(bundle.current.temp_c, 21.0);
        assert_eq!(bundle.forecast.forecastday.len(), 7);
    }

    #[tokio::test]
    async fn unknown_city_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .mount(&server)
            .await;

        let err = client(&server).fetch_forecast("Atlantis").await.unwrap_err();

        assert_eq!(err.kind(), ProviderErrorKind::NotFound);
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn rejected_key_is_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "code": 2006, "message": "API key is invalid." }
            })))
            .mount(&server)
            .await;

        let err = client(&server).search("par").await.unwrap_err();

        assert_eq!(err.kind(), ProviderErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn partial_payload_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "location": { "name": "Paris" }
            })))
            .mount(&server)
            .await;

        let err = client(&server).fetch_forecast("Paris").await.unwrap_err();

        assert_eq!(err.kind(), ProviderErrorKind::MalformedResponse);
    }
}
