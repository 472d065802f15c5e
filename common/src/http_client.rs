use crate::errors::ProviderError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Error codes the provider uses for queries it cannot resolve to a location
const LOCATION_ERROR_CODES: [u32; 2] = [1003, 1006];

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: u32,
    message: String,
}

/// HTTP client with retry logic and timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            max_retries,
            timeout,
        })
    }

    /// Fetch JSON from URL, retrying transient failures with exponential backoff.
    ///
    /// `endpoint` names the request in logs; the URL carries the API key and is never logged.
    #[instrument(skip(self, url), fields(endpoint = %endpoint))]
    pub async fn get_json<T>(&self, endpoint: &str, url: &str) -> Result<T, ProviderError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut attempt = 0;

        loop {
            match self.fetch_with_timeout(url).await {
                Ok(response) => {
                    info!(endpoint, attempt = attempt + 1, "Request successful");
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let backoff = Duration::from_millis(2_u64.pow(attempt) * 100);
                    warn!(
                        endpoint,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis(),
                        error = %e,
                        "Request failed, retrying with exponential backoff"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(endpoint, attempts = attempt + 1, error = %e, "Request failed");
                    return Err(e);
                }
            }
        }
    }

    async fn fetch_with_timeout<T>(&self, url: &str) -> Result<T, ProviderError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| {
                ProviderError::timeout(format!("no response within {:?}", self.timeout))
            })??;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &text));
        }

        let json: T = serde_json::from_str(&text)?;

        Ok(json)
    }
}

/// Map a non-2xx answer to an error, using the provider's error envelope when present.
fn status_error(status: u16, body: &str) -> ProviderError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();

    match (status, envelope) {
        (401 | 403, envelope) => ProviderError::unauthorized(
            status,
            envelope.map_or_else(|| format!("HTTP {}", status), |e| e.error.message),
        ),
        (404, envelope) => ProviderError::not_found(
            status,
            envelope.map_or_else(|| format!("HTTP {}", status), |e| e.error.message),
        ),
        (_, Some(e)) if LOCATION_ERROR_CODES.contains(&e.error.code) => {
            ProviderError::not_found(status, e.error.message)
        }
        (_, Some(e)) => ProviderError::transport(Some(status), e.error.message),
        (_, None) => ProviderError::transport(Some(status), format!("HTTP {}", status)),
    }
}
