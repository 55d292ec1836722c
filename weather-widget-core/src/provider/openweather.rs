use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::{
    error::RetrievalError,
    model::{Coordinates, RawWeather},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, query: &[(&str, &str)]) -> Result<RawWeather, RetrievalError> {
        let url = format!("{}/weather", self.base_url.trim_end_matches('/'));

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "failed to send request to OpenWeather");
                RetrievalError::NetworkFailure(err.to_string())
            })?;

        let status = res.status();
        let body = res.text().await.map_err(RetrievalError::from)?;

        if status == StatusCode::NOT_FOUND {
            return Err(RetrievalError::NotFound(truncate_body(&body)));
        }

        if !status.is_success() {
            warn!(%status, "OpenWeather request failed");
            return Err(RetrievalError::Unknown(format!(
                "OpenWeather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body).map_err(|err| {
            RetrievalError::Unknown(format!("Failed to parse OpenWeather current JSON: {err}"))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_by_coordinates(&self, at: Coordinates) -> Result<RawWeather, RetrievalError> {
        debug!(?at, "OpenWeather lookup by coordinates");
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();
        self.fetch_current(&[("lat", lat.as_str()), ("lon", lon.as_str())])
            .await
    }

    async fn fetch_by_city(&self, name: &str) -> Result<RawWeather, RetrievalError> {
        debug!(city = name, "OpenWeather lookup by city");
        self.fetch_current(&[("q", name)]).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
