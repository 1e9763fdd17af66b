use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::{
    config::WeatherSettings,
    error::{ConfigError, FetchError},
    model::LocationQuery,
    report::WeatherReport,
};

use super::WeatherProvider;

/// Client for the OpenWeather current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    language: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, settings: &WeatherSettings) -> Result<Self, ConfigError> {
        Self::with_timeout(
            api_key,
            settings.base_url.clone(),
            settings.language.clone(),
            settings.timeout(),
        )
    }

    pub fn with_timeout(
        api_key: String,
        base_url: String,
        language: String,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { api_key, base_url, language, http })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherReport, FetchError> {
        debug!(location = %query, lang = %self.language, "requesting current weather");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", query.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(FetchError::Connection)?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }

        if !status.is_success() {
            let body = res.text().await.ok();
            return Err(provider_error(status, body.as_deref()));
        }

        let body = res.text().await.map_err(FetchError::Connection)?;

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedPayload(format!("response is not JSON: {e}")))?;

        WeatherReport::from_payload(&payload, query)
    }
}

/// A non-success status stays a provider error even if its body is unreadable.
fn provider_error(status: StatusCode, body: Option<&str>) -> FetchError {
    FetchError::Provider {
        status: status.as_u16(),
        detail: body.map(truncate_body).unwrap_or_default(),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
