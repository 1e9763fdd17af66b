use crate::{
    config::Config,
    error::{ConfigError, FetchError},
    model::LocationQuery,
    provider::openweather::OpenWeatherClient,
    report::WeatherReport,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Something that can turn a location name into a weather report.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// One lookup, one outbound request. No caching, no retries.
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherReport, FetchError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>, ConfigError> {
    let api_key = config.weather_api_key()?;
    let client = OpenWeatherClient::new(api_key.to_owned(), &config.weather)?;

    Ok(Arc::new(client))
}
