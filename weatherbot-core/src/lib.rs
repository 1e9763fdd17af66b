//! Core library for the weather chat bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and the report it renders
//! - Routing of inbound chat events to replies
//!
//! It is used by the `weatherbot` binary; the chat transport itself lives there.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod icon;
pub mod model;
pub mod provider;
pub mod report;

pub use config::{Config, DispatchSettings, WeatherSettings};
pub use dispatch::Dispatcher;
pub use error::{ConfigError, FetchError};
pub use model::{FetchOutcome, InboundEvent, LocationQuery};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient, provider_from_config};
pub use report::{Clock, WeatherReport};
