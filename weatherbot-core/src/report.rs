//! Provider payload schema and the human-readable weather report.

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::FetchError, icon, model::LocationQuery};

/// Which wall clock `HH:MM` times are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clock {
    /// Local time of the machine running the bot.
    #[default]
    Local,
    /// Local time at the looked-up location, from the payload's `timezone` offset.
    Location,
    Utc,
}

impl TryFrom<&str> for Clock {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "local" => Ok(Clock::Local),
            "location" => Ok(Clock::Location),
            "utc" => Ok(Clock::Utc),
            _ => Err(format!("unknown clock '{value}', expected local, location or utc")),
        }
    }
}

// Required fields are plain; `wind.gust` and `timezone` are the only optional ones.

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: f64,
    clouds: OwClouds,
    sys: OwSys,
    #[serde(default)]
    timezone: Option<i32>,
}

/// A fully populated current-weather report.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub requested_name: String,
    pub city_name: String,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    /// Zero when the provider omits it.
    pub wind_gust_mps: f64,
    pub visibility_m: f64,
    pub cloud_cover_pct: u8,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub icon: &'static str,
    /// Offset of the location from UTC in seconds, if the provider sent one.
    pub utc_offset_secs: Option<i32>,
}

impl WeatherReport {
    /// Build a report from a raw OpenWeather current-weather payload.
    ///
    /// Fails with [`FetchError::MalformedPayload`] if any required field is
    /// missing or has the wrong shape.
    pub fn from_payload(payload: &Value, requested: &LocationQuery) -> Result<Self, FetchError> {
        let parsed = OwCurrentResponse::deserialize(payload)
            .map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

        let condition = parsed.weather.first().ok_or_else(|| {
            FetchError::MalformedPayload("`weather` array is empty".to_string())
        })?;

        Ok(Self {
            requested_name: requested.as_str().to_owned(),
            city_name: parsed.name,
            observed_at: unix_to_utc(parsed.dt, "dt")?,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            temp_min_c: parsed.main.temp_min,
            temp_max_c: parsed.main.temp_max,
            description: capitalize_first(&condition.description),
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            wind_gust_mps: parsed.wind.gust.unwrap_or(0.0),
            visibility_m: parsed.visibility,
            cloud_cover_pct: parsed.clouds.all,
            sunrise: unix_to_utc(parsed.sys.sunrise, "sys.sunrise")?,
            sunset: unix_to_utc(parsed.sys.sunset, "sys.sunset")?,
            icon: icon::resolve_code(&condition.icon),
            utc_offset_secs: parsed.timezone,
        })
    }

    /// Visibility in whole kilometres, ties rounded to even.
    pub fn visibility_km(&self) -> f64 {
        (self.visibility_m / 1000.0).round_ties_even()
    }

    /// Render the multi-line chat reply.
    pub fn render(&self, clock: Clock) -> String {
        let mut lines = vec![
            format!("🏠 Населений пункт: {} / {}", self.requested_name, self.city_name),
            format!("⌚ Останнє оновлення о: {}", self.hh_mm(self.observed_at, clock)),
            format!(
                "🌡 Температура: {}°C (відчувається як {}°C)",
                self.temperature_c, self.feels_like_c
            ),
            format!("{} {}", self.icon, self.description),
            format!(
                "↕️ Мінімальна / максимальна температура: {}°C / {}°C",
                self.temp_min_c, self.temp_max_c
            ),
            format!("⛅ Хмарність: {} %", self.cloud_cover_pct),
            format!("💨 Вітер: {} м/с", self.wind_speed_mps),
        ];

        if self.wind_gust_mps > 0.0 {
            lines.push(format!("🌬 Пориви вітру: {} м/с", self.wind_gust_mps));
        }

        lines.extend([
            format!("💧 Вологість: {}%", self.humidity_pct),
            format!("👀 Видимість на дорогах: {} км", self.visibility_km()),
            format!("🌅 Схід сонця: {}", self.hh_mm(self.sunrise, clock)),
            format!("🌇 Захід сонця: {}", self.hh_mm(self.sunset, clock)),
        ]);

        lines.join("\n")
    }

    fn hh_mm(&self, at: DateTime<Utc>, clock: Clock) -> String {
        const FMT: &str = "%H:%M";

        match clock {
            Clock::Local => at.with_timezone(&Local).format(FMT).to_string(),
            Clock::Utc => at.format(FMT).to_string(),
            Clock::Location => match self.utc_offset_secs.and_then(FixedOffset::east_opt) {
                Some(offset) => at.with_timezone(&offset).format(FMT).to_string(),
                None => at.format(FMT).to_string(),
            },
        }
    }
}

fn unix_to_utc(ts: i64, field: &str) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| FetchError::MalformedPayload(format!("`{field}` timestamp {ts} out of range")))
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
