use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    CurrentLocation,
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::City(name) => write!(f, "city '{name}'"),
            Query::CurrentLocation => f.write_str("current location"),
        }
    }
}

/// Provider payload in the OpenWeather "current weather" shape.
///
/// Real providers deserialize straight into this; the mock provider builds it by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWeather {
    pub name: String,
    pub sys: RawSys,
    pub main: RawMain,
    pub weather: Vec<RawCondition>,
    pub wind: RawWind,
    /// Meters.
    pub visibility: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSys {
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCondition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWind {
    pub speed: f64,
}

/// One normalized weather reading for a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub location: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub visibility_km: f64,
    pub pressure_hpa: u32,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherObservation {
    /// Normalize a provider payload. Pure: the same payload always yields the same observation.
    ///
    /// The first entry of `weather` is authoritative; a payload without one is rejected as a whole.
    pub fn from_raw(raw: &RawWeather) -> Result<Self, RetrievalError> {
        let primary = raw.weather.first().ok_or_else(|| {
            RetrievalError::Unknown(format!("payload for '{}' has no weather condition", raw.name))
        })?;

        Ok(Self {
            location: raw.name.clone(),
            country: raw.sys.country.clone(),
            temperature_c: raw.main.temp,
            feels_like_c: raw.main.feels_like,
            condition: primary.main.clone(),
            description: primary.description.clone(),
            icon: primary.icon.clone(),
            humidity_pct: raw.main.humidity,
            wind_speed_ms: raw.wind.speed,
            visibility_km: f64::from(raw.visibility) / 1000.0,
            pressure_hpa: raw.main.pressure,
            observed_at: raw.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }
}
