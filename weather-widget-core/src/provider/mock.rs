//! Stand-in provider that fabricates plausible readings after an artificial delay.
//!
//! Any city whose name contains "error" (ignoring case) is reported as not found. That rule is a
//! demo hook kept for compatibility and can go once a real provider is wired in.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{
    error::RetrievalError,
    model::{Coordinates, RawCondition, RawMain, RawSys, RawWeather, RawWind},
};

use super::WeatherProvider;

pub const DEFAULT_LATENCY: Duration = Duration::from_secs(1);

const COUNTRY: &str = "Demo";
const ICON: &str = "01d";

/// (condition, description, temperature °C)
const CONDITIONS: [(&str, &str, f64); 4] = [
    ("Clear", "clear sky", 25.0),
    ("Clouds", "scattered clouds", 18.0),
    ("Rain", "light rain", 15.0),
    ("Snow", "light snow", -2.0),
];

#[derive(Debug)]
pub struct MockProvider {
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible readings for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    fn fabricate(&self, city: &str) -> RawWeather {
        let mut rng = self.rng.lock();
        let (main, description, temp) = CONDITIONS[rng.gen_range(0..CONDITIONS.len())];

        RawWeather {
            name: city.to_string(),
            sys: RawSys { country: COUNTRY.to_string() },
            main: RawMain {
                temp,
                feels_like: temp + f64::from(rng.gen_range(-2i32..=2)),
                humidity: rng.gen_range(40..80),
                pressure: rng.gen_range(1000..1050),
            },
            weather: vec![RawCondition {
                main: main.to_string(),
                description: description.to_string(),
                icon: ICON.to_string(),
            }],
            wind: RawWind { speed: rng.gen_range(0.0..10.0) },
            visibility: rng.gen_range(5000..10000),
            dt: Some(Utc::now().timestamp()),
        }
    }
}

fn is_unresolvable(name: &str) -> bool {
    name.to_ascii_lowercase().contains("error")
}

#[async_trait]
impl WeatherProvider for MockProvider {
    async fn fetch_by_coordinates(&self, at: Coordinates) -> Result<RawWeather, RetrievalError> {
        debug!(?at, latency = ?self.latency, "mock lookup by coordinates");
        tokio::time::sleep(self.latency).await;

        Ok(RawWeather {
            name: "Current Location".to_string(),
            sys: RawSys { country: COUNTRY.to_string() },
            main: RawMain {
                temp: 22.0,
                feels_like: 25.0,
                humidity: 65,
                pressure: 1013,
            },
            weather: vec![RawCondition {
                main: "Clear".to_string(),
                description: "clear sky".to_string(),
                icon: ICON.to_string(),
            }],
            wind: RawWind { speed: 3.5 },
            visibility: 10_000,
            dt: Some(Utc::now().timestamp()),
        })
    }

    async fn fetch_by_city(&self, name: &str) -> Result<RawWeather, RetrievalError> {
        debug!(city = name, latency = ?self.latency, "mock lookup by city");
        tokio::time::sleep(self.latency).await;

        if is_unresolvable(name) {
            return Err(RetrievalError::NotFound(name.to_string()));
        }

        Ok(self.fabricate(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherObservation;

    fn instant(seed: u64) -> MockProvider {
        MockProvider::with_seed(seed).with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn names_containing_error_are_not_found() {
        let provider = instant(1);
        for name in ["Errorville", "ERROR", "has_Error_in_it", "causes an error"] {
            let err = provider.fetch_by_city(name).await.unwrap_err();
            assert_eq!(err, RetrievalError::NotFound(name.to_string()), "{name}");
        }
    }

    #[tokio::test]
    async fn fabricated_values_stay_in_range() {
        let provider = instant(7);

        for _ in 0..500 {
            let raw = provider.fetch_by_city("London").await.expect("mock never fails here");
            let obs = WeatherObservation::from_raw(&raw).expect("normalizes");

            assert_eq!(obs.location, "London");
            assert_eq!(obs.country, "Demo");
            assert!((40..=80).contains(&obs.humidity_pct), "humidity {}", obs.humidity_pct);
            assert!((1000..=1050).contains(&obs.pressure_hpa), "pressure {}", obs.pressure_hpa);
            assert!((0.0..=10.0).contains(&obs.wind_speed_ms), "wind {}", obs.wind_speed_ms);
            assert!((5.0..=10.0).contains(&obs.visibility_km), "visibility {}", obs.visibility_km);
            assert_eq!(obs.visibility_km, f64::from(raw.visibility) / 1000.0);
            assert!((obs.feels_like_c - obs.temperature_c).abs() <= 2.0);

            let known = CONDITIONS.iter().any(|(c, d, t)| {
                *c == obs.condition && *d == obs.description && *t == obs.temperature_c
            });
            assert!(known, "unexpected condition triple {obs:?}");
        }
    }

    #[tokio::test]
    async fn same_seed_same_readings() {
        let a = instant(42).fetch_by_city("Oslo").await.expect("ok");
        let b = instant(42).fetch_by_city("Oslo").await.expect("ok");

        assert_eq!(a.main, b.main);
        assert_eq!(a.weather, b.weather);
        assert_eq!(a.visibility, b.visibility);
    }

    #[tokio::test]
    async fn coordinates_give_fixed_reading() {
        let raw = instant(0)
            .fetch_by_coordinates(Coordinates::new(51.5, -0.1))
            .await
            .expect("ok");
        let obs = WeatherObservation::from_raw(&raw).expect("normalizes");

        assert_eq!(obs.location, "Current Location");
        assert_eq!(obs.condition, "Clear");
        assert_eq!(obs.temperature_c, 22.0);
        assert_eq!(obs.visibility_km, 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_artificial_latency() {
        let provider = MockProvider::with_seed(3);
        assert_eq!(provider.latency(), Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        provider.fetch_by_city("Paris").await.expect("ok");
        assert!(started.elapsed() >= Duration::from_secs(1));
    }
}
