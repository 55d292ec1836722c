//! Current-position acquisition.
//!
//! The workflow only sees the [`LocationSource`] trait. [`IpLocator`] is the real source on a
//! terminal host; [`FixedLocation`] and [`NoLocation`] cover tests and disabled geolocation.

use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{config::GeolocationConfig, error::LocationError, model::Coordinates};

pub const DEFAULT_ENDPOINT: &str = "http://ip-api.com/json";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAXIMUM_AGE: Duration = Duration::from_secs(5 * 60);

/// Options for one position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Upper bound on a single request.
    pub timeout: Duration,
    /// How old a previously obtained fix may be and still be handed out again.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_TIMEOUT,
            maximum_age: DEFAULT_MAXIMUM_AGE,
        }
    }
}

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    /// One attempt: resolves or fails, never retries.
    async fn acquire_current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Resolves the host's position from its public IP address.
#[derive(Debug)]
pub struct IpLocator {
    endpoint: String,
    options: PositionOptions,
    http: Client,
    last_fix: Mutex<Option<(Coordinates, Instant)>>,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new(options: PositionOptions) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, options)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, options: PositionOptions) -> Self {
        Self {
            endpoint: endpoint.into(),
            options,
            http: Client::new(),
            last_fix: Mutex::new(None),
        }
    }

    fn cached_fix(&self) -> Option<Coordinates> {
        let last = *self.last_fix.lock();
        last.filter(|(_, at)| at.elapsed() <= self.options.maximum_age)
            .map(|(coords, _)| coords)
    }

    async fn request_fix(&self) -> Result<Coordinates, LocationError> {
        let res = self.http.get(&self.endpoint).send().await.map_err(|err| {
            warn!(error = %err, "geolocation request failed");
            if err.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::Unavailable
            }
        })?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if status.is_server_error() {
            warn!(%status, "geolocation service error");
            return Err(LocationError::Unavailable);
        }
        if !status.is_success() {
            warn!(%status, "unexpected geolocation status");
            return Err(LocationError::Unknown);
        }

        let body: IpApiResponse = res.json().await.map_err(|err| {
            warn!(error = %err, "failed to parse geolocation response");
            LocationError::Unknown
        })?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            ("success", _, _) => Err(LocationError::Unknown),
            _ => {
                warn!(message = ?body.message, "geolocation lookup failed");
                Err(LocationError::Unavailable)
            }
        }
    }
}

#[async_trait]
impl LocationSource for IpLocator {
    async fn acquire_current_position(&self) -> Result<Coordinates, LocationError> {
        if let Some(coords) = self.cached_fix() {
            debug!(?coords, "reusing recent position fix");
            return Ok(coords);
        }

        if self.options.high_accuracy {
            debug!("high accuracy requested; IP lookup resolves to city level at best");
        }

        let coords = tokio::time::timeout(self.options.timeout, self.request_fix())
            .await
            .map_err(|_| LocationError::Timeout)??;

        *self.last_fix.lock() = Some((coords, Instant::now()));
        debug!(?coords, "acquired position fix");
        Ok(coords)
    }
}

/// Always answers with the same result.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Result<Coordinates, LocationError>);

impl FixedLocation {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self(Ok(Coordinates::new(latitude, longitude)))
    }

    pub fn failing(err: LocationError) -> Self {
        Self(Err(err))
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn acquire_current_position(&self) -> Result<Coordinates, LocationError> {
        self.0
    }
}

/// Geolocation capability absent or disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    async fn acquire_current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Build the location source described by the `[geolocation]` config table.
pub fn location_source_from_config(config: &GeolocationConfig) -> Box<dyn LocationSource> {
    if !config.enabled {
        debug!("geolocation disabled in config");
        return Box::new(NoLocation);
    }
    Box::new(IpLocator::with_endpoint(
        config.endpoint.as_str(),
        config.position_options(),
    ))
}
