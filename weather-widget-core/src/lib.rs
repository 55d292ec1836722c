//! Core library for the weather widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Current-position acquisition behind a swappable capability
//! - Abstraction over weather providers (a mock stand-in and OpenWeather)
//! - The request workflow controller and its state machine
//! - Shared domain models (payloads, observations)
//!
//! It is used by `weather-widget-cli`, but can also be driven by other front-ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;

pub use config::{Config, GeolocationConfig, MockConfig, ProviderConfig};
pub use controller::{Event, RequestState, Snapshot, Ticket, WorkflowController, transition};
pub use error::{LocationError, RetrievalError, WorkflowError};
pub use geolocation::{FixedLocation, IpLocator, LocationSource, NoLocation, PositionOptions};
pub use model::{Coordinates, Query, RawWeather, WeatherObservation};
pub use provider::{ProviderId, WeatherProvider};
