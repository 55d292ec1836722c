//! Request lifecycle for the widget.
//!
//! State moves through [`transition`], a pure function, so the machine can be tested without a
//! runtime. [`WorkflowController`] wires it to the providers and publishes every change on a
//! `watch` channel. Each submission gets a generation number; only the completion carrying the
//! latest generation is applied, so a slow earlier request can never overwrite a newer one.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::{
    Config,
    error::WorkflowError,
    geolocation::{LocationSource, location_source_from_config},
    model::{Query, WeatherObservation},
    provider::{WeatherProvider, default_provider_from_config},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(WeatherObservation),
    Failed(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn observation(&self) -> Option<&WeatherObservation> {
        match self {
            RequestState::Success(obs) => Some(obs),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Submitted,
    Resolved(WeatherObservation),
    Rejected(String),
}

pub fn transition(state: &RequestState, event: &Event) -> RequestState {
    match (state, event) {
        (_, Event::Submitted) => RequestState::Loading,
        (RequestState::Loading, Event::Resolved(obs)) => RequestState::Success(obs.clone()),
        (RequestState::Loading, Event::Rejected(msg)) => RequestState::Failed(msg.clone()),
        (current, _) => current.clone(),
    }
}

/// What presentation sees: the state plus the generation that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub generation: u64,
    pub state: RequestState,
}

/// Handle for one submitted request.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub generation: u64,
    pub query: Query,
}

pub struct WorkflowController {
    provider: Arc<dyn WeatherProvider>,
    locator: Arc<dyn LocationSource>,
    default_city: String,
    state: watch::Sender<Snapshot>,
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("provider", &self.provider)
            .field("locator", &self.locator)
            .field("default_city", &self.default_city)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl WorkflowController {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        locator: Arc<dyn LocationSource>,
        default_city: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            provider,
            locator,
            default_city: default_city.into(),
            state,
        }
    }

    /// Controller wired to the configured provider and location source.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = default_provider_from_config(config)?;
        let locator = location_source_from_config(&config.geolocation);
        Ok(Self::new(
            Arc::from(provider),
            Arc::from(locator),
            config.default_city(),
        ))
    }

    pub fn with_locator(mut self, locator: Arc<dyn LocationSource>) -> Self {
        self.locator = locator;
        self
    }

    pub fn state(&self) -> RequestState {
        self.state.borrow().state.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    /// Issue a new generation and enter `Loading`.
    pub fn begin(&self, query: Query) -> Ticket {
        let mut generation = 0;
        self.state.send_modify(|snap| {
            snap.generation += 1;
            snap.state = transition(&snap.state, &Event::Submitted);
            generation = snap.generation;
        });
        debug!(generation, %query, "request submitted");
        Ticket { generation, query }
    }

    /// Trimmed city submission; blank input is ignored and returns `None`.
    pub fn submit_city(&self, text: &str) -> Option<Ticket> {
        let city = text.trim();
        if city.is_empty() {
            debug!("ignoring blank city submission");
            return None;
        }
        Some(self.begin(Query::City(city.to_string())))
    }

    pub fn submit_current_location(&self) -> Ticket {
        self.begin(Query::CurrentLocation)
    }

    /// Run the lookups for a query. Does not touch controller state.
    pub async fn resolve(&self, query: &Query) -> Result<WeatherObservation, WorkflowError> {
        let raw = match query {
            Query::City(name) => self.provider.fetch_by_city(name).await?,
            Query::CurrentLocation => {
                let coords = self.locator.acquire_current_position().await?;
                self.provider.fetch_by_coordinates(coords).await?
            }
        };
        Ok(WeatherObservation::from_raw(&raw)?)
    }

    /// Apply a finished request. Returns false if a newer request superseded it.
    pub fn complete(
        &self,
        ticket: &Ticket,
        outcome: Result<WeatherObservation, WorkflowError>,
    ) -> bool {
        let event = match outcome {
            Ok(obs) => Event::Resolved(obs),
            Err(err) => {
                warn!(generation = ticket.generation, error = %err, "request failed");
                Event::Rejected(err.user_message().to_string())
            }
        };

        let applied = self.state.send_if_modified(|snap| {
            if snap.generation != ticket.generation {
                return false;
            }
            snap.state = transition(&snap.state, &event);
            true
        });

        if !applied {
            debug!(
                generation = ticket.generation,
                latest = self.state.borrow().generation,
                "discarding stale result"
            );
        }
        applied
    }

    /// Resolve and complete a ticket.
    pub async fn run(&self, ticket: Ticket) -> bool {
        let outcome = self.resolve(&ticket.query).await;
        self.complete(&ticket, outcome)
    }

    #[instrument(skip(self))]
    pub async fn search_city(&self, text: &str) -> Option<bool> {
        let ticket = self.submit_city(text)?;
        Some(self.run(ticket).await)
    }

    #[instrument(skip(self))]
    pub async fn use_current_location(&self) -> bool {
        let ticket = self.submit_current_location();
        self.run(ticket).await
    }

    /// Initial view: look up the default city.
    #[instrument(skip(self))]
    pub async fn activate(&self) -> bool {
        info!(city = %self.default_city, "activating with default city");
        let ticket = self.begin(Query::City(self.default_city.clone()));
        self.run(ticket).await
    }
}
