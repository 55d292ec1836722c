use thiserror::Error;

/// Why the platform could not hand out a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("geolocation is not supported on this platform")]
    Unsupported,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location information unavailable")]
    Unavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("unknown location error")]
    Unknown,
}

impl LocationError {
    /// Message shown to the user. Every kind points at manual city entry.
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::Unsupported => {
                "Geolocation is not supported on this platform. Please enter a city manually."
            }
            LocationError::PermissionDenied => {
                "Location access denied. Please enter a city manually."
            }
            LocationError::Unavailable => {
                "Location information unavailable. Please enter a city manually."
            }
            LocationError::Timeout => "Location request timed out. Please enter a city manually.",
            LocationError::Unknown => "An unknown error occurred. Please enter a city manually.",
        }
    }
}

/// Failure to obtain a weather payload from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("location not found: {0}")]
    NotFound(String),
    #[error("network failure: {0}")]
    NetworkFailure(String),
    #[error("weather retrieval failed: {0}")]
    Unknown(String),
}

impl RetrievalError {
    pub fn user_message(&self) -> &'static str {
        match self {
            RetrievalError::NotFound(_) => "City not found",
            RetrievalError::NetworkFailure(_) => {
                "Network error while fetching weather data. Please try again."
            }
            RetrievalError::Unknown(_) => "Failed to fetch weather data",
        }
    }
}

impl From<reqwest::Error> for RetrievalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            RetrievalError::NetworkFailure(err.to_string())
        } else {
            RetrievalError::Unknown(err.to_string())
        }
    }
}

/// Anything that can go wrong between a submission and its observation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

impl WorkflowError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WorkflowError::Location(err) => err.user_message(),
            WorkflowError::Retrieval(err) => err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_messages_are_distinct() {
        let kinds = [
            LocationError::Unsupported,
            LocationError::PermissionDenied,
            LocationError::Unavailable,
            LocationError::Timeout,
            LocationError::Unknown,
        ];

        for (i, a) in kinds.iter().enumerate() {
            assert!(a.user_message().ends_with("Please enter a city manually."));
            for b in &kinds[i + 1..] {
                assert_ne!(a.user_message(), b.user_message(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn permission_denied_message_is_exact() {
        assert_eq!(
            LocationError::PermissionDenied.user_message(),
            "Location access denied. Please enter a city manually."
        );
        assert_ne!(
            LocationError::PermissionDenied.user_message(),
            LocationError::Timeout.user_message()
        );
    }

    #[test]
    fn workflow_error_delegates_message() {
        let err: WorkflowError = RetrievalError::NotFound("Errorville".into()).into();
        assert_eq!(err.user_message(), "City not found");

        let err: WorkflowError = LocationError::Timeout.into();
        assert_eq!(err.user_message(), LocationError::Timeout.user_message());
    }

    #[test]
    fn unknown_retrieval_uses_neutral_phrase() {
        let err = RetrievalError::Unknown("status 500".into());
        assert_eq!(err.user_message(), "Failed to fetch weather data");
        assert!(err.to_string().contains("status 500"));
    }
}
