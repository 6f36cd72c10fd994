use std::fmt;

use thiserror::Error;

use crate::transport::TransportError;

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

/// Why a response was classified as a server failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerFailure {
    /// Status code of 300 or above not covered by a more specific error.
    Status,
    /// The response carried no body.
    EmptyBody,
}

impl fmt::Display for ServerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerFailure::Status => f.write_str("unexpected status"),
            ServerFailure::EmptyBody => f.write_str("empty response body"),
        }
    }
}

/// Every way a provider call can fail. None of these are retried by the pipeline.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP transport failed: {0}")]
    Client(#[from] TransportError),

    #[error("Provider rejected the credentials (HTTP {status})")]
    InvalidCredentials { status: u16 },

    #[error("Provider quota exceeded (HTTP 429)")]
    QuotaExceeded,

    #[error("Provider server error: {failure} (HTTP {status})")]
    Server { status: u16, failure: ServerFailure },

    #[error("{message}")]
    Weather {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("No weather data available for this query")]
    NoWeatherData,
}

impl WeatherError {
    /// Generic mapping failure raised by a backend.
    pub fn weather(message: impl Into<String>) -> Self {
        WeatherError::Weather { message: message.into(), source: None }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Weather {
            message: format!("Failed to decode provider JSON: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn json_errors_become_weather_errors_with_source() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = WeatherError::from(parse_err);

        assert!(matches!(err, WeatherError::Weather { .. }));
        assert!(err.to_string().starts_with("Failed to decode provider JSON"));
        assert!(err.source().is_some());
    }

    #[test]
    fn transport_errors_are_wrapped() {
        let err = WeatherError::from(TransportError::Other("connection refused".into()));

        assert!(matches!(err, WeatherError::Client(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn server_error_message_names_the_failure() {
        let err = WeatherError::Server { status: 200, failure: ServerFailure::EmptyBody };
        assert!(matches!(err, WeatherError::Server { status: 200, .. }));
        assert_eq!(err.to_string(), "Provider server error: empty response body (HTTP 200)");
    }
}
