//! Shared core for HTTP-backed weather provider clients.
//!
//! This crate defines:
//! - The uniform weather model (queries, readings, collections)
//! - The request/response pipeline every provider runs through
//! - The transport and request-factory seams the pipeline sends requests over
//! - Typed errors for credential, quota, server and payload failures
//! - Client configuration stored on disk
//!
//! Concrete providers implement [`ProviderBackend`] and wrap it in an
//! [`HttpProvider`], which then serves the [`WeatherProvider`] operations.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod transport;

pub use config::ClientConfig;
pub use error::{Result, ServerFailure, WeatherError};
pub use model::{
    MappedWeather, QueryKind, RawPayload, Units, Weather, WeatherCollection, WeatherKind,
    WeatherQuery,
};
pub use provider::{HttpProvider, ProviderBackend, WeatherProvider, check_response};
pub use transport::{
    DefaultRequestFactory, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    RequestFactory, ReqwestTransport, TransportError,
};
