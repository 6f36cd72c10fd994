use async_trait::async_trait;
use log::{debug, trace};
use std::{fmt::Debug, sync::Arc};

use crate::{
    config::ClientConfig,
    error::{Result, ServerFailure, WeatherError},
    model::{
        MappedWeather, QueryKind, RawPayload, Units, Weather, WeatherCollection, WeatherKind,
        WeatherQuery,
    },
    transport::{
        DefaultRequestFactory, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
        ReqwestTransport, RequestFactory,
    },
};

/// Operations every weather provider client offers to callers.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_current_weather(&self, query: &WeatherQuery) -> Result<Weather>;

    async fn get_forecast(&self, query: &WeatherQuery) -> Result<WeatherCollection>;

    /// Single reading nearest to `query.date_time`.
    async fn get_historical(&self, query: &WeatherQuery) -> Result<Weather>;

    async fn get_historical_time_line(&self, query: &WeatherQuery) -> Result<WeatherCollection>;
}

/// Provider-specific pieces plugged into [`HttpProvider`]: where to send a
/// query and how to turn the decoded body into readings.
pub trait ProviderBackend: Send + Sync + Debug {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// URL (absolute, or relative to the configured base URL) for `kind`.
    fn query_string(&self, kind: QueryKind, query: &WeatherQuery) -> Result<String>;

    /// Provider's own name for a unit system.
    fn map_units(&self, units: Units) -> &'static str {
        units.as_str()
    }

    fn map_raw_data(
        &self,
        latitude: f64,
        longitude: f64,
        raw: &RawPayload,
        kind: WeatherKind,
        units: Option<Units>,
    ) -> Result<MappedWeather>;
}

/// Request/response pipeline shared by all HTTP-backed providers.
#[derive(Debug)]
pub struct HttpProvider<B> {
    backend: B,
    transport: Arc<dyn HttpTransport>,
    request_factory: Arc<dyn RequestFactory>,
    config: ClientConfig,
}

impl<B: ProviderBackend> HttpProvider<B> {
    pub fn new(backend: B, transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_request_factory(backend, transport, Arc::new(DefaultRequestFactory::default()))
    }

    pub fn with_request_factory(
        backend: B,
        transport: Arc<dyn HttpTransport>,
        request_factory: Arc<dyn RequestFactory>,
    ) -> Self {
        Self { backend, transport, request_factory, config: ClientConfig::default() }
    }

    /// Production setup: reqwest transport and base URL taken from `config`.
    pub fn from_config(backend: B, config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::from_config(&config)?;
        let request_factory = DefaultRequestFactory::new(config.base_url.clone());

        Ok(Self {
            backend,
            transport: Arc::new(transport),
            request_factory: Arc::new(request_factory),
            config,
        })
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn fetch_mapped(&self, kind: QueryKind, query: &WeatherQuery) -> Result<MappedWeather> {
        let query_string = self.backend.query_string(kind, query)?;
        let raw = self.raw_response(&query_string).await?;

        let units = query.units.or(self.config.default_units);
        self.backend
            .map_raw_data(query.latitude, query.longitude, &raw, kind.weather_kind(), units)
    }

    async fn raw_response(&self, query_string: &str) -> Result<RawPayload> {
        let request = self.request_factory.create(HttpMethod::Get, query_string);
        let body = self.parsed_response(&request).await?;

        let raw: RawPayload = serde_json::from_str(&body)?;
        trace!("{}: decoded {} byte payload", self.backend.name(), body.len());

        Ok(raw)
    }

    async fn parsed_response(&self, request: &HttpRequest) -> Result<String> {
        debug!("{}: {} {}", self.backend.name(), request.method, request.url);

        let response = self.transport.send(request).await?;
        debug!("{}: HTTP {} from {}", self.backend.name(), response.status, request.url);

        check_response(response)
    }
}

/// Classify a response by status and body, returning the body if usable.
pub fn check_response(response: HttpResponse) -> Result<String> {
    let HttpResponse { status, body } = response;

    match status {
        401 | 403 => Err(WeatherError::InvalidCredentials { status }),
        429 => Err(WeatherError::QuotaExceeded),
        s if s >= 300 => Err(WeatherError::Server { status, failure: ServerFailure::Status }),
        _ if body.is_empty() => {
            Err(WeatherError::Server { status, failure: ServerFailure::EmptyBody })
        }
        _ => Ok(body),
    }
}

/// Normalize mapper output into a non-empty collection.
fn ensure_collection(mapped: MappedWeather) -> Result<WeatherCollection> {
    let collection = match mapped {
        MappedWeather::Single(weather) => WeatherCollection::from(vec![weather]),
        MappedWeather::Collection(collection) => collection,
    };

    if collection.is_empty() {
        return Err(WeatherError::NoWeatherData);
    }

    Ok(collection)
}

#[async_trait]
impl<B: ProviderBackend> WeatherProvider for HttpProvider<B> {
    async fn get_current_weather(&self, query: &WeatherQuery) -> Result<Weather> {
        match self.fetch_mapped(QueryKind::Current, query).await? {
            MappedWeather::Single(weather) => Ok(weather),
            MappedWeather::Collection(collection) => {
                collection.get_current_weather().cloned().ok_or(WeatherError::NoWeatherData)
            }
        }
    }

    async fn get_forecast(&self, query: &WeatherQuery) -> Result<WeatherCollection> {
        let mapped = self.fetch_mapped(QueryKind::Forecast, query).await?;
        ensure_collection(mapped)
    }

    async fn get_historical(&self, query: &WeatherQuery) -> Result<Weather> {
        match self.fetch_mapped(QueryKind::Historical, query).await? {
            MappedWeather::Single(weather) => Ok(weather),
            MappedWeather::Collection(collection) => query
                .date_time
                .and_then(|dt| collection.get_closest(dt).cloned())
                .ok_or(WeatherError::NoWeatherData),
        }
    }

    async fn get_historical_time_line(&self, query: &WeatherQuery) -> Result<WeatherCollection> {
        let mapped = self.fetch_mapped(QueryKind::HistoricalTimeLine, query).await?;
        ensure_collection(mapped)
    }
}
