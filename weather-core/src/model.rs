use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Decoded but not yet mapped JSON body of a provider response.
pub type RawPayload = serde_json::Value;

/// Unit system a caller asks the provider to report in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!("Unknown unit system '{s}'. Supported: metric, imperial.")),
        }
    }
}

/// What a caller is asking for. Selects the URL builder on the backend.
#[derive(Debug, Clone)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub date_time: Option<DateTime<Utc>>,
    pub units: Option<Units>,
}

impl WeatherQuery {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, date_time: None, units: None }
    }

    pub fn with_date_time(mut self, date_time: DateTime<Utc>) -> Self {
        self.date_time = Some(date_time);
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }
}

/// Kind of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    #[default]
    Current,
    Forecast,
    Historical,
}

/// The four operations a provider exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Current,
    Forecast,
    Historical,
    HistoricalTimeLine,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Current => "current",
            QueryKind::Forecast => "forecast",
            QueryKind::Historical => "historical",
            QueryKind::HistoricalTimeLine => "historical-timeline",
        }
    }

    /// Reading kind the mapper is asked to produce for this query.
    pub fn weather_kind(&self) -> WeatherKind {
        match self {
            QueryKind::Current => WeatherKind::Current,
            QueryKind::Forecast => WeatherKind::Forecast,
            QueryKind::Historical | QueryKind::HistoricalTimeLine => WeatherKind::Historical,
        }
    }

    pub const fn all() -> &'static [QueryKind] {
        &[
            QueryKind::Current,
            QueryKind::Forecast,
            QueryKind::Historical,
            QueryKind::HistoricalTimeLine,
        ]
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single point-in-time reading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Weather {
    pub latitude: f64,
    pub longitude: f64,
    pub kind: WeatherKind,
    pub utc_date_time: Option<DateTime<Utc>>,
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub precipitation: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub weather_code: Option<i32>,
    pub icon: Option<String>,
    pub units: Option<Units>,
    /// Names of the upstream services the reading was built from.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Weather {
    pub fn new(latitude: f64, longitude: f64, kind: WeatherKind) -> Self {
        Self { latitude, longitude, kind, ..Self::default() }
    }

    pub fn at(mut self, utc_date_time: DateTime<Utc>) -> Self {
        self.utc_date_time = Some(utc_date_time);
        self
    }
}

/// Ordered sequence of readings, as returned by forecast and timeline queries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherCollection {
    items: Vec<Weather>,
}

impl WeatherCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, weather: Weather) {
        self.items.push(weather);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Weather> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Weather] {
        &self.items
    }

    /// The reading nearest in time to `date_time`.
    ///
    /// Readings without a timestamp are ignored. When two readings are equally
    /// far away the earlier one is returned.
    pub fn get_closest(&self, date_time: DateTime<Utc>) -> Option<&Weather> {
        self.items
            .iter()
            .filter_map(|w| w.utc_date_time.map(|ts| (w, ts)))
            .min_by_key(|(_, ts)| ((*ts - date_time).abs(), *ts))
            .map(|(w, _)| w)
    }

    /// The reading the backend tagged as current, if it produced one.
    pub fn get_current_weather(&self) -> Option<&Weather> {
        self.items.iter().find(|w| w.kind == WeatherKind::Current)
    }
}

impl From<Vec<Weather>> for WeatherCollection {
    fn from(items: Vec<Weather>) -> Self {
        Self { items }
    }
}

impl FromIterator<Weather> for WeatherCollection {
    fn from_iter<I: IntoIterator<Item = Weather>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl IntoIterator for WeatherCollection {
    type Item = Weather;
    type IntoIter = std::vec::IntoIter<Weather>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a WeatherCollection {
    type Item = &'a Weather;
    type IntoIter = std::slice::Iter<'a, Weather>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// What a backend's mapper hands back: one reading or many.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedWeather {
    Single(Weather),
    Collection(WeatherCollection),
}

impl From<Weather> for MappedWeather {
    fn from(weather: Weather) -> Self {
        MappedWeather::Single(weather)
    }
}

impl From<WeatherCollection> for MappedWeather {
    fn from(collection: WeatherCollection) -> Self {
        MappedWeather::Collection(collection)
    }
}
