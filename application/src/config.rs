//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use service::domain::{GeoPoint, Region};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document store configuration.
    pub store: Store,

    /// Map viewport configuration.
    pub map: Map,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Document store configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Store {
    /// Simulated delay of every round trip to the store.
    #[default(time::Duration::ZERO)]
    #[serde(with = "humantime_serde")]
    pub latency: time::Duration,
}

/// Map viewport configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Map {
    /// Viewport shown while no property is selected.
    pub initial: View,
}

/// Map viewport.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct View {
    /// Latitude of the viewport center.
    #[default(-24.563_874_099_746_05)]
    pub latitude: f64,

    /// Longitude of the viewport center.
    #[default(-54.064_502_952_776_13)]
    pub longitude: f64,

    /// Visible latitude range in degrees.
    #[default(50.0)]
    pub latitude_span: f64,

    /// Visible longitude range in degrees.
    #[default(50.0)]
    pub longitude_span: f64,
}

impl View {
    /// Converts this [`View`] into a [`Region`], if it's a valid one.
    #[must_use]
    pub fn region(&self) -> Option<Region> {
        let Self {
            latitude,
            longitude,
            latitude_span,
            longitude_span,
        } = *self;
        Region::new(
            GeoPoint::new(latitude, longitude)?,
            latitude_span,
            longitude_span,
        )
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    Info,

    /// Designates hazardous situations.
    #[default]
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
