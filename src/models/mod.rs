//! Data models for the AccessiWeather fusion core
//!
//! This module contains the normalized per-provider records organized by concern:
//! - Location: the place being queried
//! - Source: provider identifiers and the per-provider `SourceRecord`
//! - Weather: current conditions snapshot
//! - Forecast: forecast periods
//! - Alert: active weather alerts

pub mod alert;
pub mod forecast;
pub mod location;
pub mod source;
pub mod weather;

// Re-export all public types for convenient access
pub use alert::{AlertSeverity, WeatherAlert};
pub use forecast::ForecastPeriod;
pub use location::Location;
pub use source::{SourceId, SourceRecord, UnknownSourceError};
pub use weather::CurrentConditions;
