//! Forecast period model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One forecast period (a day, or a day/night half as NWS reports them)
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ForecastPeriod {
    /// Period label (e.g., "Tonight", "Saturday")
    pub name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// High temperature in Fahrenheit
    pub temperature_high_f: Option<f64>,
    /// Low temperature in Fahrenheit
    pub temperature_low_f: Option<f64>,
    pub short_forecast: Option<String>,
    pub detailed_forecast: Option<String>,
    /// Wind description as the provider reports it (e.g., "5 to 10 mph")
    pub wind_speed: Option<String>,
    /// Wind direction as the provider reports it (e.g., "SW")
    pub wind_direction: Option<String>,
    /// Chance of precipitation percentage (0-100)
    pub precipitation_probability: Option<f64>,
}

impl ForecastPeriod {
    /// Create a named period with no values yet
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
