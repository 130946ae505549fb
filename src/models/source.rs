//! Weather data providers and the per-provider snapshot they produce

use super::{CurrentConditions, ForecastPeriod, WeatherAlert};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one weather data provider.
///
/// The derived ordering is used wherever sources are keyed in maps, so
/// iteration over by-source data is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceId {
    #[serde(rename = "nws")]
    Nws,
    #[serde(rename = "openmeteo")]
    OpenMeteo,
    #[serde(rename = "visualcrossing")]
    VisualCrossing,
}

impl SourceId {
    pub const ALL: [SourceId; 3] = [SourceId::Nws, SourceId::OpenMeteo, SourceId::VisualCrossing];

    /// Identifier used in configuration and serialized records
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Nws => "nws",
            SourceId::OpenMeteo => "openmeteo",
            SourceId::VisualCrossing => "visualcrossing",
        }
    }

    /// Human-readable provider name for attribution text
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::Nws => "National Weather Service",
            SourceId::OpenMeteo => "Open-Meteo",
            SourceId::VisualCrossing => "Visual Crossing",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown source identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weather source '{0}'")]
pub struct UnknownSourceError(pub String);

impl FromStr for SourceId {
    type Err = UnknownSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nws" => Ok(SourceId::Nws),
            "openmeteo" | "open-meteo" => Ok(SourceId::OpenMeteo),
            "visualcrossing" | "visual-crossing" => Ok(SourceId::VisualCrossing),
            _ => Err(UnknownSourceError(s.to_string())),
        }
    }
}

/// Normalized weather snapshot from one provider for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source_id: SourceId,
    pub fetched_at: DateTime<Utc>,
    #[serde(default)]
    pub current: Option<CurrentConditions>,
    /// Forecast periods in chronological order
    #[serde(default)]
    pub forecast: Option<Vec<ForecastPeriod>>,
    #[serde(default)]
    pub alerts: Option<Vec<WeatherAlert>>,
}

impl SourceRecord {
    #[must_use]
    pub fn new(source_id: SourceId, fetched_at: DateTime<Utc>) -> Self {
        Self {
            source_id,
            fetched_at,
            current: None,
            forecast: None,
            alerts: None,
        }
    }

    #[must_use]
    pub fn with_current(mut self, current: CurrentConditions) -> Self {
        self.current = Some(current);
        self
    }

    #[must_use]
    pub fn with_forecast(mut self, forecast: Vec<ForecastPeriod>) -> Self {
        self.forecast = Some(forecast);
        self
    }

    #[must_use]
    pub fn with_alerts(mut self, alerts: Vec<WeatherAlert>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    /// Forecast period at `index`, if this source has one there
    #[must_use]
    pub fn forecast_period(&self, index: usize) -> Option<&ForecastPeriod> {
        self.forecast.as_ref().and_then(|periods| periods.get(index))
    }

    /// Number of forecast periods this source provides
    #[must_use]
    pub fn forecast_len(&self) -> usize {
        self.forecast.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_round_trip_through_str() {
        for source in SourceId::ALL {
            assert_eq!(source.as_str().parse::<SourceId>(), Ok(source));
        }
    }

    #[test]
    fn test_source_id_parse_is_lenient_about_case_and_dashes() {
        assert_eq!(" Open-Meteo ".parse::<SourceId>(), Ok(SourceId::OpenMeteo));
        assert_eq!("NWS".parse::<SourceId>(), Ok(SourceId::Nws));
        assert!("weatherapi".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_source_id_serde_names() {
        let json = serde_json::to_string(&SourceId::VisualCrossing).unwrap();
        assert_eq!(json, "\"visualcrossing\"");
        let parsed: SourceId = serde_json::from_str("\"openmeteo\"").unwrap();
        assert_eq!(parsed, SourceId::OpenMeteo);
    }

    #[test]
    fn test_record_deserializes_with_missing_sections() {
        let json = r#"{"source_id": "nws", "fetched_at": "2026-10-19T12:00:00Z"}"#;
        let record: SourceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.source_id, SourceId::Nws);
        assert!(record.current.is_none());
        assert_eq!(record.forecast_len(), 0);
        assert!(record.forecast_period(0).is_none());
    }
}
