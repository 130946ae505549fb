//! Current conditions snapshot as reported by a single provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current weather conditions.
///
/// Every field is independently optional. A provider that does not report a
/// value leaves it `None`; nothing downstream substitutes zero.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CurrentConditions {
    /// Air temperature in Fahrenheit
    pub temperature_f: Option<f64>,
    /// Air temperature in Celsius
    pub temperature_c: Option<f64>,
    /// Apparent temperature in Fahrenheit
    pub feels_like_f: Option<f64>,
    /// Apparent temperature in Celsius
    pub feels_like_c: Option<f64>,
    /// Dewpoint in Fahrenheit
    pub dewpoint_f: Option<f64>,
    /// Dewpoint in Celsius
    pub dewpoint_c: Option<f64>,
    /// Relative humidity percentage (0-100)
    pub humidity: Option<f64>,
    /// Wind speed in mph
    pub wind_speed_mph: Option<f64>,
    /// Wind speed in km/h
    pub wind_speed_kph: Option<f64>,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: Option<u16>,
    /// Wind gust speed in mph
    pub wind_gust_mph: Option<f64>,
    /// Atmospheric pressure in inches of mercury
    pub pressure_in: Option<f64>,
    /// Atmospheric pressure in millibars
    pub pressure_mb: Option<f64>,
    /// Visibility in miles
    pub visibility_miles: Option<f64>,
    pub uv_index: Option<f64>,
    /// Human-readable description of weather conditions
    pub condition: Option<String>,
    /// When the provider observed these conditions
    pub observed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let json = r#"{"temperature_f": 71.5, "condition": "Sunny"}"#;
        let current: CurrentConditions = serde_json::from_str(json).unwrap();
        assert_eq!(current.temperature_f, Some(71.5));
        assert_eq!(current.condition.as_deref(), Some("Sunny"));
        assert_eq!(current.humidity, None);
        assert_eq!(current.wind_direction, None);
    }

    #[test]
    fn test_explicit_null_is_absent_not_zero() {
        let json = r#"{"temperature_f": null, "humidity": null}"#;
        let current: CurrentConditions = serde_json::from_str(json).unwrap();
        assert_eq!(current, CurrentConditions::default());
    }
}
