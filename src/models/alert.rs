//! Active weather alert model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity, ordered from least to most severe
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    #[default]
    Unknown,
    Minor,
    Moderate,
    Severe,
    Extreme,
}

/// Active weather alert as reported by one provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherAlert {
    /// Provider-assigned identifier
    pub id: String,
    /// Event type (e.g., "Flood Warning")
    pub event: String,
    #[serde(default)]
    pub severity: AlertSeverity,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Affected area names
    #[serde(default)]
    pub areas: Vec<String>,
    #[serde(default)]
    pub onset: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

impl WeatherAlert {
    #[must_use]
    pub fn new(id: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            event: event.into(),
            severity: AlertSeverity::Unknown,
            headline: None,
            description: None,
            areas: Vec::new(),
            onset: None,
            expires: None,
        }
    }

    #[must_use]
    pub fn with_window(mut self, onset: DateTime<Utc>, expires: DateTime<Utc>) -> Self {
        self.onset = Some(onset);
        self.expires = Some(expires);
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: AlertSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.areas = areas.into_iter().map(Into::into).collect();
        self
    }

    /// Effective window, only when both ends are known and ordered
    #[must_use]
    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.onset, self.expires) {
            (Some(onset), Some(expires)) if expires >= onset => Some((onset, expires)),
            _ => None,
        }
    }

    /// Length of the effective window
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.window().map(|(onset, expires)| expires - onset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Extreme > AlertSeverity::Severe);
        assert!(AlertSeverity::Minor > AlertSeverity::Unknown);
    }

    #[test]
    fn test_window_requires_both_ends() {
        let onset = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let alert = WeatherAlert::new("a", "Flood Warning");
        assert!(alert.window().is_none());

        let alert = alert.with_window(onset, onset + Duration::hours(6));
        assert_eq!(alert.duration(), Some(Duration::hours(6)));
    }

    #[test]
    fn test_inverted_window_is_ignored() {
        let onset = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let alert = WeatherAlert::new("a", "Heat Advisory").with_window(onset, onset - Duration::hours(1));
        assert!(alert.window().is_none());
    }
}
