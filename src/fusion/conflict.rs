//! Cross-source disagreement detection
//!
//! Numeric fields conflict when the spread between the highest and lowest
//! reported value exceeds the field's threshold. The spread is taken over all
//! reporting sources, so a single outlier among otherwise close readings is
//! still caught. Categorical fields conflict on any difference after trimming
//! and lowercasing.

use super::fields::{self, FieldClass};
use super::priority::SourcePriorityConfig;
use crate::models::SourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A field value in the form conflict detection compares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    fn normalized_text(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.trim().to_lowercase(),
        }
    }
}

/// Values that can take part in conflict detection.
///
/// Types with no meaningful comparison (timestamps) return `None` and are
/// never reported as conflicting.
pub trait Comparable {
    fn to_field_value(&self) -> Option<FieldValue>;
}

impl Comparable for f64 {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Number(*self))
    }
}

impl Comparable for u16 {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Number(f64::from(*self)))
    }
}

impl Comparable for String {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Text(self.clone()))
    }
}

impl Comparable for DateTime<Utc> {
    fn to_field_value(&self) -> Option<FieldValue> {
        None
    }
}

/// A disagreement between sources on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConflict {
    /// Field name, qualified for forecast periods (`forecast[1].temperature_high_f`)
    pub field: String,
    /// Every non-null value reported, by source
    pub values: BTreeMap<SourceId, FieldValue>,
    /// Source whose value was selected for display, if any was
    pub chosen_source: Option<SourceId>,
    /// Max-min spread for numeric fields; `None` for categorical ones
    pub delta: Option<f64>,
}

impl FieldConflict {
    /// Value reported by `source`
    #[must_use]
    pub fn value_from(&self, source: SourceId) -> Option<&FieldValue> {
        self.values.get(&source)
    }

    /// Sources other than the chosen one, with their values
    pub fn dissenting(&self) -> impl Iterator<Item = (SourceId, &FieldValue)> {
        let chosen = self.chosen_source;
        self.values
            .iter()
            .filter(move |(source, _)| Some(**source) != chosen)
            .map(|(source, value)| (*source, value))
    }
}

/// Judges whether sources disagree enough on a field to surface it
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictDetector {
    temperature_threshold: f64,
    numeric_thresholds: BTreeMap<String, f64>,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::from_config(&SourcePriorityConfig::default())
    }
}

impl ConflictDetector {
    /// Detector with only a temperature threshold; other numeric fields are unchecked
    #[must_use]
    pub fn new(temperature_threshold: f64) -> Self {
        Self {
            temperature_threshold,
            numeric_thresholds: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &SourcePriorityConfig) -> Self {
        Self {
            temperature_threshold: config.temperature_conflict_threshold,
            numeric_thresholds: config.field_conflict_thresholds.clone(),
        }
    }

    /// Add or replace the threshold for a numeric field
    #[must_use]
    pub fn with_threshold(mut self, field: impl Into<String>, threshold: f64) -> Self {
        self.numeric_thresholds.insert(field.into(), threshold);
        self
    }

    /// Check `values_by_source` (nulls already excluded) for disagreement.
    ///
    /// Returns `None` when fewer than two sources report the field, when the
    /// field is not checked, or when the values agree within tolerance. The
    /// returned conflict has no `chosen_source`; the caller knows which
    /// source won selection.
    #[must_use]
    pub fn detect(&self, field_name: &str, values_by_source: &BTreeMap<SourceId, FieldValue>) -> Option<FieldConflict> {
        if values_by_source.len() < 2 {
            return None;
        }

        match fields::classify(field_name) {
            FieldClass::Temperature => self.detect_numeric(field_name, values_by_source, self.temperature_threshold),
            FieldClass::Numeric => {
                let threshold = self.numeric_thresholds.get(fields::base_name(field_name))?;
                self.detect_numeric(field_name, values_by_source, *threshold)
            }
            FieldClass::Categorical => Self::detect_categorical(field_name, values_by_source),
            FieldClass::Unchecked => None,
        }
    }

    fn detect_numeric(
        &self,
        field_name: &str,
        values_by_source: &BTreeMap<SourceId, FieldValue>,
        threshold: f64,
    ) -> Option<FieldConflict> {
        let numbers: Option<Vec<f64>> = values_by_source.values().map(FieldValue::as_number).collect();
        let Some(numbers) = numbers else {
            debug!("Skipping conflict check for {}: mixed value types", field_name);
            return None;
        };

        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let delta = max - min;

        if delta > threshold {
            debug!("Conflict on {}: spread {:.2} exceeds {:.2}", field_name, delta, threshold);
            Some(FieldConflict {
                field: field_name.to_string(),
                values: values_by_source.clone(),
                chosen_source: None,
                delta: Some(delta),
            })
        } else {
            None
        }
    }

    fn detect_categorical(
        field_name: &str,
        values_by_source: &BTreeMap<SourceId, FieldValue>,
    ) -> Option<FieldConflict> {
        let distinct: BTreeSet<String> = values_by_source.values().map(FieldValue::normalized_text).collect();

        if distinct.len() > 1 {
            debug!("Conflict on {}: {} distinct values", field_name, distinct.len());
            Some(FieldConflict {
                field: field_name.to_string(),
                values: values_by_source.clone(),
                chosen_source: None,
                delta: None,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(pairs: &[(SourceId, f64)]) -> BTreeMap<SourceId, FieldValue> {
        pairs.iter().map(|(s, v)| (*s, FieldValue::Number(*v))).collect()
    }

    fn texts(pairs: &[(SourceId, &str)]) -> BTreeMap<SourceId, FieldValue> {
        pairs.iter().map(|(s, v)| (*s, FieldValue::Text((*v).to_string()))).collect()
    }

    #[test]
    fn test_temperature_over_threshold_conflicts() {
        let detector = ConflictDetector::new(5.0);
        let values = numbers(&[(SourceId::Nws, 70.0), (SourceId::OpenMeteo, 76.0)]);

        let conflict = detector.detect("temperature_f", &values).unwrap();
        assert_eq!(conflict.field, "temperature_f");
        assert_eq!(conflict.delta, Some(6.0));
        assert_eq!(conflict.values.len(), 2);
        assert!(conflict.chosen_source.is_none());
    }

    #[test]
    fn test_temperature_within_threshold_does_not_conflict() {
        let detector = ConflictDetector::new(5.0);
        let values = numbers(&[(SourceId::Nws, 70.0), (SourceId::OpenMeteo, 73.0)]);
        assert!(detector.detect("temperature_f", &values).is_none());
    }

    #[test]
    fn test_spread_equal_to_threshold_is_not_a_conflict() {
        let detector = ConflictDetector::new(5.0);
        let values = numbers(&[(SourceId::Nws, 70.0), (SourceId::OpenMeteo, 75.0)]);
        assert!(detector.detect("temperature_f", &values).is_none());
    }

    #[test]
    fn test_single_source_is_not_applicable() {
        let detector = ConflictDetector::new(0.0);
        let values = numbers(&[(SourceId::Nws, 70.0)]);
        assert!(detector.detect("temperature_f", &values).is_none());
        assert!(detector.detect("temperature_f", &BTreeMap::new()).is_none());
    }

    #[test]
    fn test_outlier_drives_spread() {
        let detector = ConflictDetector::new(5.0);
        let values = numbers(&[
            (SourceId::Nws, 70.0),
            (SourceId::OpenMeteo, 71.0),
            (SourceId::VisualCrossing, 79.0),
        ]);
        let conflict = detector.detect("feels_like_f", &values).unwrap();
        assert_eq!(conflict.delta, Some(9.0));
    }

    #[test]
    fn test_numeric_field_uses_its_own_threshold() {
        let detector = ConflictDetector::new(5.0).with_threshold("humidity", 20.0);
        let close = numbers(&[(SourceId::Nws, 50.0), (SourceId::OpenMeteo, 65.0)]);
        assert!(detector.detect("humidity", &close).is_none());

        let far = numbers(&[(SourceId::Nws, 40.0), (SourceId::OpenMeteo, 65.0)]);
        assert_eq!(detector.detect("humidity", &far).unwrap().delta, Some(25.0));
    }

    #[test]
    fn test_numeric_field_without_threshold_is_unchecked() {
        let detector = ConflictDetector::new(5.0);
        let values = numbers(&[(SourceId::Nws, 1.0), (SourceId::OpenMeteo, 11.0)]);
        assert!(detector.detect("uv_index", &values).is_none());
    }

    #[test]
    fn test_default_detector_uses_config_thresholds() {
        let detector = ConflictDetector::default();
        let values = numbers(&[(SourceId::Nws, 29.9), (SourceId::VisualCrossing, 30.5)]);
        assert!(detector.detect("pressure_in", &values).is_some());
    }

    #[test]
    fn test_categorical_normalizes_case_and_whitespace() {
        let detector = ConflictDetector::new(5.0);
        let same = texts(&[(SourceId::Nws, "Partly Cloudy"), (SourceId::OpenMeteo, "  partly cloudy ")]);
        assert!(detector.detect("condition", &same).is_none());

        let different = texts(&[(SourceId::Nws, "Sunny"), (SourceId::OpenMeteo, "Overcast")]);
        let conflict = detector.detect("condition", &different).unwrap();
        assert!(conflict.delta.is_none());
    }

    #[test]
    fn test_unchecked_fields_never_conflict() {
        let detector = ConflictDetector::new(0.0);
        let values = numbers(&[(SourceId::Nws, 10.0), (SourceId::OpenMeteo, 350.0)]);
        assert!(detector.detect("wind_direction", &values).is_none());
        assert!(detector.detect("temperature_c", &values).is_none());
    }

    #[test]
    fn test_dissenting_excludes_chosen_source() {
        let detector = ConflictDetector::new(5.0);
        let values = numbers(&[(SourceId::Nws, 75.0), (SourceId::OpenMeteo, 69.0)]);
        let mut conflict = detector.detect("temperature_f", &values).unwrap();
        conflict.chosen_source = Some(SourceId::Nws);

        let dissent: Vec<_> = conflict.dissenting().collect();
        assert_eq!(dissent, vec![(SourceId::OpenMeteo, &FieldValue::Number(69.0))]);
        assert_eq!(conflict.value_from(SourceId::Nws), Some(&FieldValue::Number(75.0)));
    }
}
