//! Source priority configuration
//!
//! Supplies, for a field and a location class (US or international), the
//! ordered list of sources to try. Serializes to and from JSON; keys missing
//! from the input fall back to the documented defaults, and unknown source
//! identifiers are dropped with a warning.

use crate::models::SourceId;
use crate::{FusionError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Ordered source preferences per location class, with per-field overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSourcePriorityConfig")]
pub struct SourcePriorityConfig {
    /// Order used for US locations
    pub us_default: Vec<SourceId>,
    /// Order used everywhere else
    pub international_default: Vec<SourceId>,
    /// Field (or field group) name to an explicit order for that field only
    pub field_priorities: BTreeMap<String, Vec<SourceId>>,
    /// Temperature spread in °F above which sources are flagged as disagreeing
    pub temperature_conflict_threshold: f64,
    /// Spread thresholds for other numeric fields, keyed by field name
    pub field_conflict_thresholds: BTreeMap<String, f64>,
}

// Default value functions. Each call builds a fresh value so no two configs
// share list storage.
fn default_us_priority() -> Vec<SourceId> {
    vec![SourceId::Nws, SourceId::OpenMeteo, SourceId::VisualCrossing]
}

fn default_international_priority() -> Vec<SourceId> {
    vec![SourceId::OpenMeteo, SourceId::VisualCrossing]
}

fn default_temperature_conflict_threshold() -> f64 {
    5.0
}

fn default_field_conflict_thresholds() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("humidity".to_string(), 20.0),
        ("wind_speed_mph".to_string(), 10.0),
        ("pressure_in".to_string(), 0.3),
    ])
}

fn default_source_names(sources: Vec<SourceId>) -> Vec<String> {
    sources.iter().map(|s| s.as_str().to_string()).collect()
}

/// Wire shape accepted on input; source ids are checked after parsing
#[derive(Deserialize)]
struct RawSourcePriorityConfig {
    #[serde(default = "raw_default_us")]
    us_default: Vec<String>,
    #[serde(default = "raw_default_international")]
    international_default: Vec<String>,
    #[serde(default)]
    field_priorities: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_temperature_conflict_threshold")]
    temperature_conflict_threshold: f64,
    #[serde(default = "default_field_conflict_thresholds")]
    field_conflict_thresholds: BTreeMap<String, f64>,
}

fn raw_default_us() -> Vec<String> {
    default_source_names(default_us_priority())
}

fn raw_default_international() -> Vec<String> {
    default_source_names(default_international_priority())
}

fn known_sources(list_name: &str, names: Vec<String>) -> Vec<SourceId> {
    names
        .into_iter()
        .filter_map(|name| match name.parse::<SourceId>() {
            Ok(source) => Some(source),
            Err(e) => {
                warn!("Dropping entry from {} priority list: {}", list_name, e);
                None
            }
        })
        .collect()
}

impl From<RawSourcePriorityConfig> for SourcePriorityConfig {
    fn from(raw: RawSourcePriorityConfig) -> Self {
        let field_priorities = raw
            .field_priorities
            .into_iter()
            .filter_map(|(field, names)| {
                let sources = known_sources(&field, names);
                if sources.is_empty() {
                    warn!("Ignoring {} priority override with no known sources", field);
                    return None;
                }
                Some((field, sources))
            })
            .collect();

        Self {
            us_default: known_sources("us_default", raw.us_default),
            international_default: known_sources("international_default", raw.international_default),
            field_priorities,
            temperature_conflict_threshold: raw.temperature_conflict_threshold,
            field_conflict_thresholds: raw.field_conflict_thresholds,
        }
    }
}

impl Default for SourcePriorityConfig {
    fn default() -> Self {
        Self {
            us_default: default_us_priority(),
            international_default: default_international_priority(),
            field_priorities: BTreeMap::new(),
            temperature_conflict_threshold: default_temperature_conflict_threshold(),
            field_conflict_thresholds: default_field_conflict_thresholds(),
        }
    }
}

impl SourcePriorityConfig {
    /// Ordered sources to try for `field_name`.
    ///
    /// Returns the override when one exists for the field, otherwise the
    /// default for the location class.
    #[must_use]
    pub fn get_priority(&self, field_name: &str, is_us: bool) -> &[SourceId] {
        self.get_priority_with_fallback(&[field_name], is_us)
    }

    /// Like [`get_priority`](Self::get_priority), but tries several keys in
    /// order (e.g. a specific field, then its group) before the default.
    #[must_use]
    pub fn get_priority_with_fallback(&self, keys: &[&str], is_us: bool) -> &[SourceId] {
        keys.iter()
            .find_map(|key| self.field_priorities.get(*key))
            .map_or_else(|| self.default_priority(is_us), Vec::as_slice)
    }

    /// Location-class default order
    #[must_use]
    pub fn default_priority(&self, is_us: bool) -> &[SourceId] {
        if is_us {
            &self.us_default
        } else {
            &self.international_default
        }
    }

    /// Set an explicit order for one field or field group
    pub fn set_field_priority(&mut self, field_name: impl Into<String>, sources: Vec<SourceId>) {
        self.field_priorities.insert(field_name.into(), sources);
    }

    /// Spread threshold for a non-temperature numeric field, if configured
    #[must_use]
    pub fn conflict_threshold_for(&self, field_name: &str) -> Option<f64> {
        self.field_conflict_thresholds.get(field_name).copied()
    }

    /// Dict form of this configuration
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Build from the dict form; absent keys take their defaults
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check thresholds and list shapes
    pub fn validate(&self) -> Result<()> {
        if !self.temperature_conflict_threshold.is_finite() || self.temperature_conflict_threshold < 0.0 {
            return Err(FusionError::config(format!(
                "temperature_conflict_threshold must be a non-negative number, got {}",
                self.temperature_conflict_threshold
            )));
        }

        for (field, threshold) in &self.field_conflict_thresholds {
            if !threshold.is_finite() || *threshold < 0.0 {
                return Err(FusionError::config(format!(
                    "conflict threshold for '{field}' must be a non-negative number, got {threshold}"
                )));
            }
        }

        if self.us_default.is_empty() {
            return Err(FusionError::config("us_default priority list cannot be empty"));
        }
        if self.international_default.is_empty() {
            return Err(FusionError::config("international_default priority list cannot be empty"));
        }

        Self::check_unique("us_default", &self.us_default)?;
        Self::check_unique("international_default", &self.international_default)?;
        for (field, sources) in &self.field_priorities {
            if sources.is_empty() {
                return Err(FusionError::config(format!("{field} priority list cannot be empty")));
            }
            Self::check_unique(field, sources)?;
        }

        Ok(())
    }

    fn check_unique(list_name: &str, sources: &[SourceId]) -> Result<()> {
        let mut seen = BTreeSet::new();
        for source in sources {
            if !seen.insert(*source) {
                return Err(FusionError::config(format!(
                    "source '{source}' appears more than once in the {list_name} priority list"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_lists() {
        let config = SourcePriorityConfig::default();
        assert_eq!(
            config.get_priority("temperature_f", true),
            [SourceId::Nws, SourceId::OpenMeteo, SourceId::VisualCrossing]
        );
        assert_eq!(
            config.get_priority("temperature_f", false),
            [SourceId::OpenMeteo, SourceId::VisualCrossing]
        );
        assert_eq!(config.temperature_conflict_threshold, 5.0);
    }

    #[test]
    fn test_field_override_only_affects_that_field() {
        let mut config = SourcePriorityConfig::default();
        config.set_field_priority("uv_index", vec![SourceId::VisualCrossing, SourceId::OpenMeteo]);

        assert_eq!(
            config.get_priority("uv_index", true),
            [SourceId::VisualCrossing, SourceId::OpenMeteo]
        );
        assert_eq!(config.get_priority("humidity", true)[0], SourceId::Nws);
    }

    #[test]
    fn test_fallback_keys_try_specific_then_group() {
        let mut config = SourcePriorityConfig::default();
        config.set_field_priority("forecast", vec![SourceId::VisualCrossing]);

        let order = config.get_priority_with_fallback(&["forecast.temperature_high_f", "forecast"], true);
        assert_eq!(order, [SourceId::VisualCrossing]);

        config.set_field_priority("forecast.temperature_high_f", vec![SourceId::OpenMeteo]);
        let order = config.get_priority_with_fallback(&["forecast.temperature_high_f", "forecast"], true);
        assert_eq!(order, [SourceId::OpenMeteo]);
    }

    #[test]
    fn test_default_instances_do_not_share_lists() {
        let mut first = SourcePriorityConfig::default();
        let second = SourcePriorityConfig::default();
        first.us_default.clear();
        assert_eq!(second.us_default.len(), 3);
    }

    #[test]
    fn test_from_value_fills_missing_keys() {
        let config = SourcePriorityConfig::from_value(json!({
            "international_default": ["visualcrossing"]
        }))
        .unwrap();

        assert_eq!(config.us_default, default_us_priority());
        assert_eq!(config.international_default, [SourceId::VisualCrossing]);
        assert!(config.field_priorities.is_empty());
        assert_eq!(config.temperature_conflict_threshold, 5.0);
        assert_eq!(config.conflict_threshold_for("humidity"), Some(20.0));
    }

    #[test]
    fn test_from_value_empty_object_is_default() {
        let config = SourcePriorityConfig::from_value(json!({})).unwrap();
        assert_eq!(config, SourcePriorityConfig::default());
    }

    #[test]
    fn test_unknown_sources_are_dropped() {
        let config = SourcePriorityConfig::from_value(json!({
            "us_default": ["nws", "weatherapi", "openmeteo"],
            "field_priorities": {"condition": ["pirateweather", "visualcrossing"]}
        }))
        .unwrap();

        assert_eq!(config.us_default, [SourceId::Nws, SourceId::OpenMeteo]);
        assert_eq!(config.field_priorities["condition"], [SourceId::VisualCrossing]);
    }

    #[test]
    fn test_override_with_only_unknown_sources_falls_back_to_default() {
        let config = SourcePriorityConfig::from_json(r#"{"field_priorities": {"temperature_f": ["weatherapi"]}}"#)
            .unwrap();

        assert!(!config.field_priorities.contains_key("temperature_f"));
        assert_eq!(config.get_priority("temperature_f", true), default_us_priority());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_override() {
        let mut config = SourcePriorityConfig::default();
        config.set_field_priority("condition", Vec::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("condition priority list cannot be empty"));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let result = SourcePriorityConfig::from_value(json!(42));
        assert!(matches!(result, Err(FusionError::Serialization { .. })));
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SourcePriorityConfig::default();
        config.set_field_priority("condition", vec![SourceId::OpenMeteo, SourceId::Nws]);
        config.temperature_conflict_threshold = 3.5;
        config.field_conflict_thresholds.insert("uv_index".to_string(), 2.0);

        let restored = SourcePriorityConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(restored, config);

        let restored = SourcePriorityConfig::from_value(config.to_value().unwrap()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_to_value_uses_source_names() {
        let value = SourcePriorityConfig::default().to_value().unwrap();
        assert_eq!(value["us_default"], json!(["nws", "openmeteo", "visualcrossing"]));
        assert_eq!(value["international_default"], json!(["openmeteo", "visualcrossing"]));
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = SourcePriorityConfig::default();
        config.temperature_conflict_threshold = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature_conflict_threshold"));

        config.temperature_conflict_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_empty_defaults() {
        let mut config = SourcePriorityConfig::default();
        config.set_field_priority("humidity", vec![SourceId::Nws, SourceId::Nws]);
        assert!(config.validate().unwrap_err().to_string().contains("more than once"));

        let mut config = SourcePriorityConfig::default();
        config.international_default.clear();
        assert!(config.validate().is_err());

        assert!(SourcePriorityConfig::default().validate().is_ok());
    }
}
