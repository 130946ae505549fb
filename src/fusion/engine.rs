//! Data fusion engine
//!
//! Merges the per-provider records for one location into a single weather
//! record. Each field is taken from the first source in its priority order
//! that reports it; disagreement between sources is detected independently of
//! that choice and attached as [`FieldConflict`] entries. Alerts are unioned
//! rather than picked.
//!
//! The engine holds no state. The same inputs always yield the same output.

use super::alerts::{self, FusedAlert};
use super::conflict::{Comparable, ConflictDetector, FieldConflict, FieldValue};
use super::fields;
use super::priority::SourcePriorityConfig;
use crate::models::{CurrentConditions, ForecastPeriod, Location, SourceId, SourceRecord};
use crate::{FusionError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, trace};

/// A fused value and the source it was drawn from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: SourceId,
}

impl<T> Sourced<T> {
    #[must_use]
    pub fn new(value: T, source: SourceId) -> Self {
        Self { value, source }
    }
}

/// Current conditions after fusion; each field carries its provenance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusedCurrentConditions {
    pub temperature_f: Option<Sourced<f64>>,
    pub temperature_c: Option<Sourced<f64>>,
    pub feels_like_f: Option<Sourced<f64>>,
    pub feels_like_c: Option<Sourced<f64>>,
    pub dewpoint_f: Option<Sourced<f64>>,
    pub dewpoint_c: Option<Sourced<f64>>,
    pub humidity: Option<Sourced<f64>>,
    pub wind_speed_mph: Option<Sourced<f64>>,
    pub wind_speed_kph: Option<Sourced<f64>>,
    pub wind_direction: Option<Sourced<u16>>,
    pub wind_gust_mph: Option<Sourced<f64>>,
    pub pressure_in: Option<Sourced<f64>>,
    pub pressure_mb: Option<Sourced<f64>>,
    pub visibility_miles: Option<Sourced<f64>>,
    pub uv_index: Option<Sourced<f64>>,
    pub condition: Option<Sourced<String>>,
    pub observed_at: Option<Sourced<DateTime<Utc>>>,
}

fn source_of<T>(field: &Option<Sourced<T>>) -> Option<SourceId> {
    field.as_ref().map(|s| s.source)
}

impl FusedCurrentConditions {
    /// Provenance of every field, in declaration order
    #[must_use]
    pub fn provenance(&self) -> Vec<(&'static str, Option<SourceId>)> {
        vec![
            (fields::TEMPERATURE_F, source_of(&self.temperature_f)),
            (fields::TEMPERATURE_C, source_of(&self.temperature_c)),
            (fields::FEELS_LIKE_F, source_of(&self.feels_like_f)),
            (fields::FEELS_LIKE_C, source_of(&self.feels_like_c)),
            (fields::DEWPOINT_F, source_of(&self.dewpoint_f)),
            (fields::DEWPOINT_C, source_of(&self.dewpoint_c)),
            (fields::HUMIDITY, source_of(&self.humidity)),
            (fields::WIND_SPEED_MPH, source_of(&self.wind_speed_mph)),
            (fields::WIND_SPEED_KPH, source_of(&self.wind_speed_kph)),
            (fields::WIND_DIRECTION, source_of(&self.wind_direction)),
            (fields::WIND_GUST_MPH, source_of(&self.wind_gust_mph)),
            (fields::PRESSURE_IN, source_of(&self.pressure_in)),
            (fields::PRESSURE_MB, source_of(&self.pressure_mb)),
            (fields::VISIBILITY_MILES, source_of(&self.visibility_miles)),
            (fields::UV_INDEX, source_of(&self.uv_index)),
            (fields::CONDITION, source_of(&self.condition)),
            (fields::OBSERVED_AT, source_of(&self.observed_at)),
        ]
    }

    /// True when no source supplied any current-conditions value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.provenance().iter().all(|(_, source)| source.is_none())
    }
}

/// One forecast period after fusion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusedForecastPeriod {
    /// Position in the source forecasts this period was aligned on
    pub index: usize,
    pub name: Option<Sourced<String>>,
    pub start_time: Option<Sourced<DateTime<Utc>>>,
    pub end_time: Option<Sourced<DateTime<Utc>>>,
    pub temperature_high_f: Option<Sourced<f64>>,
    pub temperature_low_f: Option<Sourced<f64>>,
    pub short_forecast: Option<Sourced<String>>,
    pub detailed_forecast: Option<Sourced<String>>,
    pub wind_speed: Option<Sourced<String>>,
    pub wind_direction: Option<Sourced<String>>,
    pub precipitation_probability: Option<Sourced<f64>>,
}

impl FusedForecastPeriod {
    fn sources(&self) -> impl Iterator<Item = SourceId> {
        [
            source_of(&self.name),
            source_of(&self.start_time),
            source_of(&self.end_time),
            source_of(&self.temperature_high_f),
            source_of(&self.temperature_low_f),
            source_of(&self.short_forecast),
            source_of(&self.detailed_forecast),
            source_of(&self.wind_speed),
            source_of(&self.wind_direction),
            source_of(&self.precipitation_probability),
        ]
        .into_iter()
        .flatten()
    }
}

/// Result of one fusion call. Built fresh each time and not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedWeatherRecord {
    pub location: Location,
    pub is_us: bool,
    pub current: FusedCurrentConditions,
    pub forecast: Vec<FusedForecastPeriod>,
    pub alerts: Vec<FusedAlert>,
    /// Fields where sources disagreed beyond tolerance
    pub conflicts: Vec<FieldConflict>,
    /// Fetch time of every input record
    pub source_fetched_at: BTreeMap<SourceId, DateTime<Utc>>,
}

impl FusedWeatherRecord {
    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Conflict recorded for `field`, if any
    #[must_use]
    pub fn conflict_for(&self, field: &str) -> Option<&FieldConflict> {
        self.conflicts.iter().find(|c| c.field == field)
    }

    /// Field name to source for every populated current-conditions field
    #[must_use]
    pub fn attribution(&self) -> BTreeMap<&'static str, SourceId> {
        self.current
            .provenance()
            .into_iter()
            .filter_map(|(field, source)| source.map(|s| (field, s)))
            .collect()
    }

    /// Every source that supplied at least one displayed value or alert
    #[must_use]
    pub fn contributing_sources(&self) -> BTreeSet<SourceId> {
        let mut sources: BTreeSet<SourceId> = self.attribution().into_values().collect();
        sources.extend(self.forecast.iter().flat_map(FusedForecastPeriod::sources));
        sources.extend(self.alerts.iter().flat_map(|a| a.sources.iter().copied()));
        sources
    }
}

/// Per-call selection state: the records, the rules, and conflicts found so far
struct FieldSelector<'a> {
    records: BTreeMap<SourceId, &'a SourceRecord>,
    config: &'a SourcePriorityConfig,
    detector: ConflictDetector,
    is_us: bool,
    conflicts: Vec<FieldConflict>,
}

impl<'a> FieldSelector<'a> {
    fn new(records: BTreeMap<SourceId, &'a SourceRecord>, config: &'a SourcePriorityConfig, is_us: bool) -> Self {
        Self {
            records,
            config,
            detector: ConflictDetector::from_config(config),
            is_us,
            conflicts: Vec::new(),
        }
    }

    /// Pick the first non-null value along the priority order, then check all
    /// reported values for disagreement.
    fn select<T, F>(&mut self, field: &str, priority_keys: &[&str], extract: F) -> Option<Sourced<T>>
    where
        T: Comparable + Clone,
        F: Fn(&SourceRecord) -> Option<&T>,
    {
        let config = self.config;
        let priority = config.get_priority_with_fallback(priority_keys, self.is_us);

        let selected = priority.iter().find_map(|source| {
            let record = self.records.get(source).copied()?;
            extract(record).map(|value| Sourced::new(value.clone(), *source))
        });

        let values: BTreeMap<SourceId, FieldValue> = self
            .records
            .iter()
            .filter_map(|(source, record)| {
                extract(*record)
                    .and_then(|value| value.to_field_value())
                    .map(|value| (*source, value))
            })
            .collect();

        if let Some(mut conflict) = self.detector.detect(field, &values) {
            conflict.chosen_source = selected.as_ref().map(|s| s.source);
            self.conflicts.push(conflict);
        }

        match &selected {
            Some(s) => trace!(field, source = %s.source, "Selected value"),
            None => trace!(field, "No source in priority order reports this field"),
        }

        selected
    }

    fn current_field<T, F>(&mut self, field: &str, extract: F) -> Option<Sourced<T>>
    where
        T: Comparable + Clone,
        F: Fn(&CurrentConditions) -> Option<&T>,
    {
        self.select(field, &[field, fields::CURRENT], |record| extract(record.current.as_ref()?))
    }

    fn period_field<T, F>(&mut self, index: usize, field: &str, extract: F) -> Option<Sourced<T>>
    where
        T: Comparable + Clone,
        F: Fn(&ForecastPeriod) -> Option<&T>,
    {
        let qualified = fields::forecast_field(index, field);
        let priority_key = fields::forecast_priority_key(field);
        self.select(&qualified, &[priority_key.as_str(), fields::FORECAST], |record| {
            extract(record.forecast_period(index)?)
        })
    }

    fn fuse_current(&mut self) -> FusedCurrentConditions {
        FusedCurrentConditions {
            temperature_f: self.current_field(fields::TEMPERATURE_F, |c| c.temperature_f.as_ref()),
            temperature_c: self.current_field(fields::TEMPERATURE_C, |c| c.temperature_c.as_ref()),
            feels_like_f: self.current_field(fields::FEELS_LIKE_F, |c| c.feels_like_f.as_ref()),
            feels_like_c: self.current_field(fields::FEELS_LIKE_C, |c| c.feels_like_c.as_ref()),
            dewpoint_f: self.current_field(fields::DEWPOINT_F, |c| c.dewpoint_f.as_ref()),
            dewpoint_c: self.current_field(fields::DEWPOINT_C, |c| c.dewpoint_c.as_ref()),
            humidity: self.current_field(fields::HUMIDITY, |c| c.humidity.as_ref()),
            wind_speed_mph: self.current_field(fields::WIND_SPEED_MPH, |c| c.wind_speed_mph.as_ref()),
            wind_speed_kph: self.current_field(fields::WIND_SPEED_KPH, |c| c.wind_speed_kph.as_ref()),
            wind_direction: self.current_field(fields::WIND_DIRECTION, |c| c.wind_direction.as_ref()),
            wind_gust_mph: self.current_field(fields::WIND_GUST_MPH, |c| c.wind_gust_mph.as_ref()),
            pressure_in: self.current_field(fields::PRESSURE_IN, |c| c.pressure_in.as_ref()),
            pressure_mb: self.current_field(fields::PRESSURE_MB, |c| c.pressure_mb.as_ref()),
            visibility_miles: self.current_field(fields::VISIBILITY_MILES, |c| c.visibility_miles.as_ref()),
            uv_index: self.current_field(fields::UV_INDEX, |c| c.uv_index.as_ref()),
            condition: self.current_field(fields::CONDITION, |c| c.condition.as_ref()),
            observed_at: self.current_field(fields::OBSERVED_AT, |c| c.observed_at.as_ref()),
        }
    }

    fn fuse_period(&mut self, index: usize) -> FusedForecastPeriod {
        FusedForecastPeriod {
            index,
            name: self.period_field(index, fields::PERIOD_NAME, |p| p.name.as_ref()),
            start_time: self.period_field(index, fields::PERIOD_START_TIME, |p| p.start_time.as_ref()),
            end_time: self.period_field(index, fields::PERIOD_END_TIME, |p| p.end_time.as_ref()),
            temperature_high_f: self.period_field(index, fields::TEMPERATURE_HIGH_F, |p| {
                p.temperature_high_f.as_ref()
            }),
            temperature_low_f: self.period_field(index, fields::TEMPERATURE_LOW_F, |p| {
                p.temperature_low_f.as_ref()
            }),
            short_forecast: self.period_field(index, fields::SHORT_FORECAST, |p| p.short_forecast.as_ref()),
            detailed_forecast: self.period_field(index, fields::DETAILED_FORECAST, |p| {
                p.detailed_forecast.as_ref()
            }),
            wind_speed: self.period_field(index, fields::PERIOD_WIND_SPEED, |p| p.wind_speed.as_ref()),
            wind_direction: self.period_field(index, fields::PERIOD_WIND_DIRECTION, |p| {
                p.wind_direction.as_ref()
            }),
            precipitation_probability: self.period_field(index, fields::PRECIPITATION_PROBABILITY, |p| {
                p.precipitation_probability.as_ref()
            }),
        }
    }

    fn fuse_forecast(&mut self) -> Vec<FusedForecastPeriod> {
        let periods = self.records.values().map(|r| r.forecast_len()).max().unwrap_or(0);
        (0..periods).map(|index| self.fuse_period(index)).collect()
    }
}

/// Stateless merger of per-source weather records
#[derive(Debug, Clone, Copy, Default)]
pub struct DataFusionEngine;

impl DataFusionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fuse the records fetched for `location` into one weather record.
    ///
    /// `is_us` is the caller's classification of the location and picks the
    /// default priority list. Fails only when `records` is empty or names the
    /// same source twice; missing fields are simply absent in the output.
    #[tracing::instrument(
        name = "fuse_weather",
        level = "debug",
        skip(self, location, records, config),
        fields(location = %location.name, sources = records.len())
    )]
    pub fn fuse(
        &self,
        location: &Location,
        records: &[SourceRecord],
        config: &SourcePriorityConfig,
        is_us: bool,
    ) -> Result<FusedWeatherRecord> {
        if records.is_empty() {
            return Err(FusionError::validation("cannot fuse an empty set of source records"));
        }

        let mut by_source: BTreeMap<SourceId, &SourceRecord> = BTreeMap::new();
        for record in records {
            if by_source.insert(record.source_id, record).is_some() {
                return Err(FusionError::validation(format!(
                    "more than one record supplied for source '{}'",
                    record.source_id
                )));
            }
        }

        let source_fetched_at = by_source.iter().map(|(source, record)| (*source, record.fetched_at)).collect();

        let mut selector = FieldSelector::new(by_source, config, is_us);
        let current = selector.fuse_current();
        let forecast = selector.fuse_forecast();
        let alerts = alerts::merge_alerts(&selector.records, config.get_priority(fields::ALERTS, is_us));

        info!(
            "Fused {} sources for {}: {} forecast periods, {} alerts, {} conflicts",
            selector.records.len(),
            location.name,
            forecast.len(),
            alerts.len(),
            selector.conflicts.len()
        );

        Ok(FusedWeatherRecord {
            location: location.clone(),
            is_us,
            current,
            forecast,
            alerts,
            conflicts: selector.conflicts,
            source_fetched_at,
        })
    }
}
