//! Multi-source weather data fusion
//!
//! Given the records fetched from several providers for one location, picks
//! each field from the most preferred source that has it, flags fields where
//! sources disagree, and unions active alerts.

pub mod alerts;
pub mod conflict;
pub mod engine;
pub mod fields;
pub mod priority;

pub use alerts::{FusedAlert, merge_alerts};
pub use conflict::{ConflictDetector, FieldConflict, FieldValue};
pub use engine::{DataFusionEngine, FusedCurrentConditions, FusedForecastPeriod, FusedWeatherRecord, Sourced};
pub use priority::SourcePriorityConfig;

use crate::Result;
use crate::models::{Location, SourceRecord};

/// Fuse `records` with a default engine
pub fn fuse(
    location: &Location,
    records: &[SourceRecord],
    config: &SourcePriorityConfig,
    is_us: bool,
) -> Result<FusedWeatherRecord> {
    DataFusionEngine::new().fuse(location, records, config, is_us)
}
