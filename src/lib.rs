//! `AccessiWeather` - multi-source weather data fusion
//!
//! This library merges normalized weather records from several providers
//! (NWS, Open-Meteo, Visual Crossing) into one record per location, with
//! per-field provenance and notes on where the sources disagree.

pub mod config;
pub mod error;
pub mod fusion;
pub mod logging;
pub mod models;

// Re-export core types for public API
pub use config::AccessiWeatherConfig;
pub use error::FusionError;
pub use fusion::{
    ConflictDetector, DataFusionEngine, FieldConflict, FieldValue, FusedWeatherRecord, SourcePriorityConfig, Sourced,
};
pub use models::{CurrentConditions, ForecastPeriod, Location, SourceId, SourceRecord, WeatherAlert};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, FusionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
