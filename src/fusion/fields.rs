//! Field names used for priority lookups and conflict reports

/// Priority group covering every current-conditions field
pub const CURRENT: &str = "current";
/// Priority group covering every forecast-period field
pub const FORECAST: &str = "forecast";
/// Priority key ordering alert sources
pub const ALERTS: &str = "alerts";

pub const TEMPERATURE_F: &str = "temperature_f";
pub const TEMPERATURE_C: &str = "temperature_c";
pub const FEELS_LIKE_F: &str = "feels_like_f";
pub const FEELS_LIKE_C: &str = "feels_like_c";
pub const DEWPOINT_F: &str = "dewpoint_f";
pub const DEWPOINT_C: &str = "dewpoint_c";
pub const HUMIDITY: &str = "humidity";
pub const WIND_SPEED_MPH: &str = "wind_speed_mph";
pub const WIND_SPEED_KPH: &str = "wind_speed_kph";
pub const WIND_DIRECTION: &str = "wind_direction";
pub const WIND_GUST_MPH: &str = "wind_gust_mph";
pub const PRESSURE_IN: &str = "pressure_in";
pub const PRESSURE_MB: &str = "pressure_mb";
pub const VISIBILITY_MILES: &str = "visibility_miles";
pub const UV_INDEX: &str = "uv_index";
pub const CONDITION: &str = "condition";
pub const OBSERVED_AT: &str = "observed_at";

pub const PERIOD_NAME: &str = "name";
pub const PERIOD_START_TIME: &str = "start_time";
pub const PERIOD_END_TIME: &str = "end_time";
pub const TEMPERATURE_HIGH_F: &str = "temperature_high_f";
pub const TEMPERATURE_LOW_F: &str = "temperature_low_f";
pub const SHORT_FORECAST: &str = "short_forecast";
pub const DETAILED_FORECAST: &str = "detailed_forecast";
pub const PERIOD_WIND_SPEED: &str = "wind_speed";
pub const PERIOD_WIND_DIRECTION: &str = "wind_direction";
pub const PRECIPITATION_PROBABILITY: &str = "precipitation_probability";

/// How disagreement on a field is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Fahrenheit temperatures, checked against the temperature threshold
    Temperature,
    /// Other numbers, checked only when a threshold is configured
    Numeric,
    /// Short descriptive text where any difference counts
    Categorical,
    /// Never checked (timestamps, free text, duplicate units)
    Unchecked,
}

/// Classify a field by its base name (the part after any `forecast[i].` prefix)
#[must_use]
pub fn classify(field: &str) -> FieldClass {
    match base_name(field) {
        TEMPERATURE_F | FEELS_LIKE_F | DEWPOINT_F | TEMPERATURE_HIGH_F | TEMPERATURE_LOW_F => {
            FieldClass::Temperature
        }
        // Celsius duplicates of an already-checked reading
        TEMPERATURE_C | FEELS_LIKE_C | DEWPOINT_C => FieldClass::Unchecked,
        // Circular quantity; a max-min spread is meaningless across north
        WIND_DIRECTION => FieldClass::Unchecked,
        CONDITION => FieldClass::Categorical,
        HUMIDITY | WIND_SPEED_MPH | WIND_SPEED_KPH | WIND_GUST_MPH | PRESSURE_IN | PRESSURE_MB
        | VISIBILITY_MILES | UV_INDEX | PRECIPITATION_PROBABILITY => FieldClass::Numeric,
        _ => FieldClass::Unchecked,
    }
}

/// Strip a qualifying prefix such as `forecast[3].`
#[must_use]
pub fn base_name(field: &str) -> &str {
    field.rsplit('.').next().unwrap_or(field)
}

/// Qualified name for a field of the forecast period at `index`
#[must_use]
pub fn forecast_field(index: usize, field: &str) -> String {
    format!("{FORECAST}[{index}].{field}")
}

/// Priority key for a forecast field (`forecast.temperature_high_f`)
#[must_use]
pub fn forecast_priority_key(field: &str) -> String {
    format!("{FORECAST}.{field}")
}
