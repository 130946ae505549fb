//! Alert union across sources
//!
//! Alerts are never dropped for priority reasons. Every source's alerts are
//! merged into one list, collapsing copies of the same warning reported by
//! more than one provider.

use crate::models::{SourceId, SourceRecord, WeatherAlert};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Minimum share of the shorter window two alerts must overlap to be the same alert
pub const DUPLICATE_OVERLAP_RATIO: f64 = 0.5;

/// An alert after deduplication, with every source that reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedAlert {
    pub alert: WeatherAlert,
    /// Reporting sources, highest priority first
    pub sources: Vec<SourceId>,
}

impl FusedAlert {
    fn absorb(&mut self, source: SourceId, other: &WeatherAlert) {
        self.alert.severity = self.alert.severity.max(other.severity);

        for area in &other.areas {
            let known = self.alert.areas.iter().any(|a| normalize(a) == normalize(area));
            if !known {
                self.alert.areas.push(area.clone());
            }
        }

        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Fraction of the shorter window covered by the intersection of both windows
fn overlap_ratio(a: (DateTime<Utc>, DateTime<Utc>), b: (DateTime<Utc>, DateTime<Utc>)) -> f64 {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    if end < start {
        return 0.0;
    }

    let overlap = (end - start).num_seconds() as f64;
    let shorter = (a.1 - a.0).min(b.1 - b.0).num_seconds() as f64;
    if shorter <= 0.0 {
        // An instantaneous window inside the other one
        return 1.0;
    }
    overlap / shorter
}

fn areas_compatible(a: &WeatherAlert, b: &WeatherAlert) -> bool {
    if a.areas.is_empty() || b.areas.is_empty() {
        return true;
    }
    let left: BTreeSet<String> = a.areas.iter().map(|s| normalize(s)).collect();
    b.areas.iter().any(|area| left.contains(&normalize(area)))
}

/// Whether two alerts describe the same warning.
///
/// Provider ids are not unique across providers, so a shared id only counts
/// when the event matches too.
#[must_use]
pub fn is_duplicate(a: &WeatherAlert, b: &WeatherAlert) -> bool {
    if normalize(&a.event) != normalize(&b.event) {
        return false;
    }
    if !a.id.is_empty() && a.id == b.id {
        return true;
    }
    if !areas_compatible(a, b) {
        return false;
    }

    match (a.window(), b.window()) {
        (Some(wa), Some(wb)) => overlap_ratio(wa, wb) > DUPLICATE_OVERLAP_RATIO,
        // Without both windows only an identical headline is trusted
        _ => match (&a.headline, &b.headline) {
            (Some(ha), Some(hb)) => normalize(ha) == normalize(hb),
            _ => false,
        },
    }
}

/// Union the alerts of every record.
///
/// Sources are visited in `priority` order, then any remaining sources in
/// their natural order, so the surviving copy of a duplicated alert is the
/// one from the most preferred source. An alert is only merged into an entry
/// no other alert from its own source has reached yet.
#[must_use]
pub fn merge_alerts(records: &BTreeMap<SourceId, &SourceRecord>, priority: &[SourceId]) -> Vec<FusedAlert> {
    let mut order: Vec<SourceId> = priority.iter().copied().filter(|s| records.contains_key(s)).collect();
    order.extend(records.keys().copied().filter(|s| !priority.contains(s)));

    let mut merged: Vec<FusedAlert> = Vec::new();

    for source in order {
        let Some(alerts) = records.get(&source).and_then(|r| r.alerts.as_ref()) else {
            continue;
        };

        for alert in alerts {
            let duplicate = merged
                .iter_mut()
                .find(|existing| !existing.sources.contains(&source) && is_duplicate(&existing.alert, alert));
            match duplicate {
                Some(existing) => {
                    debug!("Merging {} alert '{}' into existing entry", source, alert.event);
                    existing.absorb(source, alert);
                }
                None => merged.push(FusedAlert {
                    alert: alert.clone(),
                    sources: vec![source],
                }),
            }
        }
    }

    merged
}
