use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: i64,
    pub value: f64,
}

impl SeriesPoint {
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered `{timestamp, value}` samples for one indicator + parameter key.
/// Timestamps are strictly increasing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSeries {
    points: Vec<SeriesPoint>,
}

impl IndicatorSeries {
    /// Builds a series from arbitrary samples: sorts by time and keeps the last
    /// sample seen for any duplicated timestamp.
    pub fn from_points(points: impl IntoIterator<Item = SeriesPoint>) -> Self {
        let by_time: BTreeMap<i64, f64> = points
            .into_iter()
            .map(|p| (p.timestamp, p.value))
            .collect();
        Self {
            points: by_time
                .into_iter()
                .map(|(timestamp, value)| SeriesPoint { timestamp, value })
                .collect(),
        }
    }

    /// Convenience for parallel timestamp/value slices (extra items are dropped).
    pub fn from_pairs(timestamps: &[i64], values: &[f64]) -> Self {
        Self::from_points(
            timestamps
                .iter()
                .zip(values)
                .map(|(&t, &v)| SeriesPoint::new(t, v)),
        )
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at exactly `timestamp`, if sampled.
    pub fn value_at(&self, timestamp: i64) -> Option<f64> {
        self.points
            .binary_search_by_key(&timestamp, |p| p.timestamp)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Sample whose timestamp is closest to `timestamp`. Ties go to the earlier sample.
    pub fn nearest(&self, timestamp: i64) -> Option<SeriesPoint> {
        if self.points.is_empty() {
            return None;
        }
        match self.points.binary_search_by_key(&timestamp, |p| p.timestamp) {
            Ok(i) => Some(self.points[i]),
            Err(0) => Some(self.points[0]),
            Err(i) if i >= self.points.len() => self.points.last().copied(),
            Err(i) => {
                let before = self.points[i - 1];
                let after = self.points[i];
                if timestamp - before.timestamp <= after.timestamp - timestamp {
                    Some(before)
                } else {
                    Some(after)
                }
            }
        }
    }
}

/// A maximal inclusive span of timestamps over which a condition held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRange {
    pub first_time: i64,
    pub last_time: i64,
}

impl ActiveRange {
    pub const fn new(first_time: i64, last_time: i64) -> Self {
        Self {
            first_time,
            last_time,
        }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.first_time <= timestamp && timestamp <= self.last_time
    }
}

/// Every indicator series delivered with one scan result, keyed by series key
/// (see [`crate::domain::Indicator::series_key`]).
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    series: HashMap<String, IndicatorSeries>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds samples under `key`, merging with anything already stored.
    pub fn merge(&mut self, key: impl Into<String>, incoming: &IndicatorSeries) {
        let key = key.into();
        let merged = match self.series.remove(&key) {
            Some(existing) => IndicatorSeries::from_points(
                existing
                    .points
                    .into_iter()
                    .chain(incoming.points.iter().copied()),
            ),
            None => IndicatorSeries::from_points(incoming.points.iter().copied()),
        };
        self.series.insert(key, merged);
    }

    pub fn insert(&mut self, key: impl Into<String>, series: IndicatorSeries) {
        self.series.insert(key.into(), series);
    }

    pub fn get(&self, key: &str) -> Option<&IndicatorSeries> {
        self.series.get(key)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
