use crate::types::{ChartPoint, TimeRange, TimeSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// Axis label for a price point. UTC with English month and weekday names.
pub fn format_label(timestamp_ms: i64, range: TimeRange) -> Option<String> {
    let at: DateTime<Utc> = DateTime::from_timestamp_millis(timestamp_ms)?;
    let pattern = match range {
        TimeRange::Day => "%H:%M",
        TimeRange::Week => "%a",
        TimeRange::Month | TimeRange::Quarter => "%b %d",
        TimeRange::Year | TimeRange::Max => "%b %Y",
    };
    Some(at.format(pattern).to_string())
}

/// One point per price sample, in payload order.
pub fn build(series: &TimeSeries, range: TimeRange) -> Vec<ChartPoint> {
    series
        .prices
        .iter()
        .filter_map(|&(timestamp_ms, value)| match format_label(timestamp_ms, range) {
            Some(label) => Some(ChartPoint { label, value }),
            None => {
                warn!("dropping price point with out-of-range timestamp {}", timestamp_ms);
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStatus {
    Idle,
    Loading,
    Ready,
}

/// Chart currently shown for the selected asset.
#[derive(Debug, Clone, Serialize)]
pub struct ChartState {
    pub asset_id: Option<String>,
    pub range: TimeRange,
    pub status: ChartStatus,
    pub points: Vec<ChartPoint>,
}

impl ChartState {
    pub fn new(range: TimeRange) -> Self {
        Self {
            asset_id: None,
            range,
            status: ChartStatus::Idle,
            points: Vec::new(),
        }
    }

    pub fn is_for(&self, asset_id: &str, range: TimeRange) -> bool {
        self.asset_id.as_deref() == Some(asset_id) && self.range == range
    }

    /// Loaded but nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.status == ChartStatus::Ready && self.points.is_empty()
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.points.iter().map(|p| p.value).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
