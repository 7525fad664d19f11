use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::health::HealthStatus;

/// Page load milestones captured once per monitoring session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadTimeSnapshot {
    pub total_load_ms: f64,
    pub dom_content_loaded_ms: f64,
    pub first_contentful_paint_ms: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    Javascript,
    Css,
    Html,
    Image,
    Font,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub url: String,
    pub duration_ms: f64,
    pub transfer_size_bytes: u64,
    pub resource_type: ResourceType,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRollup {
    pub count: usize,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInventory {
    pub entries: Vec<ResourceEntry>,
    pub by_type: BTreeMap<ResourceType, ResourceRollup>,
}

/// Summary of one numeric series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStats {
    pub latest: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStats {
    /// `None` for an empty series.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut latest = 0.0;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
            latest = value;
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            latest,
            mean: sum / count as f64,
            min,
            max,
        })
    }
}

/// Read-only copy of everything the sampler has collected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSnapshot {
    pub session_id: Option<String>,
    pub running: bool,
    pub frame_rate: Vec<u32>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub memory_pressure: Vec<f64>,
    pub heap_used_mb: Vec<f64>,
    pub dom_element_count: Vec<u64>,
    pub frame_rate_stats: Option<SeriesStats>,
    pub load_times: Option<LoadTimeSnapshot>,
    pub resources: ResourceInventory,
    pub health: HealthStatus,
}

impl MonitorSnapshot {
    /// True until the first frame-rate sample lands.
    pub fn is_empty(&self) -> bool {
        self.frame_rate.is_empty()
    }
}
