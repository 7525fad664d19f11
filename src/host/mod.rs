//! Host instrumentation the sampler reads from.
//!
//! Every read is best-effort: `Ok(None)` means the host does not expose the
//! capability, `Err` means the read failed this time and may succeed next tick.

mod process;
mod scripted;

pub use process::{NodeCountGauge, ProcessHost};
pub use scripted::ScriptedHost;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Used heap against the heap limit, in bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HeapUsage {
    pub used_bytes: u64,
    pub limit_bytes: u64,
}

impl HeapUsage {
    /// Percentage of the limit in use, clamped to 0..=100.
    ///
    /// `None` when the limit is zero.
    pub fn pressure_percent(&self) -> Option<f64> {
        if self.limit_bytes == 0 {
            return None;
        }
        let percent = self.used_bytes as f64 / self.limit_bytes as f64 * 100.0;
        Some(percent.clamp(0.0, 100.0))
    }

    pub fn used_mb(&self) -> f64 {
        self.used_bytes as f64 / BYTES_PER_MB
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTiming {
    pub load_ms: f64,
    pub dom_content_loaded_ms: f64,
}

/// One observed network (or file) resource load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTiming {
    pub url: String,
    pub duration_ms: f64,
    pub transfer_size_bytes: u64,
}

pub trait PerformanceHost: Send + Sync {
    /// Monotonic milliseconds since an arbitrary origin.
    fn monotonic_ms(&self) -> f64;

    fn wall_clock(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn dom_element_count(&self) -> Result<u64>;

    fn heap_usage(&self) -> Result<Option<HeapUsage>>;

    fn navigation_timing(&self) -> Result<Option<NavigationTiming>>;

    fn first_contentful_paint_ms(&self) -> Result<Option<f64>>;

    fn resource_timings(&self) -> Result<Vec<ResourceTiming>>;
}
