//! Threshold-based health classification.
//!
//! Every dimension is reclassified from its newest value only. `overall` is the
//! worst of the four latest verdicts, so a critical reading followed by a good
//! one is forgotten as soon as the good one lands.

mod thresholds;

pub use thresholds::{Direction, DimensionThresholds, HealthThresholds};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-level health verdict. Ordered by severity.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "camelCase")]
pub enum HealthLevel {
    #[default]
    Good,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    FrameRate,
    MemoryPressure,
    DomSize,
    LoadTime,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::FrameRate,
        Dimension::MemoryPressure,
        Dimension::DomSize,
        Dimension::LoadTime,
    ];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::FrameRate => "frameRate",
            Dimension::MemoryPressure => "memoryPressure",
            Dimension::DomSize => "domSize",
            Dimension::LoadTime => "loadTime",
        };
        f.write_str(name)
    }
}

/// Classify `value` against the default threshold table.
pub fn classify(dimension: Dimension, value: f64) -> HealthLevel {
    HealthThresholds::default().classify(dimension, value)
}

/// Latest per-dimension verdicts plus the derived overall verdict.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub frame_rate: HealthLevel,
    pub memory_pressure: HealthLevel,
    pub dom_size: HealthLevel,
    pub load_time: HealthLevel,
    pub overall: HealthLevel,
}

impl HealthStatus {
    pub fn get(&self, dimension: Dimension) -> HealthLevel {
        match dimension {
            Dimension::FrameRate => self.frame_rate,
            Dimension::MemoryPressure => self.memory_pressure,
            Dimension::DomSize => self.dom_size,
            Dimension::LoadTime => self.load_time,
        }
    }

    /// Overwrite one dimension and recompute `overall`.
    pub fn record(&mut self, dimension: Dimension, level: HealthLevel) {
        match dimension {
            Dimension::FrameRate => self.frame_rate = level,
            Dimension::MemoryPressure => self.memory_pressure = level,
            Dimension::DomSize => self.dom_size = level,
            Dimension::LoadTime => self.load_time = level,
        }
        self.overall = self.worst();
    }

    fn worst(&self) -> HealthLevel {
        Dimension::ALL
            .into_iter()
            .map(|dimension| self.get(dimension))
            .max()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_boundaries_are_exact() {
        assert_eq!(classify(Dimension::FrameRate, 60.0), HealthLevel::Good);
        assert_eq!(classify(Dimension::FrameRate, 40.0), HealthLevel::Good);
        assert_eq!(classify(Dimension::FrameRate, 39.999), HealthLevel::Warning);
        assert_eq!(classify(Dimension::FrameRate, 30.0), HealthLevel::Warning);
        assert_eq!(classify(Dimension::FrameRate, 29.999), HealthLevel::Critical);
        assert_eq!(classify(Dimension::FrameRate, 0.0), HealthLevel::Critical);
    }

    #[test]
    fn memory_pressure_boundaries_are_exact() {
        assert_eq!(classify(Dimension::MemoryPressure, 0.0), HealthLevel::Good);
        assert_eq!(classify(Dimension::MemoryPressure, 50.0), HealthLevel::Good);
        assert_eq!(classify(Dimension::MemoryPressure, 50.001), HealthLevel::Warning);
        assert_eq!(classify(Dimension::MemoryPressure, 75.0), HealthLevel::Warning);
        assert_eq!(classify(Dimension::MemoryPressure, 75.001), HealthLevel::Critical);
        assert_eq!(classify(Dimension::MemoryPressure, 100.0), HealthLevel::Critical);
    }

    #[test]
    fn dom_size_boundaries_are_exact() {
        assert_eq!(classify(Dimension::DomSize, 1000.0), HealthLevel::Good);
        assert_eq!(classify(Dimension::DomSize, 1001.0), HealthLevel::Warning);
        assert_eq!(classify(Dimension::DomSize, 2000.0), HealthLevel::Warning);
        assert_eq!(classify(Dimension::DomSize, 2001.0), HealthLevel::Critical);
    }

    #[test]
    fn load_time_boundaries_are_exact() {
        assert_eq!(classify(Dimension::LoadTime, 2000.0), HealthLevel::Good);
        assert_eq!(classify(Dimension::LoadTime, 2000.5), HealthLevel::Warning);
        assert_eq!(classify(Dimension::LoadTime, 3000.0), HealthLevel::Warning);
        assert_eq!(classify(Dimension::LoadTime, 3000.5), HealthLevel::Critical);
    }

    #[test]
    fn overall_is_the_worst_latest_verdict() {
        let mut status = HealthStatus::default();
        status.record(Dimension::MemoryPressure, HealthLevel::Warning);
        assert_eq!(status.overall, HealthLevel::Warning);

        status.record(Dimension::FrameRate, HealthLevel::Critical);
        assert_eq!(status.overall, HealthLevel::Critical);

        status.record(Dimension::MemoryPressure, HealthLevel::Good);
        assert_eq!(status.overall, HealthLevel::Critical);
    }

    #[test]
    fn superseded_critical_reading_is_forgotten() {
        let mut status = HealthStatus::default();
        status.record(Dimension::FrameRate, HealthLevel::Critical);
        status.record(Dimension::FrameRate, HealthLevel::Good);
        assert_eq!(status.overall, HealthLevel::Good);
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let mut status = HealthStatus::default();
        status.record(Dimension::DomSize, HealthLevel::Critical);
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["domSize"], "critical");
        assert_eq!(json["overall"], "critical");
        assert_eq!(json["frameRate"], "good");
    }
}
