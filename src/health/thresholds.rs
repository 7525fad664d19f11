use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::{Dimension, HealthLevel};

/// Which way a metric degrades.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    LowerIsWorse,
    HigherIsWorse,
}

/// Warning and critical boundaries for one dimension.
///
/// Boundaries are strict: a value equal to a threshold stays on the healthier side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionThresholds {
    pub warning: f64,
    pub critical: f64,
    pub direction: Direction,
}

impl DimensionThresholds {
    pub const fn lower_is_worse(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            direction: Direction::LowerIsWorse,
        }
    }

    pub const fn higher_is_worse(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            direction: Direction::HigherIsWorse,
        }
    }

    pub fn level(&self, value: f64) -> HealthLevel {
        match self.direction {
            Direction::LowerIsWorse => {
                if value < self.critical {
                    HealthLevel::Critical
                } else if value < self.warning {
                    HealthLevel::Warning
                } else {
                    HealthLevel::Good
                }
            }
            Direction::HigherIsWorse => {
                if value > self.critical {
                    HealthLevel::Critical
                } else if value > self.warning {
                    HealthLevel::Warning
                } else {
                    HealthLevel::Good
                }
            }
        }
    }

    fn validate(&self, dimension: Dimension) -> Result<()> {
        if !self.warning.is_finite() || !self.critical.is_finite() {
            bail!("{dimension} thresholds must be finite");
        }
        let inverted = match self.direction {
            Direction::LowerIsWorse => self.critical > self.warning,
            Direction::HigherIsWorse => self.critical < self.warning,
        };
        if inverted {
            bail!(
                "{dimension} critical threshold {} is on the healthy side of warning {}",
                self.critical,
                self.warning
            );
        }
        Ok(())
    }
}

/// Threshold table used by [`classify`](super::classify) and the sampler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthThresholds {
    /// Frames per second; below 40 warns, below 30 is critical.
    pub frame_rate: DimensionThresholds,
    /// Used heap as a percentage of the heap limit.
    pub memory_pressure: DimensionThresholds,
    /// Live DOM node count.
    pub dom_size: DimensionThresholds,
    /// Total page load time in milliseconds.
    pub load_time: DimensionThresholds,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            frame_rate: DimensionThresholds::lower_is_worse(40.0, 30.0),
            memory_pressure: DimensionThresholds::higher_is_worse(50.0, 75.0),
            dom_size: DimensionThresholds::higher_is_worse(1000.0, 2000.0),
            load_time: DimensionThresholds::higher_is_worse(2000.0, 3000.0),
        }
    }
}

impl HealthThresholds {
    pub fn for_dimension(&self, dimension: Dimension) -> &DimensionThresholds {
        match dimension {
            Dimension::FrameRate => &self.frame_rate,
            Dimension::MemoryPressure => &self.memory_pressure,
            Dimension::DomSize => &self.dom_size,
            Dimension::LoadTime => &self.load_time,
        }
    }

    pub fn classify(&self, dimension: Dimension, value: f64) -> HealthLevel {
        self.for_dimension(dimension).level(value)
    }

    pub fn validate(&self) -> Result<()> {
        for dimension in Dimension::ALL {
            self.for_dimension(dimension).validate(dimension)?;
        }
        Ok(())
    }
}
