use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::health::HealthThresholds;
use crate::metrics::MAX_SAMPLES;

/// Tunables for the sampler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// Frame-rate flush period and metrics collection period.
    pub sample_interval_ms: u64,

    /// Pacing of the frame task, standing in for the host's frame callback.
    pub frame_interval_ms: u64,

    /// Entries retained per series.
    pub max_samples: usize,

    pub thresholds: HealthThresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000,
            frame_interval_ms: 16,
            max_samples: MAX_SAMPLES,
            thresholds: HealthThresholds::default(),
        }
    }
}

impl MonitorConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_interval_ms == 0 {
            bail!("sampleIntervalMs must be greater than zero");
        }
        if self.frame_interval_ms == 0 {
            bail!("frameIntervalMs must be greater than zero");
        }
        if self.max_samples == 0 {
            bail!("maxSamples must be greater than zero");
        }
        self.thresholds
            .validate()
            .context("invalid health thresholds")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_sampling_contract() {
        let config = MonitorConfig::default();
        assert_eq!(config.sample_interval(), Duration::from_secs(1));
        assert_eq!(config.max_samples, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        let config = MonitorConfig {
            sample_interval_ms: 0,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = MonitorConfig {
            max_samples: 0,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: MonitorConfig = serde_json::from_str(r#"{ "frameIntervalMs": 8 }"#).unwrap();
        assert_eq!(config.frame_interval_ms, 8);
        assert_eq!(config.sample_interval_ms, 1000);
    }
}
