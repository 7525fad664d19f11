use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

use crate::health::{Dimension, HealthStatus, HealthThresholds};
use crate::host::PerformanceHost;
use crate::metrics::{LoadTimeSnapshot, MonitorSnapshot, ResourceInventory, SampleWindow, SeriesStats};
use crate::mode;

use super::MonitorConfig;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Everything the sampler owns, mutated only under the controller's lock.
#[derive(Debug, Clone)]
pub struct SamplerState {
    running: bool,
    session_id: Option<String>,
    window: SampleWindow,
    load_times: Option<LoadTimeSnapshot>,
    resources: ResourceInventory,
    health: HealthStatus,
    thresholds: HealthThresholds,
    sample_interval_ms: f64,
    frames_since_flush: u32,
    last_flush_ms: f64,
}

impl SamplerState {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            running: false,
            session_id: None,
            window: SampleWindow::with_capacity(config.max_samples),
            load_times: None,
            resources: ResourceInventory::default(),
            health: HealthStatus::default(),
            thresholds: config.thresholds.clone(),
            sample_interval_ms: config.sample_interval_ms as f64,
            frames_since_flush: 0,
            last_flush_ms: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn health(&self) -> HealthStatus {
        self.health
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn has_frame_samples(&self) -> bool {
        !self.window.frame_rate().is_empty()
    }

    pub fn mean_frame_rate(&self) -> f64 {
        mode::mean_frame_rate(self.window.frame_rate().iter().copied())
    }

    /// Clear all collected data and start a new session at `now_ms`.
    pub fn begin(&mut self, session_id: String, now_ms: f64) {
        self.clear();
        self.session_id = Some(session_id);
        self.running = true;
        self.last_flush_ms = now_ms;
    }

    /// Stop accepting samples; collected data stays readable.
    pub fn halt(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) -> Result<()> {
        if self.running {
            bail!("cannot reset while monitoring is active");
        }
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.session_id = None;
        self.window.clear();
        self.load_times = None;
        self.resources = ResourceInventory::default();
        self.health = HealthStatus::default();
        self.frames_since_flush = 0;
        self.last_flush_ms = 0.0;
    }

    /// Count one rendered frame. Returns the flushed fps once per sample interval.
    pub fn on_frame(&mut self, now_ms: f64, captured_at: DateTime<Utc>) -> Option<u32> {
        if !self.running {
            return None;
        }

        self.frames_since_flush = self.frames_since_flush.saturating_add(1);
        let elapsed_ms = now_ms - self.last_flush_ms;
        if elapsed_ms < self.sample_interval_ms {
            return None;
        }

        let fps = (f64::from(self.frames_since_flush) * 1000.0 / elapsed_ms).round() as u32;
        self.window.push_frame_rate(fps, captured_at);
        self.frames_since_flush = 0;
        self.last_flush_ms = now_ms;
        self.reclassify(Dimension::FrameRate, f64::from(fps));

        log_debug!("frame rate flushed: {fps} fps over {elapsed_ms:.1}ms");
        Some(fps)
    }

    /// One periodic metrics tick: heap pressure when exposed, then DOM size.
    pub fn collect_metrics(&mut self, host: &dyn PerformanceHost) {
        if !self.running {
            return;
        }

        match host.heap_usage() {
            Ok(Some(heap)) => match heap.pressure_percent() {
                Some(pressure) => {
                    self.window.push_memory(pressure, heap.used_mb());
                    self.reclassify(Dimension::MemoryPressure, pressure);
                }
                None => log_debug!("heap limit reported as zero, skipping memory sample"),
            },
            Ok(None) => {}
            Err(err) => log_warn!("heap usage read failed: {err:?}"),
        }

        match host.dom_element_count() {
            Ok(count) => {
                self.window.push_dom_element_count(count);
                self.reclassify(Dimension::DomSize, count as f64);
            }
            Err(err) => log_warn!("DOM element count read failed: {err:?}"),
        }
    }

    /// One-shot capture of load milestones and the resource inventory.
    pub fn capture_page_profile(&mut self, host: &dyn PerformanceHost) {
        if !self.running {
            return;
        }

        let first_contentful_paint_ms = match host.first_contentful_paint_ms() {
            Ok(value) => value,
            Err(err) => {
                log_warn!("paint timing read failed: {err:?}");
                None
            }
        };

        match host.navigation_timing() {
            Ok(Some(timing)) => {
                self.load_times = Some(LoadTimeSnapshot {
                    total_load_ms: timing.load_ms,
                    dom_content_loaded_ms: timing.dom_content_loaded_ms,
                    first_contentful_paint_ms,
                });
                self.reclassify(Dimension::LoadTime, timing.load_ms);
            }
            Ok(None) => {}
            Err(err) => log_warn!("navigation timing read failed: {err:?}"),
        }

        match host.resource_timings() {
            Ok(timings) => self.resources = ResourceInventory::from_timings(timings),
            Err(err) => log_warn!("resource timing read failed: {err:?}"),
        }
    }

    fn reclassify(&mut self, dimension: Dimension, value: f64) {
        let level = self.thresholds.classify(dimension, value);
        self.health.record(dimension, level);
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            session_id: self.session_id.clone(),
            running: self.running,
            frame_rate: self.window.frame_rate().to_vec(),
            timestamps: self.window.timestamps().to_vec(),
            memory_pressure: self.window.memory_pressure().to_vec(),
            heap_used_mb: self.window.heap_used_mb().to_vec(),
            dom_element_count: self.window.dom_element_count().to_vec(),
            frame_rate_stats: SeriesStats::from_values(
                self.window.frame_rate().iter().map(|fps| f64::from(*fps)),
            ),
            load_times: self.load_times,
            resources: self.resources.clone(),
            health: self.health,
        }
    }
}
