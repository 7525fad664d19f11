use anyhow::{anyhow, Result};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::time::Instant;

use super::{HeapUsage, NavigationTiming, PerformanceHost, ResourceTiming};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Live node count published by the embedding UI.
#[derive(Debug, Clone, Default)]
pub struct NodeCountGauge(Arc<AtomicU64>);

impl NodeCountGauge {
    pub fn set(&self, count: u64) {
        self.0.store(count, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
struct LoadMarks {
    dom_content_loaded_ms: Option<f64>,
    load_ms: Option<f64>,
    first_contentful_paint_ms: Option<f64>,
    resources: Vec<ResourceTiming>,
}

struct ProbeState {
    system: System,
    pid: Pid,
}

/// Instrumentation for a native process.
///
/// Heap usage is the process resident set against total system memory, read
/// through `sysinfo`. Load milestones and resources are whatever the
/// application marks on this host; nothing is exposed until it does.
pub struct ProcessHost {
    origin: Instant,
    probe: Mutex<ProbeState>,
    marks: Mutex<LoadMarks>,
    nodes: NodeCountGauge,
}

impl Default for ProcessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessHost {
    pub fn new() -> Self {
        let mut system = System::new();
        let pid = Pid::from_u32(std::process::id());

        system.refresh_memory();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]));

        Self {
            origin: Instant::now(),
            probe: Mutex::new(ProbeState { system, pid }),
            marks: Mutex::new(LoadMarks::default()),
            nodes: NodeCountGauge::default(),
        }
    }

    /// Handle the UI uses to publish its live node count.
    pub fn node_count_gauge(&self) -> NodeCountGauge {
        self.nodes.clone()
    }

    pub fn mark_dom_content_loaded(&self) {
        let now = self.monotonic_ms();
        self.marks().dom_content_loaded_ms.get_or_insert(now);
    }

    pub fn mark_load_complete(&self) {
        let now = self.monotonic_ms();
        self.marks().load_ms.get_or_insert(now);
    }

    pub fn mark_first_contentful_paint(&self) {
        let now = self.monotonic_ms();
        self.marks().first_contentful_paint_ms.get_or_insert(now);
    }

    pub fn record_resource(&self, url: impl Into<String>, duration_ms: f64, transfer_size_bytes: u64) {
        self.marks().resources.push(ResourceTiming {
            url: url.into(),
            duration_ms,
            transfer_size_bytes,
        });
    }

    fn marks(&self) -> MutexGuard<'_, LoadMarks> {
        match self.marks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PerformanceHost for ProcessHost {
    fn monotonic_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn dom_element_count(&self) -> Result<u64> {
        Ok(self.nodes.get())
    }

    fn heap_usage(&self) -> Result<Option<HeapUsage>> {
        let mut probe = self
            .probe
            .lock()
            .map_err(|_| anyhow!("process probe lock poisoned"))?;
        let pid = probe.pid;
        probe.system.refresh_memory();
        probe.system.refresh_processes(ProcessesToUpdate::Some(&[pid]));

        let limit_bytes = probe.system.total_memory();
        if limit_bytes == 0 {
            return Ok(None);
        }

        let process = probe
            .system
            .process(pid)
            .ok_or_else(|| anyhow!("process {pid} not visible to sysinfo"))?;
        let used_bytes = process.memory();
        log_debug!("process {pid} resident {used_bytes} of {limit_bytes} bytes");

        Ok(Some(HeapUsage {
            used_bytes,
            limit_bytes,
        }))
    }

    fn navigation_timing(&self) -> Result<Option<NavigationTiming>> {
        let marks = self.marks();
        Ok(marks.load_ms.map(|load_ms| NavigationTiming {
            load_ms,
            dom_content_loaded_ms: marks.dom_content_loaded_ms.unwrap_or(load_ms),
        }))
    }

    fn first_contentful_paint_ms(&self) -> Result<Option<f64>> {
        Ok(self.marks().first_contentful_paint_ms)
    }

    fn resource_timings(&self) -> Result<Vec<ResourceTiming>> {
        Ok(self.marks().resources.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_is_absent_until_load_is_marked() {
        let host = ProcessHost::new();
        assert_eq!(host.navigation_timing().unwrap(), None);

        host.mark_dom_content_loaded();
        assert_eq!(host.navigation_timing().unwrap(), None);

        host.mark_load_complete();
        let timing = host.navigation_timing().unwrap().unwrap();
        assert!(timing.dom_content_loaded_ms <= timing.load_ms);
    }

    #[test]
    fn marks_keep_the_first_occurrence() {
        let host = ProcessHost::new();
        host.mark_first_contentful_paint();
        let first = host.first_contentful_paint_ms().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        host.mark_first_contentful_paint();
        assert_eq!(host.first_contentful_paint_ms().unwrap(), first);
    }

    #[test]
    fn node_gauge_feeds_dom_count() {
        let host = ProcessHost::new();
        host.node_count_gauge().set(1234);
        assert_eq!(host.dom_element_count().unwrap(), 1234);
    }

    #[test]
    fn recorded_resources_are_reported() {
        let host = ProcessHost::new();
        host.record_resource("file:///etc/stayx/settings.json", 0.4, 512);
        let resources = host.resource_timings().unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].transfer_size_bytes, 512);
    }

    #[test]
    fn heap_usage_reads_the_current_process() {
        let host = ProcessHost::new();
        if let Ok(Some(heap)) = host.heap_usage() {
            assert!(heap.limit_bytes > 0);
            assert!(heap.pressure_percent().is_some());
        }
    }
}
