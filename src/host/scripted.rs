use anyhow::{anyhow, Result};
use std::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use super::{HeapUsage, NavigationTiming, PerformanceHost, ResourceTiming};

#[derive(Debug, Clone, Copy)]
enum Reading<T> {
    Value(T),
    Unavailable,
    Failing,
}

#[derive(Debug)]
struct ScriptedReadings {
    dom_element_count: Reading<u64>,
    heap: Reading<HeapUsage>,
    navigation: Reading<NavigationTiming>,
    first_paint_ms: Option<f64>,
    resources: Vec<ResourceTiming>,
    heap_reads: u64,
    dom_reads: u64,
}

/// Host whose readings are set by the caller.
///
/// The clock follows `tokio::time`, so paused-time tests advance it
/// deterministically.
#[derive(Debug)]
pub struct ScriptedHost {
    origin: Instant,
    readings: Mutex<ScriptedReadings>,
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedHost {
    /// Empty page: zero DOM nodes, no heap introspection, no navigation timing.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            readings: Mutex::new(ScriptedReadings {
                dom_element_count: Reading::Value(0),
                heap: Reading::Unavailable,
                navigation: Reading::Unavailable,
                first_paint_ms: None,
                resources: Vec::new(),
                heap_reads: 0,
                dom_reads: 0,
            }),
        }
    }

    pub fn with_dom_element_count(self, count: u64) -> Self {
        self.set_dom_element_count(count);
        self
    }

    pub fn with_failing_dom(self) -> Self {
        self.lock().dom_element_count = Reading::Failing;
        self
    }

    pub fn with_heap_usage(self, heap: HeapUsage) -> Self {
        self.set_heap_usage(heap);
        self
    }

    pub fn with_failing_heap(self) -> Self {
        self.lock().heap = Reading::Failing;
        self
    }

    pub fn with_navigation(self, timing: NavigationTiming) -> Self {
        self.lock().navigation = Reading::Value(timing);
        self
    }

    pub fn with_failing_navigation(self) -> Self {
        self.lock().navigation = Reading::Failing;
        self
    }

    pub fn with_first_paint(self, first_paint_ms: f64) -> Self {
        self.lock().first_paint_ms = Some(first_paint_ms);
        self
    }

    pub fn with_resource(self, timing: ResourceTiming) -> Self {
        self.lock().resources.push(timing);
        self
    }

    pub fn set_dom_element_count(&self, count: u64) {
        self.lock().dom_element_count = Reading::Value(count);
    }

    pub fn set_heap_usage(&self, heap: HeapUsage) {
        self.lock().heap = Reading::Value(heap);
    }

    /// Number of heap reads attempted, failed ones included.
    pub fn heap_reads(&self) -> u64 {
        self.lock().heap_reads
    }

    pub fn dom_reads(&self) -> u64 {
        self.lock().dom_reads
    }

    fn lock(&self) -> MutexGuard<'_, ScriptedReadings> {
        match self.readings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PerformanceHost for ScriptedHost {
    fn monotonic_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn dom_element_count(&self) -> Result<u64> {
        let mut readings = self.lock();
        readings.dom_reads += 1;
        match readings.dom_element_count {
            Reading::Value(count) => Ok(count),
            Reading::Unavailable | Reading::Failing => Err(anyhow!("scripted DOM read failure")),
        }
    }

    fn heap_usage(&self) -> Result<Option<HeapUsage>> {
        let mut readings = self.lock();
        readings.heap_reads += 1;
        match readings.heap {
            Reading::Value(heap) => Ok(Some(heap)),
            Reading::Unavailable => Ok(None),
            Reading::Failing => Err(anyhow!("scripted heap read failure")),
        }
    }

    fn navigation_timing(&self) -> Result<Option<NavigationTiming>> {
        match self.lock().navigation {
            Reading::Value(timing) => Ok(Some(timing)),
            Reading::Unavailable => Ok(None),
            Reading::Failing => Err(anyhow!("navigation timing entry not supported")),
        }
    }

    fn first_contentful_paint_ms(&self) -> Result<Option<f64>> {
        Ok(self.lock().first_paint_ms)
    }

    fn resource_timings(&self) -> Result<Vec<ResourceTiming>> {
        Ok(self.lock().resources.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_report_missing_capabilities() {
        let host = ScriptedHost::new();
        assert_eq!(host.dom_element_count().unwrap(), 0);
        assert_eq!(host.heap_usage().unwrap(), None);
        assert_eq!(host.navigation_timing().unwrap(), None);
        assert_eq!(host.first_contentful_paint_ms().unwrap(), None);
        assert!(host.resource_timings().unwrap().is_empty());
    }

    #[test]
    fn failing_reads_are_errors_and_still_counted() {
        let host = ScriptedHost::new().with_failing_heap().with_failing_dom();
        assert!(host.heap_usage().is_err());
        assert!(host.heap_usage().is_err());
        assert!(host.dom_element_count().is_err());
        assert_eq!(host.heap_reads(), 2);
        assert_eq!(host.dom_reads(), 1);
    }

    #[test]
    fn setters_change_later_reads() {
        let host = ScriptedHost::new().with_dom_element_count(10);
        host.set_dom_element_count(2500);
        assert_eq!(host.dom_element_count().unwrap(), 2500);
    }
}
