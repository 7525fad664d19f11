use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Number of ticks each series retains.
pub const MAX_SAMPLES: usize = 60;

/// FIFO series capped at a fixed capacity.
#[derive(Debug, Clone)]
pub struct BoundedSeries<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> BoundedSeries<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `value`, returning the entry evicted to make room for it.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(value);
        }
        let evicted = if self.values.len() >= self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        self.values.push_back(value);
        evicted
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.values.iter().cloned().collect()
    }
}

/// Rolling per-tick history kept by the sampler.
///
/// `frame_rate` and `timestamps` are pushed together, as are `memory_pressure`
/// and `heap_used_mb`, so each pair stays index-aligned.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    frame_rate: BoundedSeries<u32>,
    timestamps: BoundedSeries<DateTime<Utc>>,
    memory_pressure: BoundedSeries<f64>,
    heap_used_mb: BoundedSeries<f64>,
    dom_element_count: BoundedSeries<u64>,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::with_capacity(MAX_SAMPLES)
    }
}

impl SampleWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frame_rate: BoundedSeries::new(capacity),
            timestamps: BoundedSeries::new(capacity),
            memory_pressure: BoundedSeries::new(capacity),
            heap_used_mb: BoundedSeries::new(capacity),
            dom_element_count: BoundedSeries::new(capacity),
        }
    }

    pub fn push_frame_rate(&mut self, fps: u32, captured_at: DateTime<Utc>) {
        self.frame_rate.push(fps);
        self.timestamps.push(captured_at);
    }

    pub fn push_memory(&mut self, pressure_percent: f64, heap_used_mb: f64) {
        self.memory_pressure.push(pressure_percent);
        self.heap_used_mb.push(heap_used_mb);
    }

    pub fn push_dom_element_count(&mut self, count: u64) {
        self.dom_element_count.push(count);
    }

    pub fn frame_rate(&self) -> &BoundedSeries<u32> {
        &self.frame_rate
    }

    pub fn timestamps(&self) -> &BoundedSeries<DateTime<Utc>> {
        &self.timestamps
    }

    pub fn memory_pressure(&self) -> &BoundedSeries<f64> {
        &self.memory_pressure
    }

    pub fn heap_used_mb(&self) -> &BoundedSeries<f64> {
        &self.heap_used_mb
    }

    pub fn dom_element_count(&self) -> &BoundedSeries<u64> {
        &self.dom_element_count
    }

    pub fn clear(&mut self) {
        self.frame_rate.clear();
        self.timestamps.clear();
        self.memory_pressure.clear();
        self.heap_used_mb.clear();
        self.dom_element_count.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_below_capacity_keeps_everything() {
        let mut series = BoundedSeries::new(3);
        assert_eq!(series.push(1), None);
        assert_eq!(series.push(2), None);
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest(), Some(&2));
    }

    #[test]
    fn overflow_evicts_exactly_the_oldest() {
        let mut series = BoundedSeries::new(3);
        for value in 1..=3 {
            series.push(value);
        }
        assert_eq!(series.push(4), Some(1));
        assert_eq!(series.push(5), Some(2));
        assert_eq!(series.to_vec(), vec![3, 4, 5]);
    }

    #[test]
    fn zero_capacity_retains_nothing() {
        let mut series = BoundedSeries::new(0);
        assert_eq!(series.push(7), Some(7));
        assert!(series.is_empty());
    }

    #[test]
    fn frame_rate_and_timestamps_stay_aligned_past_capacity() {
        let mut window = SampleWindow::default();
        let start = Utc::now();
        for i in 0..(MAX_SAMPLES as i64 + 25) {
            window.push_frame_rate(i as u32, start + chrono::Duration::seconds(i));
        }
        assert_eq!(window.frame_rate().len(), MAX_SAMPLES);
        assert_eq!(window.timestamps().len(), MAX_SAMPLES);
        assert_eq!(window.frame_rate().iter().next(), Some(&25));
        assert_eq!(
            window.timestamps().iter().next(),
            Some(&(start + chrono::Duration::seconds(25)))
        );
    }

    #[test]
    fn clear_empties_every_series() {
        let mut window = SampleWindow::with_capacity(4);
        window.push_frame_rate(60, Utc::now());
        window.push_memory(42.0, 128.0);
        window.push_dom_element_count(800);
        window.clear();
        assert!(window.frame_rate().is_empty());
        assert!(window.timestamps().is_empty());
        assert!(window.memory_pressure().is_empty());
        assert!(window.heap_used_mb().is_empty());
        assert!(window.dom_element_count().is_empty());
    }
}
