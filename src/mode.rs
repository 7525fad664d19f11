//! Process-wide performance mode and the frame-rate based recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};

/// Mean frame rate below which the low mode is suggested.
pub const LOW_MODE_BELOW_FPS: f64 = 30.0;
/// Mean frame rate below which the medium mode is suggested.
pub const MEDIUM_MODE_BELOW_FPS: f64 = 45.0;

/// How much visual effect work the rest of the application should do.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PerformanceMode {
    Low,
    Medium,
    #[default]
    High,
}

impl fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PerformanceMode::Low => "low",
            PerformanceMode::Medium => "medium",
            PerformanceMode::High => "high",
        };
        f.write_str(name)
    }
}

/// Sink for suggested modes. The sampler writes and never reads back.
pub trait ModeController: Send + Sync {
    fn set_mode(&self, mode: PerformanceMode);
}

impl<F> ModeController for F
where
    F: Fn(PerformanceMode) + Send + Sync,
{
    fn set_mode(&self, mode: PerformanceMode) {
        self(mode)
    }
}

/// Shared handle to the current mode, owned by whoever composes the application.
#[derive(Debug, Clone, Default)]
pub struct SharedPerformanceMode {
    inner: Arc<RwLock<PerformanceMode>>,
}

impl SharedPerformanceMode {
    pub fn new(initial: PerformanceMode) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> PerformanceMode {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, mode: PerformanceMode) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = mode;
    }
}

impl ModeController for SharedPerformanceMode {
    fn set_mode(&self, mode: PerformanceMode) {
        self.set(mode);
    }
}

/// Arithmetic mean of the samples, or 0 when there are none.
pub fn mean_frame_rate<I>(samples: I) -> f64
where
    I: IntoIterator<Item = u32>,
{
    let (sum, count) = samples
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), fps| (sum + u64::from(fps), count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

pub fn recommend_mode(mean_fps: f64) -> PerformanceMode {
    if mean_fps < LOW_MODE_BELOW_FPS {
        PerformanceMode::Low
    } else if mean_fps < MEDIUM_MODE_BELOW_FPS {
        PerformanceMode::Medium
    } else {
        PerformanceMode::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn recommendation_follows_mean_frame_rate() {
        assert_eq!(recommend_mode(mean_frame_rate([20, 30])), PerformanceMode::Low);
        assert_eq!(recommend_mode(mean_frame_rate([36, 40])), PerformanceMode::Medium);
        assert_eq!(recommend_mode(mean_frame_rate([50, 54])), PerformanceMode::High);
    }

    #[test]
    fn recommendation_boundaries() {
        assert_eq!(recommend_mode(29.99), PerformanceMode::Low);
        assert_eq!(recommend_mode(30.0), PerformanceMode::Medium);
        assert_eq!(recommend_mode(44.99), PerformanceMode::Medium);
        assert_eq!(recommend_mode(45.0), PerformanceMode::High);
    }

    #[test]
    fn empty_samples_recommend_low() {
        let mean = mean_frame_rate(Vec::<u32>::new());
        assert_eq!(mean, 0.0);
        assert_eq!(recommend_mode(mean), PerformanceMode::Low);
    }

    #[test]
    fn shared_mode_is_visible_through_clones() {
        let mode = SharedPerformanceMode::new(PerformanceMode::High);
        let writer = mode.clone();
        writer.set_mode(PerformanceMode::Medium);
        assert_eq!(mode.get(), PerformanceMode::Medium);
    }

    #[test]
    fn closures_act_as_controllers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |mode: PerformanceMode| seen.lock().unwrap().push(mode)
        };
        let controller: Arc<dyn ModeController> = Arc::new(sink);
        controller.set_mode(PerformanceMode::Low);
        assert_eq!(*seen.lock().unwrap(), vec![PerformanceMode::Low]);
    }
}
