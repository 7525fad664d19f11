use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::host::PerformanceHost;

use super::state::SamplerState;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Frame task: counts one frame per tick, flushing fps once per sample interval.
pub async fn frame_loop(
    state: Arc<Mutex<SamplerState>>,
    host: Arc<dyn PerformanceHost>,
    frame_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(frame_interval);
    // Late frames are dropped rather than replayed, like a display skipping vsyncs.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("frame loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let mut guard = state.lock().await;
                if !guard.is_running() {
                    continue;
                }
                guard.on_frame(host.monotonic_ms(), host.wall_clock());
            }
        }
    }
}

/// Metrics task: one heap/DOM collection per sample interval, first one a full
/// interval after start.
pub async fn metrics_loop(
    state: Arc<Mutex<SamplerState>>,
    host: Arc<dyn PerformanceHost>,
    sample_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + sample_interval, sample_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("metrics loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let mut guard = state.lock().await;
                guard.collect_metrics(host.as_ref());
            }
        }
    }
}
