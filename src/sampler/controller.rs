use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::health::HealthStatus;
use crate::host::PerformanceHost;
use crate::metrics::MonitorSnapshot;
use crate::mode::{recommend_mode, ModeController, PerformanceMode};

use super::loop_worker::{frame_loop, metrics_loop};
use super::{MonitorConfig, SamplerState};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

struct SamplingTasks {
    cancel_token: CancellationToken,
    frame_handle: JoinHandle<()>,
    metrics_handle: JoinHandle<()>,
}

/// Owns the sampler state and the two sampling tasks.
///
/// Clones share the same state. Readers only ever get copies out.
#[derive(Clone)]
pub struct PerformanceMonitor {
    state: Arc<Mutex<SamplerState>>,
    tasks: Arc<Mutex<Option<SamplingTasks>>>,
    host: Arc<dyn PerformanceHost>,
    mode: Arc<dyn ModeController>,
    config: MonitorConfig,
}

impl PerformanceMonitor {
    pub fn new(
        config: MonitorConfig,
        host: Arc<dyn PerformanceHost>,
        mode: Arc<dyn ModeController>,
    ) -> Result<Self> {
        config.validate().context("invalid monitor config")?;

        Ok(Self {
            state: Arc::new(Mutex::new(SamplerState::new(&config))),
            tasks: Arc::new(Mutex::new(None)),
            host,
            mode,
            config,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub async fn is_running(&self) -> bool {
        self.tasks.lock().await.is_some()
    }

    /// Start sampling. Does nothing when already running.
    ///
    /// Clears the previous session, captures load timing and the resource
    /// inventory once, then spawns the frame and metrics tasks.
    pub async fn start(&self) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        if tasks.is_some() {
            log_info!("performance monitoring already active");
            return Ok(());
        }

        let session_id = Uuid::new_v4().to_string();
        {
            let mut state = self.state.lock().await;
            state.begin(session_id.clone(), self.host.monotonic_ms());
            state.capture_page_profile(self.host.as_ref());
        }

        let cancel_token = CancellationToken::new();
        let frame_handle = tokio::spawn(frame_loop(
            self.state.clone(),
            self.host.clone(),
            self.config.frame_interval(),
            cancel_token.clone(),
        ));
        let metrics_handle = tokio::spawn(metrics_loop(
            self.state.clone(),
            self.host.clone(),
            self.config.sample_interval(),
            cancel_token.clone(),
        ));

        *tasks = Some(SamplingTasks {
            cancel_token,
            frame_handle,
            metrics_handle,
        });

        log_info!("performance monitoring started (session {session_id})");
        Ok(())
    }

    /// Stop sampling and keep the collected data. Idempotent.
    pub async fn stop(&self) -> Result<()> {
        // Held until both tasks are joined so a concurrent start cannot overlap them.
        let mut tasks = self.tasks.lock().await;
        let Some(running) = tasks.take() else {
            return Ok(());
        };

        // Flip the flag first so a callback already queued behind the lock is a no-op.
        let session_id = {
            let mut state = self.state.lock().await;
            state.halt();
            state.session_id().map(str::to_owned)
        };
        running.cancel_token.cancel();

        running
            .frame_handle
            .await
            .context("frame loop task failed to join")?;
        running
            .metrics_handle
            .await
            .context("metrics loop task failed to join")?;

        log_info!(
            "performance monitoring stopped (session {})",
            session_id.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }

    /// Drop all collected data. Rejected while monitoring is running.
    pub async fn reset(&self) -> Result<()> {
        let tasks = self.tasks.lock().await;
        if tasks.is_some() {
            bail!("cannot reset while monitoring is active");
        }
        self.state.lock().await.reset()
    }

    pub async fn can_reset(&self) -> bool {
        !self.is_running().await
    }

    pub async fn can_auto_optimize(&self) -> bool {
        self.state.lock().await.has_frame_samples()
    }

    pub async fn snapshot(&self) -> MonitorSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn health(&self) -> HealthStatus {
        self.state.lock().await.health()
    }

    /// Suggested mode from the mean of the retained frame-rate samples.
    pub async fn recommend(&self) -> PerformanceMode {
        let mean = self.state.lock().await.mean_frame_rate();
        recommend_mode(mean)
    }

    /// Write the current recommendation to the mode controller.
    pub async fn auto_optimize(&self) -> PerformanceMode {
        let (mean, has_samples) = {
            let state = self.state.lock().await;
            (state.mean_frame_rate(), state.has_frame_samples())
        };
        if !has_samples {
            log_warn!("auto-optimize requested without frame-rate samples; treating mean as 0");
        }

        let mode = recommend_mode(mean);
        self.mode.set_mode(mode);
        log_info!("auto-optimize applied {mode} mode (mean {mean:.1} fps)");
        mode
    }
}
