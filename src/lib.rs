mod utils;

pub mod health;
pub mod host;
pub mod metrics;
pub mod mode;
pub mod sampler;
pub mod settings;

pub use health::{classify, Dimension, HealthLevel, HealthStatus, HealthThresholds};
pub use host::{HeapUsage, NavigationTiming, PerformanceHost, ProcessHost, ResourceTiming, ScriptedHost};
pub use metrics::{MonitorSnapshot, MAX_SAMPLES};
pub use mode::{ModeController, PerformanceMode, SharedPerformanceMode};
pub use sampler::{MonitorConfig, PerformanceMonitor};
pub use settings::{MonitorSettings, SettingsStore};

use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc, time::Instant};

const SETTINGS_PATH_ENV: &str = "STAYX_SETTINGS_PATH";
const DEFAULT_SETTINGS_FILE: &str = "stayx-monitor.json";
const RUN_SECS_ENV: &str = "STAYX_MONITOR_SECS";

pub fn run() {
    let debug_mode = std::env::var("STAYX_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::new()
        .filter_level(if debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    log::info!("StayX performance monitor starting up...");

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")
        .and_then(|runtime| runtime.block_on(monitor_process()));

    if let Err(err) = result {
        log::error!("performance monitor failed: {err:?}");
        std::process::exit(1);
    }
}

async fn monitor_process() -> Result<()> {
    let host = Arc::new(ProcessHost::new());
    host.mark_dom_content_loaded();

    let settings_path = std::env::var(SETTINGS_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let read_started = Instant::now();
    let settings = SettingsStore::new(settings_path.clone())?;
    if let Ok(metadata) = std::fs::metadata(&settings_path) {
        host.record_resource(
            format!("file://{}", settings_path.display()),
            read_started.elapsed().as_secs_f64() * 1000.0,
            metadata.len(),
        );
    }

    let mode = SharedPerformanceMode::new(settings.performance_mode());
    let monitor = PerformanceMonitor::new(settings.monitor_config(), host.clone(), Arc::new(mode.clone()))?;
    host.mark_load_complete();
    host.mark_first_contentful_paint();

    monitor.start().await?;

    match run_duration()? {
        Some(duration) => {
            log::info!("sampling for {}s", duration.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(duration) => {}
                signal = tokio::signal::ctrl_c() => signal.context("failed to listen for ctrl-c")?,
            }
        }
        None => {
            log::info!("sampling until ctrl-c");
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for ctrl-c")?;
        }
    }

    monitor.stop().await?;

    if monitor.can_auto_optimize().await {
        monitor.auto_optimize().await;
        settings.update_performance_mode(mode.get())?;
    } else {
        log::warn!("no frame-rate samples collected; keeping {} mode", mode.get());
    }

    let snapshot = monitor.snapshot().await;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_duration() -> Result<Option<std::time::Duration>> {
    match std::env::var(RUN_SECS_ENV) {
        Ok(value) => {
            let secs: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{RUN_SECS_ENV} must be a whole number of seconds, got '{value}'"))?;
            Ok(Some(std::time::Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}
