mod config;
pub mod controller;
mod loop_worker;
pub mod state;

pub use config::MonitorConfig;
pub use controller::PerformanceMonitor;
pub use state::SamplerState;
