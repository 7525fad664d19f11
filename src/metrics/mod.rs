mod resources;
mod types;
mod window;

pub use resources::infer_resource_type;
pub use types::{
    LoadTimeSnapshot, MonitorSnapshot, ResourceEntry, ResourceInventory, ResourceRollup,
    ResourceType, SeriesStats,
};
pub use window::{BoundedSeries, SampleWindow, MAX_SAMPLES};
