use crate::host::ResourceTiming;

use super::types::{ResourceEntry, ResourceInventory, ResourceType};

/// Infer a resource type from the file extension of `url`.
///
/// Query strings and fragments are ignored; unknown or missing extensions map
/// to [`ResourceType::Other`].
pub fn infer_resource_type(url: &str) -> ResourceType {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let file_name = path.rsplit('/').next().unwrap_or_default();
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return ResourceType::Other;
    };

    match extension.to_ascii_lowercase().as_str() {
        "js" | "mjs" | "cjs" => ResourceType::Javascript,
        "css" => ResourceType::Css,
        "html" | "htm" => ResourceType::Html,
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "avif" | "ico" => ResourceType::Image,
        "woff" | "woff2" | "ttf" | "otf" | "eot" => ResourceType::Font,
        _ => ResourceType::Other,
    }
}

impl ResourceInventory {
    pub fn from_timings(timings: Vec<ResourceTiming>) -> Self {
        let mut inventory = Self::default();
        for timing in timings {
            inventory.record(timing);
        }
        inventory
    }

    pub fn record(&mut self, timing: ResourceTiming) {
        let resource_type = infer_resource_type(&timing.url);
        let rollup = self.by_type.entry(resource_type).or_default();
        rollup.count += 1;
        rollup.total_bytes = rollup.total_bytes.saturating_add(timing.transfer_size_bytes);

        self.entries.push(ResourceEntry {
            url: timing.url,
            duration_ms: timing.duration_ms,
            transfer_size_bytes: timing.transfer_size_bytes,
            resource_type,
        });
    }

    pub fn total_bytes(&self) -> u64 {
        self.by_type
            .values()
            .fold(0u64, |acc, rollup| acc.saturating_add(rollup.total_bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
