use crate::error::Result;
use crate::types::TimeUs;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Length given to every newly placed clip. Source media is never decoded,
/// so there is no real duration to use.
pub const DEFAULT_CLIP_DURATION: TimeUs = TimeUs(5_000_000);

/// Floor for the rendered timeline length, in whole seconds.
pub const MINIMUM_TIMELINE_SECS: u32 = 20;

/// Narrowest clip rectangle, so very short clips stay clickable.
pub const MINIMUM_CLIP_WIDTH_PX: f64 = 10.0;

/// Ruler labels appear every this many seconds.
pub const MAJOR_TICK_EVERY_SECS: u32 = 5;

/// Zoom level 100%.
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 50.0;

/// Tunable timeline constants. Every field falls back to its default when
/// missing from a policy file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelinePolicy {
    pub default_clip_duration_us: TimeUs,
    pub minimum_timeline_secs: u32,
    pub minimum_clip_width_px: f64,
    pub major_tick_every_secs: u32,
    pub pixels_per_second: f64,
}

impl Default for TimelinePolicy {
    fn default() -> Self {
        Self {
            default_clip_duration_us: DEFAULT_CLIP_DURATION,
            minimum_timeline_secs: MINIMUM_TIMELINE_SECS,
            minimum_clip_width_px: MINIMUM_CLIP_WIDTH_PX,
            major_tick_every_secs: MAJOR_TICK_EVERY_SECS,
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
        }
    }
}

impl TimelinePolicy {
    /// Load a policy from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let policy: TimelinePolicy = serde_json::from_str(&data)?;
        Ok(policy)
    }
}
