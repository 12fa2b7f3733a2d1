//! Time to pixel mapping for the timeline view.
//!
//! Everything here is derived from the tracks passed in on each call; nothing
//! is cached between calls.

use crate::error::{CoreError, Result};
use crate::policy::TimelinePolicy;
use crate::types::*;
use serde::Serialize;
use uuid::Uuid;

/// Where a ruler label sits relative to its tick. The first and last labels
/// are pulled inward so they are not clipped at the timeline edges.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LabelAnchor {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RulerTick {
    pub second: u32,
    pub x_px: f64,
    pub major: bool,
    pub label: Option<String>,
    pub anchor: Option<LabelAnchor>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClipRect {
    pub clip_id: Uuid,
    pub track_id: Uuid,
    /// Row of the owning track, in track order.
    pub track_index: usize,
    pub left_px: f64,
    pub width_px: f64,
    pub label: String,
    pub css_class: &'static str,
}

impl ClipRect {
    pub fn contains_x(&self, x_px: f64) -> bool {
        x_px >= self.left_px && x_px < self.left_px + self.width_px
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineGeometry {
    pub total_duration_secs: u32,
    pub pixels_per_second: f64,
    pub content_width_px: f64,
    pub ruler_ticks: Vec<RulerTick>,
    pub clip_rects: Vec<ClipRect>,
}

impl TimelineGeometry {
    /// Timeline position under a horizontal pixel offset, clamped to the
    /// rendered range.
    pub fn time_at(&self, x_px: f64) -> TimeUs {
        let secs = (x_px / self.pixels_per_second).clamp(0.0, self.total_duration_secs as f64);
        TimeUs::from_seconds(secs)
    }

    /// Clip drawn at `x_px` on the given track row, if any.
    pub fn clip_at(&self, track_index: usize, x_px: f64) -> Option<&ClipRect> {
        self.clip_rects
            .iter()
            .find(|r| r.track_index == track_index && r.contains_x(x_px))
    }
}

/// Rendered timeline length in whole seconds: the latest clip end rounded
/// up, but never below the policy minimum.
pub fn total_duration_secs(tracks: &[Track], policy: &TimelinePolicy) -> u32 {
    let latest_end = tracks
        .iter()
        .flat_map(|t| t.clips.iter())
        .map(Clip::end_us)
        .max()
        .unwrap_or(TimeUs::ZERO);
    // Edits keep clips inside `TimeUs::MAX`; the cap bounds the ruler even
    // for a hand-built track that does not.
    let end_secs = latest_end.min(TimeUs::MAX).ceil_seconds().max(0) as u32;
    end_secs.max(policy.minimum_timeline_secs)
}

/// Compute ruler ticks and clip rectangles for `tracks` at the given scale.
pub fn compute_geometry(
    tracks: &[Track],
    pixels_per_second: f64,
    policy: &TimelinePolicy,
) -> Result<TimelineGeometry> {
    if !pixels_per_second.is_finite() || pixels_per_second <= 0.0 {
        return Err(CoreError::InvalidPixelScale(pixels_per_second));
    }

    let total = total_duration_secs(tracks, policy);
    let ruler_ticks = (0..=total)
        .map(|second| ruler_tick(second, total, pixels_per_second, policy.major_tick_every_secs))
        .collect();

    let clip_rects = tracks
        .iter()
        .enumerate()
        .flat_map(|(track_index, track)| {
            track.clips.iter().map(move |clip| ClipRect {
                clip_id: clip.id,
                track_id: track.id,
                track_index,
                left_px: clip.start_us.as_seconds() * pixels_per_second,
                width_px: (clip.duration_us.as_seconds() * pixels_per_second)
                    .max(policy.minimum_clip_width_px),
                label: clip.label.clone(),
                css_class: clip.color.css_class(),
            })
        })
        .collect();

    Ok(TimelineGeometry {
        total_duration_secs: total,
        pixels_per_second,
        content_width_px: total as f64 * pixels_per_second,
        ruler_ticks,
        clip_rects,
    })
}

fn ruler_tick(second: u32, total: u32, pixels_per_second: f64, major_every: u32) -> RulerTick {
    let major = major_every > 0 && second % major_every == 0;
    // Ticks after the first are 1px wide and centred on their second.
    let x_px = if second == 0 {
        0.0
    } else {
        second as f64 * pixels_per_second - 0.5
    };
    let anchor = major.then(|| {
        if second == 0 {
            LabelAnchor::Start
        } else if second == total {
            LabelAnchor::End
        } else {
            LabelAnchor::Center
        }
    });

    RulerTick {
        second,
        x_px,
        major,
        label: major.then(|| format!("{second}s")),
        anchor,
    }
}
