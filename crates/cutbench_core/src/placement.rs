//! Clip placement: turning a media record (or a caption) into a clip on the
//! right track.
//!
//! New clips always go at the current end of their target track. Gaps left
//! by deleted or moved clips are never filled.

use crate::editing::check_within_limit;
use crate::error::{CoreError, Result};
use crate::policy::TimelinePolicy;
use crate::types::*;
use uuid::Uuid;

/// Track kind a media kind is placed on. Images share video tracks.
pub fn target_track_kind(kind: MediaKind) -> Option<TrackKind> {
    match kind {
        MediaKind::Video | MediaKind::Image => Some(TrackKind::Video),
        MediaKind::Audio => Some(TrackKind::Audio),
        MediaKind::Unsupported => None,
    }
}

fn color_for(kind: MediaKind) -> ColorTag {
    match kind {
        MediaKind::Image => ColorTag::Image,
        MediaKind::Audio => ColorTag::Audio,
        _ => ColorTag::Video,
    }
}

impl Timeline {
    /// Place `media` at the end of the first track of its target kind,
    /// creating that track if needed. Returns a copy of the new clip.
    ///
    /// Unsupported media kinds are rejected before anything is touched.
    pub fn place_media(&mut self, media: &MediaRecord, policy: &TimelinePolicy) -> Result<Clip> {
        let kind = target_track_kind(media.kind)
            .ok_or_else(|| CoreError::UnsupportedMediaKind(media.mime_type.clone()))?;
        let source = ClipSource::Media {
            media_id: media.id,
            media_kind: media.kind,
            content: media.content.clone(),
        };
        let clip = self.append_clip(kind, source, &media.title, color_for(media.kind), policy)?;
        tracing::info!(
            clip = %clip.id,
            media = %media.id,
            title = %media.title,
            start = %clip.start_us,
            "media placed on timeline"
        );
        Ok(clip)
    }

    /// Place a caption at the end of the first text track.
    pub fn place_text(&mut self, text: &str, policy: &TimelinePolicy) -> Result<Clip> {
        if text.trim().is_empty() {
            return Err(CoreError::InvalidOperation("caption text is empty".into()));
        }
        let source = ClipSource::Text { text: text.to_string() };
        let clip = self.append_clip(TrackKind::Text, source, text, ColorTag::Text, policy)?;
        tracing::info!(clip = %clip.id, start = %clip.start_us, "caption placed on timeline");
        Ok(clip)
    }

    /// Put a previously created clip back on its track, e.g. when redoing a
    /// placement. Fails if the track is gone or the span is now taken.
    pub fn insert_clip(&mut self, clip: Clip) -> Result<()> {
        let ti = self
            .track_index(clip.track_id)
            .ok_or(CoreError::TrackNotFound(clip.track_id))?;
        if clip.duration_us <= TimeUs::ZERO {
            return Err(CoreError::InvalidDuration(clip.duration_us));
        }
        let track = &mut self.tracks[ti];
        let expected = match &clip.source {
            ClipSource::Media { media_kind, .. } => target_track_kind(*media_kind),
            ClipSource::Text { .. } => Some(TrackKind::Text),
        };
        if expected != Some(track.kind) {
            return Err(CoreError::InvalidOperation(format!(
                "clip {} does not belong on {}",
                clip.id, track.display_name
            )));
        }
        check_within_limit(&clip)?;
        if !track.has_room_for(&clip, None) {
            return Err(CoreError::OverlapDetected);
        }
        track.clips.push(clip);
        track.sort_clips();
        Ok(())
    }

    fn append_clip(
        &mut self,
        kind: TrackKind,
        source: ClipSource,
        label: &str,
        color: ColorTag,
        policy: &TimelinePolicy,
    ) -> Result<Clip> {
        let duration_us = policy.default_clip_duration_us;
        if duration_us <= TimeUs::ZERO || duration_us > TimeUs::MAX {
            return Err(CoreError::InvalidDuration(duration_us));
        }

        let ti = self.ensure_track(kind);
        let track = &mut self.tracks[ti];

        // Build the whole clip before the track sees it.
        let clip = Clip {
            id: Uuid::new_v4(),
            track_id: track.id,
            source,
            start_us: track.end_us(),
            duration_us,
            label: label.to_string(),
            color,
        };
        check_within_limit(&clip)?;

        // Appending at the end keeps the clips ordered by start.
        track.clips.push(clip.clone());
        Ok(clip)
    }
}
