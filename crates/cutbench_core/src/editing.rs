use crate::error::{CoreError, Result};
use crate::types::*;
use uuid::Uuid;

impl Timeline {
    /// Remove a clip by its id. Returns the removed clip.
    pub fn remove_clip(&mut self, clip_id: Uuid) -> Result<Clip> {
        let (ti, ci) = self
            .find_clip_location(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;
        let clip = self.tracks[ti].clips.remove(ci);
        tracing::debug!(clip = %clip_id, track = %clip.track_id, "clip removed");
        Ok(clip)
    }

    /// Move a clip to a new start on its own track. The track is left as it
    /// was if the new span is negative or overlaps another clip.
    pub fn move_clip(&mut self, clip_id: Uuid, new_start_us: TimeUs) -> Result<()> {
        if new_start_us < TimeUs::ZERO {
            return Err(CoreError::InvalidOperation(format!(
                "clip cannot start before zero ({new_start_us})"
            )));
        }
        let (ti, ci) = self
            .find_clip_location(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;

        let track = &mut self.tracks[ti];
        let mut moved = track.clips[ci].clone();
        moved.start_us = new_start_us;
        check_within_limit(&moved)?;
        if !track.has_room_for(&moved, Some(clip_id)) {
            return Err(CoreError::OverlapDetected);
        }

        track.clips[ci] = moved;
        track.sort_clips();
        Ok(())
    }

    /// Change a clip's duration, keeping its start.
    pub fn trim_clip(&mut self, clip_id: Uuid, new_duration_us: TimeUs) -> Result<()> {
        if new_duration_us <= TimeUs::ZERO {
            return Err(CoreError::InvalidDuration(new_duration_us));
        }
        let (ti, ci) = self
            .find_clip_location(clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;

        let track = &mut self.tracks[ti];
        let mut trimmed = track.clips[ci].clone();
        trimmed.duration_us = new_duration_us;
        check_within_limit(&trimmed)?;
        if !track.has_room_for(&trimmed, Some(clip_id)) {
            return Err(CoreError::OverlapDetected);
        }

        track.clips[ci] = trimmed;
        Ok(())
    }
}

/// Clips must end no later than `TimeUs::MAX`.
pub(crate) fn check_within_limit(clip: &Clip) -> Result<()> {
    if clip.end_us() > TimeUs::MAX {
        return Err(CoreError::InvalidOperation(format!(
            "clip would end at {}, past the {} limit",
            clip.end_us(),
            TimeUs::MAX
        )));
    }
    Ok(())
}
