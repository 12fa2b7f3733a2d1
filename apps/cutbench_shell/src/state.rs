use anyhow::{anyhow, Result};
use cutbench_core::geometry::{self, TimelineGeometry};
use cutbench_core::history::{
    AddTextCommand, Command, History, MoveClipCommand, PlaceMediaCommand, RemoveClipCommand,
    TrimClipCommand,
};
use cutbench_core::policy::TimelinePolicy;
use cutbench_core::types::{Clip, TimeUs, Timeline};
use cutbench_media::library::MediaLibrary;
use uuid::Uuid;

const HISTORY_DEPTH: usize = 100;

/// The single owner of session state. Every mutation of the timeline and the
/// media library goes through here, one event at a time.
pub struct EditorState {
    pub timeline: Timeline,
    pub library: MediaLibrary,
    pub history: History,
    pub policy: TimelinePolicy,
    pub selected_clip: Option<Uuid>,
}

impl EditorState {
    pub fn new(policy: TimelinePolicy) -> Self {
        Self {
            timeline: Timeline::with_default_tracks(),
            library: MediaLibrary::new(),
            history: History::new(HISTORY_DEPTH),
            policy,
            selected_clip: None,
        }
    }

    /// Place a library item at the end of its track.
    pub fn add_to_timeline(&mut self, media_id: Uuid) -> Result<Clip> {
        let media = self
            .library
            .get(media_id)
            .ok_or_else(|| anyhow!("media not found: {media_id}"))?
            .clone();
        let cmd = PlaceMediaCommand::new(media, self.policy.clone());
        self.run(Box::new(cmd))
    }

    pub fn add_text(&mut self, text: &str) -> Result<Clip> {
        let cmd = AddTextCommand::new(text, self.policy.clone());
        self.run(Box::new(cmd))
    }

    pub fn move_clip(&mut self, clip_id: Uuid, start_secs: f64) -> Result<Clip> {
        let cmd = MoveClipCommand::new(clip_id, TimeUs::try_from_seconds(start_secs)?);
        self.run(Box::new(cmd))
    }

    pub fn trim_clip(&mut self, clip_id: Uuid, duration_secs: f64) -> Result<Clip> {
        let cmd = TrimClipCommand::new(clip_id, TimeUs::try_from_seconds(duration_secs)?);
        self.run(Box::new(cmd))
    }

    pub fn delete_clip(&mut self, clip_id: Uuid) -> Result<()> {
        self.history
            .execute(Box::new(RemoveClipCommand::new(clip_id)), &mut self.timeline)?;
        if self.selected_clip == Some(clip_id) {
            self.selected_clip = None;
        }
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        self.history.undo(&mut self.timeline)?;
        self.clear_stale_selection();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.history.redo(&mut self.timeline)?;
        self.clear_stale_selection();
        Ok(())
    }

    /// Geometry at the policy's zoom, or at an explicit scale.
    pub fn geometry(&self, pixels_per_second: Option<f64>) -> Result<TimelineGeometry> {
        let pps = pixels_per_second.unwrap_or(self.policy.pixels_per_second);
        Ok(geometry::compute_geometry(
            self.timeline.tracks(),
            pps,
            &self.policy,
        )?)
    }

    /// Select whatever clip is drawn under `x_px` on a track row. Clicking
    /// empty space clears the selection.
    pub fn select_at(&mut self, track_index: usize, x_px: f64) -> Result<Option<Uuid>> {
        let geom = self.geometry(None)?;
        self.selected_clip = geom.clip_at(track_index, x_px).map(|r| r.clip_id);
        Ok(self.selected_clip)
    }

    fn run(&mut self, cmd: Box<dyn Command>) -> Result<Clip> {
        self.history.execute(cmd, &mut self.timeline)?;
        let clip_id = self
            .history
            .last_clip_id()
            .ok_or_else(|| anyhow!("command did not report a clip"))?;
        let clip = self
            .timeline
            .clip(clip_id)
            .cloned()
            .ok_or_else(|| anyhow!("clip {clip_id} missing after edit"))?;
        Ok(clip)
    }

    fn clear_stale_selection(&mut self) {
        if let Some(id) = self.selected_clip {
            if self.timeline.clip(id).is_none() {
                self.selected_clip = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutbench_core::types::TrackKind;

    #[test]
    fn starts_with_default_tracks() {
        let state = EditorState::new(TimelinePolicy::default());
        assert_eq!(state.timeline.tracks().len(), 3);
        assert!(state.library.is_empty());
        assert!(state.selected_clip.is_none());
    }

    #[test]
    fn unknown_media_is_an_error() {
        let mut state = EditorState::new(TimelinePolicy::default());
        let err = state.add_to_timeline(Uuid::new_v4()).unwrap_err();
        assert!(err.to_string().starts_with("media not found"));
        assert_eq!(state.timeline.clip_count(), 0);
    }

    #[test]
    fn text_edit_cycle() {
        let mut state = EditorState::new(TimelinePolicy::default());
        let clip = state.add_text("Opening title").unwrap();
        assert_eq!(clip.start_us, TimeUs::ZERO);

        let moved = state.move_clip(clip.id, 2.0).unwrap();
        assert_eq!(moved.start_us, TimeUs(2_000_000));

        let trimmed = state.trim_clip(clip.id, 1.5).unwrap();
        assert_eq!(trimmed.duration_us, TimeUs(1_500_000));

        state.undo().unwrap();
        assert_eq!(
            state.timeline.clip(clip.id).unwrap().duration_us,
            TimeUs(5_000_000)
        );
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let mut state = EditorState::new(TimelinePolicy::default());
        let a = state.add_text("a").unwrap();
        let b = state.add_text("b").unwrap();
        let before = state.timeline.clone();

        for secs in [f64::INFINITY, f64::NAN, 1e13, 5e6] {
            assert!(state.trim_clip(b.id, secs).is_err(), "trim to {secs} accepted");
            assert!(state.move_clip(a.id, secs).is_err(), "move to {secs} accepted");
        }
        state.delete_clip(b.id).unwrap();
        assert!(state.move_clip(a.id, f64::INFINITY).is_err());

        state.undo().unwrap();
        assert_eq!(state.timeline, before);
        assert_eq!(state.geometry(None).unwrap().ruler_ticks.len(), 21);
    }

    #[test]
    fn select_at_uses_geometry() {
        let mut state = EditorState::new(TimelinePolicy::default());
        let clip = state.add_text("Caption").unwrap();
        let text_row = state
            .timeline
            .tracks()
            .iter()
            .position(|t| t.kind == TrackKind::Text)
            .unwrap();

        assert_eq!(state.select_at(text_row, 100.0).unwrap(), Some(clip.id));
        assert_eq!(state.select_at(text_row, 400.0).unwrap(), None);
        assert_eq!(state.selected_clip, None);
    }

    #[test]
    fn deleting_selected_clip_clears_selection() {
        let mut state = EditorState::new(TimelinePolicy::default());
        let clip = state.add_text("Caption").unwrap();
        state.selected_clip = Some(clip.id);

        state.delete_clip(clip.id).unwrap();
        assert!(state.selected_clip.is_none());

        state.undo().unwrap();
        assert!(state.timeline.clip(clip.id).is_some());
    }

    #[test]
    fn undo_of_placement_clears_selection() {
        let mut state = EditorState::new(TimelinePolicy::default());
        let clip = state.add_text("Caption").unwrap();
        state.selected_clip = Some(clip.id);
        state.undo().unwrap();
        assert!(state.selected_clip.is_none());
    }

    #[test]
    fn geometry_uses_policy_scale_by_default() {
        let policy = TimelinePolicy {
            pixels_per_second: 20.0,
            ..TimelinePolicy::default()
        };
        let state = EditorState::new(policy);
        assert_eq!(state.geometry(None).unwrap().content_width_px, 400.0);
        assert_eq!(state.geometry(Some(50.0)).unwrap().content_width_px, 1000.0);
        assert!(state.geometry(Some(0.0)).is_err());
    }
}
