use crate::error::{CoreError, Result};
use crate::policy::TimelinePolicy;
use crate::types::*;
use uuid::Uuid;

/// A timeline edit that can be executed, undone, and described.
pub trait Command: std::fmt::Debug + Send {
    fn execute(&mut self, timeline: &mut Timeline) -> Result<()>;
    fn undo(&mut self, timeline: &mut Timeline) -> Result<()>;
    fn description(&self) -> &str;

    /// Clip the command created or edited, once it has run.
    fn clip_id(&self) -> Option<Uuid>;
}

/// Bounded undo/redo stacks.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Execute a command and push it onto the undo stack. Clears redo stack.
    /// A failing command is dropped and leaves both stacks alone.
    pub fn execute(&mut self, mut cmd: Box<dyn Command>, timeline: &mut Timeline) -> Result<()> {
        cmd.execute(timeline)?;
        self.redo_stack.clear();
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        Ok(())
    }

    /// Undo the last command.
    pub fn undo(&mut self, timeline: &mut Timeline) -> Result<()> {
        let mut cmd = self.undo_stack.pop().ok_or(CoreError::NothingToUndo)?;
        if let Err(e) = cmd.undo(timeline) {
            self.undo_stack.push(cmd);
            return Err(e);
        }
        self.redo_stack.push(cmd);
        Ok(())
    }

    /// Redo the last undone command.
    pub fn redo(&mut self, timeline: &mut Timeline) -> Result<()> {
        let mut cmd = self.redo_stack.pop().ok_or(CoreError::NothingToRedo)?;
        if let Err(e) = cmd.execute(timeline) {
            self.redo_stack.push(cmd);
            return Err(e);
        }
        self.undo_stack.push(cmd);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|cmd| cmd.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|cmd| cmd.description())
    }

    /// Clip touched by the most recently executed (or redone) command.
    pub fn last_clip_id(&self) -> Option<Uuid> {
        self.undo_stack.last().and_then(|cmd| cmd.clip_id())
    }
}

// ---------------------------------------------------------------------------
// PlaceMediaCommand
// ---------------------------------------------------------------------------

/// Places a media record on first execution; redo puts back the same clip.
#[derive(Debug)]
pub struct PlaceMediaCommand {
    media: MediaRecord,
    policy: TimelinePolicy,
    placed: Option<Clip>,
}

impl PlaceMediaCommand {
    pub fn new(media: MediaRecord, policy: TimelinePolicy) -> Self {
        Self {
            media,
            policy,
            placed: None,
        }
    }
}

impl Command for PlaceMediaCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> Result<()> {
        if let Some(clip) = &self.placed {
            return timeline.insert_clip(clip.clone());
        }
        self.placed = Some(timeline.place_media(&self.media, &self.policy)?);
        Ok(())
    }

    fn undo(&mut self, timeline: &mut Timeline) -> Result<()> {
        let clip = self
            .placed
            .as_ref()
            .ok_or_else(|| CoreError::InvalidOperation("nothing was placed".into()))?;
        timeline.remove_clip(clip.id).map(|_| ())
    }

    fn description(&self) -> &str {
        "Add clip"
    }

    fn clip_id(&self) -> Option<Uuid> {
        self.placed.as_ref().map(|c| c.id)
    }
}

// ---------------------------------------------------------------------------
// AddTextCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AddTextCommand {
    text: String,
    policy: TimelinePolicy,
    placed: Option<Clip>,
}

impl AddTextCommand {
    pub fn new(text: impl Into<String>, policy: TimelinePolicy) -> Self {
        Self {
            text: text.into(),
            policy,
            placed: None,
        }
    }
}

impl Command for AddTextCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> Result<()> {
        if let Some(clip) = &self.placed {
            return timeline.insert_clip(clip.clone());
        }
        self.placed = Some(timeline.place_text(&self.text, &self.policy)?);
        Ok(())
    }

    fn undo(&mut self, timeline: &mut Timeline) -> Result<()> {
        let clip = self
            .placed
            .as_ref()
            .ok_or_else(|| CoreError::InvalidOperation("nothing was placed".into()))?;
        timeline.remove_clip(clip.id).map(|_| ())
    }

    fn description(&self) -> &str {
        "Add caption"
    }

    fn clip_id(&self) -> Option<Uuid> {
        self.placed.as_ref().map(|c| c.id)
    }
}

// ---------------------------------------------------------------------------
// RemoveClipCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RemoveClipCommand {
    clip_id: Uuid,
    removed: Option<Clip>,
}

impl RemoveClipCommand {
    pub fn new(clip_id: Uuid) -> Self {
        Self {
            clip_id,
            removed: None,
        }
    }
}

impl Command for RemoveClipCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> Result<()> {
        self.removed = Some(timeline.remove_clip(self.clip_id)?);
        Ok(())
    }

    fn undo(&mut self, timeline: &mut Timeline) -> Result<()> {
        let clip = self
            .removed
            .clone()
            .ok_or_else(|| CoreError::InvalidOperation("no removed clip saved".into()))?;
        timeline.insert_clip(clip)
    }

    fn description(&self) -> &str {
        "Remove clip"
    }

    fn clip_id(&self) -> Option<Uuid> {
        Some(self.clip_id)
    }
}

// ---------------------------------------------------------------------------
// MoveClipCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MoveClipCommand {
    clip_id: Uuid,
    new_start_us: TimeUs,
    old_start_us: Option<TimeUs>,
}

impl MoveClipCommand {
    pub fn new(clip_id: Uuid, new_start_us: TimeUs) -> Self {
        Self {
            clip_id,
            new_start_us,
            old_start_us: None,
        }
    }
}

impl Command for MoveClipCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> Result<()> {
        let old_start = find_clip(timeline, self.clip_id)?.start_us;
        timeline.move_clip(self.clip_id, self.new_start_us)?;
        self.old_start_us = Some(old_start);
        Ok(())
    }

    fn undo(&mut self, timeline: &mut Timeline) -> Result<()> {
        let old_start = self
            .old_start_us
            .ok_or_else(|| CoreError::InvalidOperation("no old start saved".into()))?;
        timeline.move_clip(self.clip_id, old_start)
    }

    fn description(&self) -> &str {
        "Move clip"
    }

    fn clip_id(&self) -> Option<Uuid> {
        Some(self.clip_id)
    }
}

// ---------------------------------------------------------------------------
// TrimClipCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TrimClipCommand {
    clip_id: Uuid,
    new_duration_us: TimeUs,
    old_duration_us: Option<TimeUs>,
}

impl TrimClipCommand {
    pub fn new(clip_id: Uuid, new_duration_us: TimeUs) -> Self {
        Self {
            clip_id,
            new_duration_us,
            old_duration_us: None,
        }
    }
}

impl Command for TrimClipCommand {
    fn execute(&mut self, timeline: &mut Timeline) -> Result<()> {
        let old_duration = find_clip(timeline, self.clip_id)?.duration_us;
        timeline.trim_clip(self.clip_id, self.new_duration_us)?;
        self.old_duration_us = Some(old_duration);
        Ok(())
    }

    fn undo(&mut self, timeline: &mut Timeline) -> Result<()> {
        let old_duration = self
            .old_duration_us
            .ok_or_else(|| CoreError::InvalidOperation("no old duration saved".into()))?;
        timeline.trim_clip(self.clip_id, old_duration)
    }

    fn description(&self) -> &str {
        "Trim clip"
    }

    fn clip_id(&self) -> Option<Uuid> {
        Some(self.clip_id)
    }
}

fn find_clip(timeline: &Timeline, clip_id: Uuid) -> Result<&Clip> {
    timeline.clip(clip_id).ok_or(CoreError::ClipNotFound(clip_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(title: &str) -> MediaRecord {
        MediaRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            mime_type: "video/mp4".into(),
            kind: MediaKind::Video,
            content: ContentRef::new("data:video/mp4;base64,AAAA"),
            preview: None,
        }
    }

    fn place(history: &mut History, tl: &mut Timeline, title: &str) -> Clip {
        let cmd = PlaceMediaCommand::new(video(title), TimelinePolicy::default());
        history.execute(Box::new(cmd), tl).unwrap();
        let id = history.last_clip_id().unwrap();
        tl.clip(id).cloned().unwrap()
    }

    #[test]
    fn undo_place_removes_exactly_that_clip() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(100);
        let first = place(&mut history, &mut tl, "a.mp4");
        let second = place(&mut history, &mut tl, "b.mp4");

        history.undo(&mut tl).unwrap();
        assert!(tl.clip(second.id).is_none());
        assert!(tl.clip(first.id).is_some());
        assert_eq!(history.redo_description(), Some("Add clip"));
    }

    #[test]
    fn redo_place_restores_same_clip() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(100);
        let clip = place(&mut history, &mut tl, "a.mp4");

        history.undo(&mut tl).unwrap();
        history.redo(&mut tl).unwrap();
        assert_eq!(tl.clip(clip.id), Some(&clip));
        assert_eq!(tl.clip_count(), 1);
    }

    #[test]
    fn remove_and_undo() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(100);
        let clip = place(&mut history, &mut tl, "a.mp4");

        history
            .execute(Box::new(RemoveClipCommand::new(clip.id)), &mut tl)
            .unwrap();
        assert!(tl.clip(clip.id).is_none());

        history.undo(&mut tl).unwrap();
        assert_eq!(tl.clip(clip.id), Some(&clip));
    }

    #[test]
    fn move_and_undo() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(100);
        let clip = place(&mut history, &mut tl, "a.mp4");

        history
            .execute(Box::new(MoveClipCommand::new(clip.id, TimeUs(8_000_000))), &mut tl)
            .unwrap();
        assert_eq!(tl.clip(clip.id).unwrap().start_us, TimeUs(8_000_000));

        history.undo(&mut tl).unwrap();
        assert_eq!(tl.clip(clip.id).unwrap().start_us, TimeUs::ZERO);
        history.redo(&mut tl).unwrap();
        assert_eq!(tl.clip(clip.id).unwrap().start_us, TimeUs(8_000_000));
    }

    #[test]
    fn trim_and_undo() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(100);
        let clip = place(&mut history, &mut tl, "a.mp4");

        history
            .execute(Box::new(TrimClipCommand::new(clip.id, TimeUs(2_000_000))), &mut tl)
            .unwrap();
        assert_eq!(tl.clip(clip.id).unwrap().duration_us, TimeUs(2_000_000));
        assert_eq!(history.undo_description(), Some("Trim clip"));

        history.undo(&mut tl).unwrap();
        assert_eq!(tl.clip(clip.id).unwrap().duration_us, TimeUs(5_000_000));
    }

    #[test]
    fn add_text_and_undo() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(100);
        history
            .execute(
                Box::new(AddTextCommand::new("Title", TimelinePolicy::default())),
                &mut tl,
            )
            .unwrap();
        assert_eq!(tl.clip_count(), 1);
        history.undo(&mut tl).unwrap();
        assert_eq!(tl.clip_count(), 0);
        history.redo(&mut tl).unwrap();
        assert_eq!(tl.clip_count(), 1);
    }

    /// Every track ordered by start, without overlap, inside the time limit.
    fn assert_track_invariants(tl: &Timeline, step: &str) {
        for track in tl.tracks() {
            for clip in &track.clips {
                assert!(clip.duration_us > TimeUs::ZERO, "{step}: empty clip");
                assert!(clip.end_us() <= TimeUs::MAX, "{step}: clip past limit");
            }
            for pair in track.clips.windows(2) {
                assert!(
                    pair[0].end_us() <= pair[1].start_us,
                    "{step}: {} and {} out of order or overlapping",
                    pair[0].label,
                    pair[1].label
                );
            }
        }
    }

    #[test]
    fn mixed_edits_keep_tracks_ordered_and_disjoint() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(100);
        let a = place(&mut history, &mut tl, "a.mp4");
        let b = place(&mut history, &mut tl, "b.mp4");
        let c = place(&mut history, &mut tl, "c.mp4");
        assert_track_invariants(&tl, "placed");

        let secs = |s: i64| TimeUs(s * TimeUs::PER_SECOND);
        let steps: [(&str, Box<dyn Command>, bool); 7] = [
            ("move a onto b", Box::new(MoveClipCommand::new(a.id, secs(3))), false),
            ("delete b", Box::new(RemoveClipCommand::new(b.id)), true),
            ("move a onto c", Box::new(MoveClipCommand::new(a.id, secs(6))), false),
            ("move a into gap", Box::new(MoveClipCommand::new(a.id, secs(5))), true),
            ("stretch c", Box::new(TrimClipCommand::new(c.id, secs(20))), true),
            ("stretch a into c", Box::new(TrimClipCommand::new(a.id, secs(6))), false),
            ("move c past limit", Box::new(MoveClipCommand::new(c.id, TimeUs::MAX)), false),
        ];
        for (step, cmd, should_succeed) in steps {
            let result = history.execute(cmd, &mut tl);
            assert_eq!(result.is_ok(), should_succeed, "{step}: {result:?}");
            assert_track_invariants(&tl, step);
        }

        // Walk all the way back, then forward again.
        while history.can_undo() {
            history.undo(&mut tl).unwrap();
            assert_track_invariants(&tl, "undo");
        }
        assert_eq!(tl.clip_count(), 0);
        while history.can_redo() {
            history.redo(&mut tl).unwrap();
            assert_track_invariants(&tl, "redo");
        }

        // A new placement after the edits still appends past the latest end.
        let d = place(&mut history, &mut tl, "d.mp4");
        assert_eq!(d.start_us, secs(30));
        assert_track_invariants(&tl, "append after edits");

        let video = tl.first_track_of_kind(TrackKind::Video).unwrap();
        let starts: Vec<_> = video.clips.iter().map(|clip| (clip.id, clip.start_us)).collect();
        assert_eq!(starts, [(a.id, secs(5)), (c.id, secs(10)), (d.id, secs(30))]);
    }

    #[test]
    fn failed_command_is_not_recorded() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(100);
        let result = history.execute(Box::new(RemoveClipCommand::new(Uuid::new_v4())), &mut tl);
        assert!(result.is_err());
        assert!(!history.can_undo());
    }

    #[test]
    fn new_command_clears_redo() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(100);
        place(&mut history, &mut tl, "a.mp4");
        history.undo(&mut tl).unwrap();
        assert!(history.can_redo());

        place(&mut history, &mut tl, "b.mp4");
        assert!(!history.can_redo());
    }

    #[test]
    fn empty_history_errors() {
        let mut tl = Timeline::new();
        let mut history = History::new(10);
        assert!(matches!(history.undo(&mut tl), Err(CoreError::NothingToUndo)));
        assert!(matches!(history.redo(&mut tl), Err(CoreError::NothingToRedo)));
    }

    #[test]
    fn history_is_bounded() {
        let mut tl = Timeline::with_default_tracks();
        let mut history = History::new(2);
        for i in 0..4 {
            place(&mut history, &mut tl, &format!("{i}.mp4"));
        }
        history.undo(&mut tl).unwrap();
        history.undo(&mut tl).unwrap();
        assert!(!history.can_undo());
        assert_eq!(tl.clip_count(), 2);
    }
}
