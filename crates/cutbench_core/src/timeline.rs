use crate::types::*;
use uuid::Uuid;

impl Track {
    pub fn new(kind: TrackKind, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            display_name: display_name.into(),
            clips: vec![],
        }
    }

    /// End of the last clip on the track, or zero when empty.
    pub fn end_us(&self) -> TimeUs {
        self.clips
            .iter()
            .map(Clip::end_us)
            .max()
            .unwrap_or(TimeUs::ZERO)
    }

    /// Whether `candidate` could sit on this track without overlapping any
    /// clip other than `ignore`.
    pub(crate) fn has_room_for(&self, candidate: &Clip, ignore: Option<Uuid>) -> bool {
        self.clips
            .iter()
            .filter(|c| Some(c.id) != ignore)
            .all(|c| !c.overlaps(candidate))
    }

    pub(crate) fn sort_clips(&mut self) {
        self.clips.sort_by_key(|c| c.start_us);
    }
}

impl Timeline {
    /// An empty timeline without any tracks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session start layout: one video, one audio and one text track.
    pub fn with_default_tracks() -> Self {
        let mut timeline = Self::new();
        timeline.add_track(TrackKind::Video);
        timeline.add_track(TrackKind::Audio);
        timeline.add_track(TrackKind::Text);
        timeline
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, track_id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    /// The first track of `kind`, in creation order.
    pub fn first_track_of_kind(&self, kind: TrackKind) -> Option<&Track> {
        self.first_of_kind.get(&kind).map(|&idx| &self.tracks[idx])
    }

    pub fn clip(&self, clip_id: Uuid) -> Option<&Clip> {
        self.find_clip_location(clip_id)
            .map(|(ti, ci)| &self.tracks[ti].clips[ci])
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clips.len()).sum()
    }

    /// End of the latest clip across every track.
    pub fn end_us(&self) -> TimeUs {
        self.tracks
            .iter()
            .map(Track::end_us)
            .max()
            .unwrap_or(TimeUs::ZERO)
    }

    /// Append a new track named `"{Kind} Track {n}"`, where `n` counts the
    /// existing tracks of that kind plus one. Returns its id.
    pub fn add_track(&mut self, kind: TrackKind) -> Uuid {
        self.push_track(kind)
    }

    /// Index of the first track of `kind`, creating one if none exists.
    pub(crate) fn ensure_track(&mut self, kind: TrackKind) -> usize {
        if let Some(&idx) = self.first_of_kind.get(&kind) {
            return idx;
        }
        self.push_track(kind);
        self.tracks.len() - 1
    }

    fn push_track(&mut self, kind: TrackKind) -> Uuid {
        let n = self.tracks.iter().filter(|t| t.kind == kind).count() + 1;
        let track = Track::new(kind, format!("{} Track {}", kind.label(), n));
        let id = track.id;
        tracing::debug!(track = %track.display_name, %id, "track created");

        self.tracks.push(track);
        // Tracks are only ever appended, so an existing entry stays the first.
        self.first_of_kind
            .entry(kind)
            .or_insert(self.tracks.len() - 1);
        id
    }

    pub(crate) fn track_index(&self, track_id: Uuid) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track_id)
    }

    /// Find the (track_index, clip_index) for a given clip id.
    pub(crate) fn find_clip_location(&self, clip_id: Uuid) -> Option<(usize, usize)> {
        for (ti, track) in self.tracks.iter().enumerate() {
            if let Some(ci) = track.clips.iter().position(|c| c.id == clip_id) {
                return Some((ti, ci));
            }
        }
        None
    }
}
