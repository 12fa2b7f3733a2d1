use crate::state::EditorState;
use anyhow::{anyhow, Result};
use cutbench_core::types::{Clip, MediaKind, MediaRecord, Track, TrackKind};
use cutbench_media::assist::{
    self, EnhanceVideoInput, EnhanceVideoOutput, EnhancementLevel, GenerateThumbnailInput,
    GenerateThumbnailOutput, UnconfiguredAssist,
};
use cutbench_media::error::AssistError;
use cutbench_media::ingest::{FileSelection, ReadCompletion, SelectedFile};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// One line of input from the presentation layer.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Intent {
    Import { files: Vec<SelectedFile> },
    AddToTimeline { media_id: Uuid },
    AddText { text: String },
    SelectAt { track_index: usize, x_px: f64 },
    MoveClip { clip_id: Uuid, start_secs: f64 },
    TrimClip { clip_id: Uuid, duration_secs: f64 },
    DeleteClip { clip_id: Uuid },
    Undo,
    Redo,
    Geometry { pixels_per_second: Option<f64> },
    Timeline,
    Library,
    EvictMedia { media_id: Uuid },
    SuggestThumbnails { media_id: Uuid, description: String },
    EnhanceVideo {
        media_id: Uuid,
        #[serde(default)]
        level: EnhancementLevel,
    },
}

/// Work finished off the event loop, fed back in as its own event.
#[derive(Debug)]
pub enum ShellEvent {
    ReadDone(ReadCompletion),
    Thumbnails {
        media_id: Uuid,
        result: std::result::Result<GenerateThumbnailOutput, AssistError>,
    },
    Enhanced {
        media_id: Uuid,
        result: std::result::Result<EnhanceVideoOutput, AssistError>,
    },
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Library entry without the payload.
#[derive(Debug, Serialize)]
pub struct MediaView<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub mime_type: &'a str,
    pub kind: MediaKind,
    pub has_preview: bool,
}

impl<'a> From<&'a MediaRecord> for MediaView<'a> {
    fn from(r: &'a MediaRecord) -> Self {
        Self {
            id: r.id,
            title: &r.title,
            mime_type: &r.mime_type,
            kind: r.kind,
            has_preview: r.preview.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClipView<'a> {
    pub id: Uuid,
    pub track_id: Uuid,
    pub media_id: Option<Uuid>,
    pub label: &'a str,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub color: &'static str,
}

impl<'a> From<&'a Clip> for ClipView<'a> {
    fn from(c: &'a Clip) -> Self {
        Self {
            id: c.id,
            track_id: c.track_id,
            media_id: c.source_media_id(),
            label: &c.label,
            start_secs: c.start_us.as_seconds(),
            duration_secs: c.duration_us.as_seconds(),
            color: c.color.css_class(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackView<'a> {
    pub id: Uuid,
    pub kind: TrackKind,
    pub name: &'a str,
    pub clips: Vec<ClipView<'a>>,
}

impl<'a> From<&'a Track> for TrackView<'a> {
    fn from(t: &'a Track) -> Self {
        Self {
            id: t.id,
            kind: t.kind,
            name: &t.display_name,
            clips: t.clips.iter().map(ClipView::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Apply one intent. Reads and AI calls are spawned and report back through
/// `events`; everything else completes before this returns.
pub fn handle(
    state: &mut EditorState,
    intent: Intent,
    events: &UnboundedSender<ShellEvent>,
) -> Result<Value> {
    tracing::debug!(?intent, "intent");
    match intent {
        Intent::Import { files } => {
            let Some(pending) = state.library.begin_selection(FileSelection { files })? else {
                return Ok(json!({ "status": "nothing_selected" }));
            };
            let generation = pending.generation;
            let tx = events.clone();
            tokio::spawn(async move {
                let completion = pending.read().await;
                report(&tx, ShellEvent::ReadDone(completion));
            });
            Ok(json!({ "status": "reading", "generation": generation }))
        }
        Intent::AddToTimeline { media_id } => {
            let clip = state.add_to_timeline(media_id)?;
            Ok(json!({ "clip": ClipView::from(&clip) }))
        }
        Intent::AddText { text } => {
            let clip = state.add_text(&text)?;
            Ok(json!({ "clip": ClipView::from(&clip) }))
        }
        Intent::SelectAt { track_index, x_px } => {
            let selected = state.select_at(track_index, x_px)?;
            let clip = selected
                .and_then(|id| state.timeline.clip(id))
                .map(ClipView::from);
            Ok(json!({ "selected": clip }))
        }
        Intent::MoveClip { clip_id, start_secs } => {
            let clip = state.move_clip(clip_id, start_secs)?;
            Ok(json!({ "clip": ClipView::from(&clip) }))
        }
        Intent::TrimClip { clip_id, duration_secs } => {
            let clip = state.trim_clip(clip_id, duration_secs)?;
            Ok(json!({ "clip": ClipView::from(&clip) }))
        }
        Intent::DeleteClip { clip_id } => {
            state.delete_clip(clip_id)?;
            Ok(json!({ "deleted": clip_id }))
        }
        Intent::Undo => {
            state.undo()?;
            Ok(timeline_view(state))
        }
        Intent::Redo => {
            state.redo()?;
            Ok(timeline_view(state))
        }
        Intent::Geometry { pixels_per_second } => {
            Ok(serde_json::to_value(state.geometry(pixels_per_second)?)?)
        }
        Intent::Timeline => Ok(timeline_view(state)),
        Intent::Library => {
            let media: Vec<_> = state.library.records().iter().map(MediaView::from).collect();
            Ok(json!({ "media": media }))
        }
        Intent::EvictMedia { media_id } => {
            state
                .library
                .remove(media_id)
                .ok_or_else(|| anyhow!("media not found: {media_id}"))?;
            Ok(json!({ "evicted": media_id }))
        }
        Intent::SuggestThumbnails { media_id, description } => {
            let input = GenerateThumbnailInput {
                video_description: description,
                video_data_uri: media_content(state, media_id)?,
            };
            let tx = events.clone();
            tokio::spawn(async move {
                let result = assist::suggest_thumbnails(&UnconfiguredAssist, input).await;
                report(&tx, ShellEvent::Thumbnails { media_id, result });
            });
            Ok(json!({ "status": "generating" }))
        }
        Intent::EnhanceVideo { media_id, level } => {
            let input = EnhanceVideoInput {
                video_data_uri: media_content(state, media_id)?,
                enhancement_level: level,
            };
            let tx = events.clone();
            tokio::spawn(async move {
                let result = assist::enhance_video(&UnconfiguredAssist, input).await;
                report(&tx, ShellEvent::Enhanced { media_id, result });
            });
            Ok(json!({ "status": "enhancing", "level": level }))
        }
    }
}

/// Fold a finished background job into state. Returns the line to emit, if any.
pub fn on_event(state: &mut EditorState, event: ShellEvent) -> Option<Value> {
    match event {
        ShellEvent::ReadDone(completion) => match state.library.finish_read(completion) {
            Ok(record) => Some(json!({
                "event": "media_added",
                "media": MediaView::from(record),
            })),
            Err(e) if e.is_stale() => {
                tracing::debug!(error = %e, "discarding superseded read");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload failed");
                Some(json!({
                    "event": "upload_error",
                    "error": "Could not read the selected file.",
                    "detail": e.to_string(),
                }))
            }
        },
        ShellEvent::Thumbnails { media_id, result } => match result {
            Ok(output) => Some(json!({
                "event": "thumbnails",
                "media_id": media_id,
                "output": output,
            })),
            Err(e) => {
                tracing::warn!(error = %e, %media_id, "thumbnail generation failed");
                Some(json!({
                    "event": "thumbnails_error",
                    "media_id": media_id,
                    "error": e.to_string(),
                }))
            }
        },
        ShellEvent::Enhanced { media_id, result } => match result {
            Ok(output) => Some(json!({
                "event": "enhanced",
                "media_id": media_id,
                "output": output,
            })),
            Err(e) => {
                tracing::warn!(error = %e, %media_id, "video enhancement failed");
                Some(json!({
                    "event": "enhance_error",
                    "media_id": media_id,
                    "error": e.to_string(),
                }))
            }
        },
    }
}

/// Hand a finished job back to the event loop.
fn report(tx: &UnboundedSender<ShellEvent>, event: ShellEvent) {
    if tx.send(event).is_err() {
        tracing::debug!("event loop gone, dropping background result");
    }
}

fn media_content(state: &EditorState, media_id: Uuid) -> Result<String> {
    let media = state
        .library
        .get(media_id)
        .ok_or_else(|| anyhow!("media not found: {media_id}"))?;
    Ok(media.content.as_str().to_string())
}

fn timeline_view(state: &EditorState) -> Value {
    let tracks: Vec<_> = state.timeline.tracks().iter().map(TrackView::from).collect();
    json!({
        "tracks": tracks,
        "can_undo": state.history.can_undo(),
        "can_redo": state.history.can_redo(),
        "undo_label": state.history.undo_description(),
        "redo_label": state.history.redo_description(),
    })
}
