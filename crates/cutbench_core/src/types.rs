use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Sub};
use std::sync::Arc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TimeUs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeUs(pub i64);

impl TimeUs {
    pub const ZERO: Self = Self(0);
    pub const PER_SECOND: i64 = 1_000_000;
    /// Latest instant a clip may reach: 24 hours.
    pub const MAX: Self = Self(86_400 * Self::PER_SECOND);

    /// Saturates out-of-range input. Use `try_from_seconds` for values that
    /// come from outside.
    pub fn from_seconds(s: f64) -> Self {
        Self((s * Self::PER_SECOND as f64).round() as i64)
    }

    /// Convert caller-supplied seconds, rejecting NaN, infinities and
    /// anything beyond `MAX` in either direction.
    pub fn try_from_seconds(s: f64) -> Result<Self> {
        if !s.is_finite() || s.abs() > Self::MAX.as_seconds() {
            return Err(CoreError::InvalidOperation(format!(
                "time out of range: {s}s"
            )));
        }
        Ok(Self::from_seconds(s))
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / Self::PER_SECOND as f64
    }

    /// Whole seconds, rounded up. Negative values round toward zero.
    pub fn ceil_seconds(&self) -> i64 {
        if self.0 <= 0 {
            return self.0 / Self::PER_SECOND;
        }
        (self.0 + Self::PER_SECOND - 1) / Self::PER_SECOND
    }
}

impl Add for TimeUs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TimeUs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for TimeUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_seconds())
    }
}

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

/// Kind of an ingested asset. `Unsupported` only shows up for records that
/// came from outside the ingestion adapter carrying a kind we do not know.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
    #[serde(other)]
    Unsupported,
}

impl MediaKind {
    /// Classify a MIME type by its top-level prefix.
    pub fn from_mime(mime: &str) -> Self {
        let top = mime.split('/').next().unwrap_or("").trim().to_ascii_lowercase();
        match top.as_str() {
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            "image" => MediaKind::Image,
            _ => MediaKind::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
            MediaKind::Unsupported => "unsupported",
        }
    }
}

// ---------------------------------------------------------------------------
// ContentRef
// ---------------------------------------------------------------------------

/// Shared handle to an encoded media payload (usually a data URI).
/// Clips hold their own clone, so evicting the record keeps them playable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ContentRef(Arc<str>);

impl ContentRef {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContentRef {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// MediaRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaRecord {
    pub id: Uuid,
    pub title: String,
    pub mime_type: String,
    pub kind: MediaKind,
    pub content: ContentRef,
    pub preview: Option<ContentRef>,
}

// ---------------------------------------------------------------------------
// TrackKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
}

impl TrackKind {
    pub fn label(&self) -> &'static str {
        match self {
            TrackKind::Video => "Video",
            TrackKind::Audio => "Audio",
            TrackKind::Text => "Text",
        }
    }
}

// ---------------------------------------------------------------------------
// ColorTag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Video,
    Audio,
    Image,
    Text,
}

impl ColorTag {
    pub fn css_class(&self) -> &'static str {
        match self {
            ColorTag::Video => "bg-primary",
            ColorTag::Audio => "bg-emerald-600",
            ColorTag::Image => "bg-amber-500",
            ColorTag::Text => "bg-sky-600",
        }
    }
}

// ---------------------------------------------------------------------------
// Clip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClipSource {
    Media {
        media_id: Uuid,
        media_kind: MediaKind,
        content: ContentRef,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub id: Uuid,
    pub track_id: Uuid,
    pub source: ClipSource,
    pub start_us: TimeUs,
    pub duration_us: TimeUs,
    pub label: String,
    pub color: ColorTag,
}

impl Clip {
    pub fn end_us(&self) -> TimeUs {
        self.start_us + self.duration_us
    }

    pub fn source_media_id(&self) -> Option<Uuid> {
        match &self.source {
            ClipSource::Media { media_id, .. } => Some(*media_id),
            ClipSource::Text { .. } => None,
        }
    }

    /// Half-open spans `[start, end)` intersect.
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.start_us < other.end_us() && other.start_us < self.end_us()
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: Uuid,
    pub kind: TrackKind,
    pub display_name: String,
    /// Ordered by `start_us`, never overlapping.
    pub clips: Vec<Clip>,
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// All tracks of an editing session. Only the engines in this crate mutate it.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Timeline {
    pub(crate) tracks: Vec<Track>,
    /// First track of each kind, as an index into `tracks`.
    #[serde(skip)]
    pub(crate) first_of_kind: HashMap<TrackKind, usize>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
