use crate::data_uri;
use crate::error::{MediaError, Result};
use cutbench_core::types::MediaKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// One file picked by the user, with the content type the picker declared.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub declared_type: Option<String>,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
            declared_type: None,
        }
    }

    pub fn with_type(mut self, mime: impl Into<String>) -> Self {
        self.declared_type = Some(mime.into());
        self
    }

    /// Display name: the explicit name, else the path's file name.
    pub fn title(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| {
                self.path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "untitled".to_string())
    }

    /// The declared MIME type, falling back to a guess from the extension.
    pub fn mime_type(&self) -> Option<String> {
        self.declared_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| guess_mime_from_extension(&self.path).map(str::to_string))
    }
}

/// A file-picker event. Only the first file is ever ingested.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileSelection {
    pub files: Vec<SelectedFile>,
}

impl FileSelection {
    pub fn single(file: SelectedFile) -> Self {
        Self { files: vec![file] }
    }

    pub fn first(self) -> Option<SelectedFile> {
        self.files.into_iter().next()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Map a file extension onto the MIME type we would expect for it.
pub fn guess_mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let mime = match ext.as_str() {
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

/// Accept only `video/*`, `audio/*` and `image/*`.
pub fn classify(file: &SelectedFile) -> Result<(String, MediaKind)> {
    let mime = file.mime_type().ok_or_else(|| {
        MediaError::UnsupportedMediaKind(format!("unknown type for {}", file.title()))
    })?;
    match MediaKind::from_mime(&mime) {
        MediaKind::Unsupported => Err(MediaError::UnsupportedMediaKind(mime)),
        kind => Ok((mime, kind)),
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// File contents turned into an addressable payload, ready to become a record.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMedia {
    pub title: String,
    pub mime_type: String,
    pub kind: MediaKind,
    pub data_uri: String,
}

/// A classified file waiting to be read, tagged with the selection it came from.
#[derive(Debug, Clone)]
pub struct PendingRead {
    pub generation: u64,
    pub file: SelectedFile,
    pub mime_type: String,
    pub kind: MediaKind,
}

/// Outcome of a `PendingRead`, handed back to the library.
#[derive(Debug)]
pub struct ReadCompletion {
    pub generation: u64,
    pub result: Result<DecodedMedia>,
}

impl PendingRead {
    /// Read the file and encode it as a data URI.
    pub async fn read(self) -> ReadCompletion {
        let title = self.file.title();
        let result = decode_file(&self.file.path, title, self.mime_type, self.kind).await;
        ReadCompletion {
            generation: self.generation,
            result,
        }
    }
}

async fn decode_file(
    path: &Path,
    title: String,
    mime_type: String,
    kind: MediaKind,
) -> Result<DecodedMedia> {
    let bytes = tokio::fs::read(path).await.map_err(|source| MediaError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "file read");

    Ok(DecodedMedia {
        title,
        data_uri: data_uri::encode(&mime_type, &bytes),
        mime_type,
        kind,
    })
}
