//! Contract for the generative-AI helpers (thumbnail suggestions and video
//! enhancement). The models live behind an external service; this module only
//! fixes the request/response shapes and checks them on both sides of the call.

use crate::data_uri::DataUri;
use crate::error::AssistError;
use cutbench_core::types::MediaKind;
use serde::{Deserialize, Serialize};
use std::future::Future;

pub type Result<T> = std::result::Result<T, AssistError>;

// ---------------------------------------------------------------------------
// Thumbnails
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateThumbnailInput {
    pub video_description: String,
    /// A representative frame (or the video itself) as a base64 data URI.
    pub video_data_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailSuggestion {
    pub thumbnail_data_uri: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateThumbnailOutput {
    pub thumbnail_suggestions: Vec<ThumbnailSuggestion>,
}

// ---------------------------------------------------------------------------
// Enhancement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementLevel {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceVideoInput {
    pub video_data_uri: String,
    #[serde(default)]
    pub enhancement_level: EnhancementLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceVideoOutput {
    pub enhanced_video_data_uri: String,
    pub enhancement_details: String,
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

pub trait ThumbnailGenerator {
    fn generate_thumbnails(
        &self,
        input: GenerateThumbnailInput,
    ) -> impl Future<Output = Result<GenerateThumbnailOutput>> + Send;
}

pub trait VideoEnhancer {
    fn enhance_video(
        &self,
        input: EnhanceVideoInput,
    ) -> impl Future<Output = Result<EnhanceVideoOutput>> + Send;
}

/// Stand-in used when no AI service is wired up. Every call fails with a
/// message the user can act on.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredAssist;

const NOT_CONFIGURED: &str = "AI assistance is not configured for this workbench";

impl ThumbnailGenerator for UnconfiguredAssist {
    fn generate_thumbnails(
        &self,
        _input: GenerateThumbnailInput,
    ) -> impl Future<Output = Result<GenerateThumbnailOutput>> + Send {
        std::future::ready(Err(AssistError::Failed(NOT_CONFIGURED.into())))
    }
}

impl VideoEnhancer for UnconfiguredAssist {
    fn enhance_video(
        &self,
        _input: EnhanceVideoInput,
    ) -> impl Future<Output = Result<EnhanceVideoOutput>> + Send {
        std::future::ready(Err(AssistError::Failed(NOT_CONFIGURED.into())))
    }
}

// ---------------------------------------------------------------------------
// Checked calls
// ---------------------------------------------------------------------------

fn visual_data_uri(uri: &str, what: &str) -> Result<()> {
    let parsed =
        DataUri::parse(uri).map_err(|e| AssistError::InvalidInput(format!("{what}: {e}")))?;
    match parsed.media_kind() {
        MediaKind::Video | MediaKind::Image => Ok(()),
        _ => Err(AssistError::InvalidInput(format!(
            "{what} must be a video or image, got {}",
            parsed.mime_type
        ))),
    }
}

/// Validate the request, call the generator and validate what comes back.
pub async fn suggest_thumbnails<G: ThumbnailGenerator>(
    generator: &G,
    input: GenerateThumbnailInput,
) -> Result<GenerateThumbnailOutput> {
    if input.video_description.trim().is_empty() {
        return Err(AssistError::InvalidInput("video description is empty".into()));
    }
    visual_data_uri(&input.video_data_uri, "video data")?;

    let output = generator.generate_thumbnails(input).await?;
    if output.thumbnail_suggestions.is_empty() {
        return Err(AssistError::Failed(
            "thumbnail generation did not return any image".into(),
        ));
    }
    for suggestion in &output.thumbnail_suggestions {
        let parsed = DataUri::parse(&suggestion.thumbnail_data_uri)
            .map_err(|e| AssistError::Failed(format!("thumbnail is not a usable image: {e}")))?;
        if parsed.media_kind() != MediaKind::Image {
            return Err(AssistError::Failed(format!(
                "thumbnail has type {}, expected an image",
                parsed.mime_type
            )));
        }
        parsed
            .decode()
            .map_err(|e| AssistError::Failed(format!("thumbnail is not a usable image: {e}")))?;
    }
    Ok(output)
}

/// Validate the request, call the enhancer and check the returned video.
pub async fn enhance_video<E: VideoEnhancer>(
    enhancer: &E,
    input: EnhanceVideoInput,
) -> Result<EnhanceVideoOutput> {
    visual_data_uri(&input.video_data_uri, "video data")?;
    let output = enhancer.enhance_video(input).await?;
    DataUri::parse(&output.enhanced_video_data_uri)
        .and_then(|uri| uri.decode())
        .map_err(|e| AssistError::Failed(format!("enhanced video is not usable: {e}")))?;
    Ok(output)
}
