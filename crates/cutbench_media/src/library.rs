use crate::error::{MediaError, Result};
use crate::ingest::{self, FileSelection, PendingRead, ReadCompletion};
use cutbench_core::types::{ContentRef, MediaKind, MediaRecord};
use uuid::Uuid;

/// Ingested media, most recent first.
///
/// Every non-empty selection gets a new generation number. Only the read
/// belonging to the latest generation may add a record; anything older
/// finishing late is discarded.
#[derive(Debug, Default)]
pub struct MediaLibrary {
    records: Vec<MediaRecord>,
    latest_generation: u64,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ingesting a selection. Returns `Ok(None)` when nothing was
    /// selected. Any read still in flight is superseded, even when the new
    /// file turns out to be unsupported.
    pub fn begin_selection(&mut self, selection: FileSelection) -> Result<Option<PendingRead>> {
        let Some(file) = selection.first() else {
            return Ok(None);
        };
        self.latest_generation += 1;

        let (mime_type, kind) = ingest::classify(&file)?;
        tracing::debug!(
            generation = self.latest_generation,
            file = %file.title(),
            %mime_type,
            "ingestion started"
        );
        Ok(Some(PendingRead {
            generation: self.latest_generation,
            file,
            mime_type,
            kind,
        }))
    }

    /// Turn a finished read into a record at the front of the library.
    pub fn finish_read(&mut self, completion: ReadCompletion) -> Result<&MediaRecord> {
        if completion.generation != self.latest_generation {
            return Err(MediaError::StaleIngestion {
                generation: completion.generation,
                latest: self.latest_generation,
            });
        }
        let decoded = completion.result?;

        let content = ContentRef::from(decoded.data_uri);
        let preview = (decoded.kind == MediaKind::Image).then(|| content.clone());
        let record = MediaRecord {
            id: Uuid::new_v4(),
            title: decoded.title,
            mime_type: decoded.mime_type,
            kind: decoded.kind,
            content,
            preview,
        };
        tracing::info!(media = %record.id, title = %record.title, "media added to library");

        self.records.insert(0, record);
        Ok(&self.records[0])
    }

    /// Select, read and add in one go, for callers that do not need to
    /// interleave other events with the read.
    pub async fn ingest(&mut self, selection: FileSelection) -> Result<Option<&MediaRecord>> {
        let Some(pending) = self.begin_selection(selection)? else {
            return Ok(None);
        };
        let completion = pending.read().await;
        self.finish_read(completion).map(Some)
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&MediaRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Evict a record. Clips already placed from it keep their own content.
    pub fn remove(&mut self, id: Uuid) -> Option<MediaRecord> {
        let pos = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::SelectedFile;
    use cutbench_core::policy::TimelinePolicy;
    use cutbench_core::types::{ClipSource, Timeline};
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn select(path: &Path, mime: &str) -> FileSelection {
        FileSelection::single(SelectedFile::new(path).with_type(mime))
    }

    #[tokio::test]
    async fn ingest_adds_record_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "Clip_001.mp4", b"video-a");
        let b = write_file(&dir, "Music.mp3", b"audio-b");
        let mut library = MediaLibrary::new();

        library.ingest(select(&a, "video/mp4")).await.unwrap();
        library.ingest(select(&b, "audio/mpeg")).await.unwrap();

        let titles: Vec<_> = library.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Music.mp3", "Clip_001.mp4"]);
        assert_eq!(library.records()[0].kind, MediaKind::Audio);
        assert!(library.records()[0]
            .content
            .as_str()
            .starts_with("data:audio/mpeg;base64,"));
    }

    #[tokio::test]
    async fn image_preview_is_its_content() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "logo.png", b"\x89PNG");
        let mut library = MediaLibrary::new();

        let record = library.ingest(select(&path, "image/png")).await.unwrap().unwrap();
        assert_eq!(record.preview.as_ref(), Some(&record.content));
    }

    #[tokio::test]
    async fn video_has_no_preview() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.mp4", b"v");
        let mut library = MediaLibrary::new();

        let record = library.ingest(select(&path, "video/mp4")).await.unwrap().unwrap();
        assert!(record.preview.is_none());
    }

    #[tokio::test]
    async fn empty_selection_is_noop() {
        let mut library = MediaLibrary::new();
        let result = library.ingest(FileSelection::default()).await.unwrap();
        assert!(result.is_none());
        assert!(library.is_empty());
    }

    #[tokio::test]
    async fn only_first_file_is_ingested() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.mp4", b"a");
        let b = write_file(&dir, "b.mp4", b"b");
        let mut library = MediaLibrary::new();

        let selection = FileSelection {
            files: vec![SelectedFile::new(&a), SelectedFile::new(&b)],
        };
        library.ingest(selection).await.unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library.records()[0].title, "a.mp4");
    }

    #[test]
    fn unsupported_type_rejected_before_read() {
        let mut library = MediaLibrary::new();
        let selection = select(Path::new("/nonexistent/report.pdf"), "application/pdf");
        let result = library.begin_selection(selection);
        assert!(matches!(result, Err(MediaError::UnsupportedMediaKind(_))));
        assert!(library.is_empty());
    }

    #[tokio::test]
    async fn unreadable_file_adds_nothing() {
        let mut library = MediaLibrary::new();
        let selection = select(Path::new("/nonexistent/cutbench/a.mp4"), "video/mp4");
        let result = library.ingest(selection).await;
        assert!(matches!(result, Err(MediaError::FileRead { .. })));
        assert!(library.is_empty());
    }

    #[tokio::test]
    async fn superseded_read_is_discarded() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "first.mp4", b"a");
        let b = write_file(&dir, "second.mp4", b"b");
        let mut library = MediaLibrary::new();

        let first = library.begin_selection(select(&a, "video/mp4")).unwrap().unwrap();
        let second = library.begin_selection(select(&b, "video/mp4")).unwrap().unwrap();

        // Second read finishes first, then the stale one trails in.
        let second_done = second.read().await;
        let first_done = first.read().await;

        library.finish_read(second_done).unwrap();
        let stale = library.finish_read(first_done).unwrap_err();
        assert!(stale.is_stale());

        assert_eq!(library.len(), 1);
        assert_eq!(library.records()[0].title, "second.mp4");
    }

    #[tokio::test]
    async fn unsupported_selection_still_supersedes() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "first.mp4", b"a");
        let mut library = MediaLibrary::new();

        let first = library.begin_selection(select(&a, "video/mp4")).unwrap().unwrap();
        assert!(library
            .begin_selection(select(Path::new("/x/a.pdf"), "application/pdf"))
            .is_err());

        let done = first.read().await;
        assert!(library.finish_read(done).unwrap_err().is_stale());
        assert!(library.is_empty());
    }

    #[tokio::test]
    async fn eviction_keeps_placed_clips_playable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.mp4", b"video");
        let mut library = MediaLibrary::new();
        let record = library
            .ingest(select(&path, "video/mp4"))
            .await
            .unwrap()
            .unwrap()
            .clone();

        let mut timeline = Timeline::with_default_tracks();
        let clip = timeline
            .place_media(&record, &TimelinePolicy::default())
            .unwrap();

        assert!(library.remove(record.id).is_some());
        assert!(library.get(record.id).is_none());
        assert!(library.remove(record.id).is_none());

        match &timeline.clip(clip.id).unwrap().source {
            ClipSource::Media { content, .. } => assert_eq!(content, &record.content),
            other => panic!("unexpected source {other:?}"),
        }
    }
}
