use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use training_core::model::{SlideProgress, VideoId, VideoProgress};
use training_core::Clock;

use crate::kv::{KeyValueStore, StorageError};

/// Storage key for the singleton slide-progress record.
pub const SLIDE_PROGRESS_KEY: &str = "slide-progress";
/// Storage key for the video-progress collection.
pub const VIDEO_PROGRESS_KEY: &str = "video-progress";

/// Persisted shape for slide progress.
///
/// Field names are camelCase to stay byte-compatible with the JSON written
/// by earlier releases. `progressPercent` is written for readers of the raw
/// blob but ignored on load; the domain type always derives it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlideProgressRecord {
    total_slides: u32,
    viewed_slides: Vec<u32>,
    current_slide_index: u32,
    progress_percent: f64,
    last_updated: DateTime<Utc>,
}

impl SlideProgressRecord {
    fn from_progress(progress: &SlideProgress) -> Self {
        Self {
            total_slides: progress.total_slides(),
            viewed_slides: progress.viewed_slides().to_vec(),
            current_slide_index: progress.current_slide_index(),
            progress_percent: progress.percent(),
            last_updated: progress.last_updated(),
        }
    }

    fn into_progress(self) -> Option<SlideProgress> {
        SlideProgress::from_persisted(
            self.total_slides,
            self.viewed_slides,
            self.current_slide_index,
            self.last_updated,
        )
        .map_err(|err| warn!(%err, "discarding invalid slide progress record"))
        .ok()
    }
}

/// Persisted shape for one video's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoProgressRecord {
    video_id: String,
    current_time: f64,
    duration: f64,
    completed: bool,
    last_updated: DateTime<Utc>,
}

impl VideoProgressRecord {
    fn from_progress(progress: &VideoProgress) -> Self {
        Self {
            video_id: progress.video_id().as_str().to_owned(),
            current_time: progress.current_time(),
            duration: progress.duration(),
            completed: progress.completed(),
            last_updated: progress.last_updated(),
        }
    }

    fn into_progress(self) -> Option<VideoProgress> {
        VideoProgress::from_persisted(
            VideoId::new(self.video_id),
            self.current_time,
            self.duration,
            self.completed,
            self.last_updated,
        )
        .map_err(|err| warn!(%err, "discarding invalid video progress record"))
        .ok()
    }
}

/// Data access for the two persisted progress records.
///
/// Pure persistence, no gating policy: reads degrade to "no prior
/// progress" when the stored blob is missing or malformed, writes are full
/// overwrites stamped with the store's clock.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self { kv, clock }
    }

    /// Store backed by the in-memory fake, for tests and prototyping.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(Arc::new(crate::kv::InMemoryStore::new()), clock)
    }

    /// Load the slide progress, or `None` when absent or unreadable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures; malformed JSON is
    /// treated as no prior progress.
    pub async fn slide_progress(&self) -> Result<Option<SlideProgress>, StorageError> {
        let Some(raw) = self.kv.get(SLIDE_PROGRESS_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<SlideProgressRecord>(&raw) {
            Ok(record) => Ok(record.into_progress()),
            Err(err) => {
                warn!(%err, key = SLIDE_PROGRESS_KEY, "malformed progress blob, starting fresh");
                Ok(None)
            }
        }
    }

    /// Stamp and persist the slide progress (full overwrite).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub async fn save_slide_progress(
        &self,
        progress: &mut SlideProgress,
    ) -> Result<(), StorageError> {
        progress.stamp(self.clock.now());
        let record = SlideProgressRecord::from_progress(progress);
        let raw = serde_json::to_string(&record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(SLIDE_PROGRESS_KEY, &raw).await
    }

    /// Build, persist and return a fresh slide progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn reset_slide_progress(
        &self,
        total_slides: u32,
    ) -> Result<SlideProgress, StorageError> {
        let mut progress = SlideProgress::reset(total_slides, self.clock.now());
        self.save_slide_progress(&mut progress).await?;
        Ok(progress)
    }

    /// Look up the saved progress for one video.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures.
    pub async fn video_progress(
        &self,
        video_id: &VideoId,
    ) -> Result<Option<VideoProgress>, StorageError> {
        let all = self.all_video_progress().await?;
        Ok(all.into_iter().find(|p| p.video_id() == video_id))
    }

    /// All saved video progress records. Malformed blobs read as empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend failures.
    pub async fn all_video_progress(&self) -> Result<Vec<VideoProgress>, StorageError> {
        let Some(raw) = self.kv.get(VIDEO_PROGRESS_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<VideoProgressRecord>>(&raw) {
            Ok(records) => Ok(records
                .into_iter()
                .filter_map(VideoProgressRecord::into_progress)
                .collect()),
            Err(err) => {
                warn!(%err, key = VIDEO_PROGRESS_KEY, "malformed progress blob, starting fresh");
                Ok(Vec::new())
            }
        }
    }

    /// Persist one video's progress: replace the entry with the same id, or
    /// append a new one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub async fn save_video_progress(&self, progress: &VideoProgress) -> Result<(), StorageError> {
        let mut all = self.all_video_progress().await?;
        let stamped = VideoProgress::from_persisted(
            progress.video_id().clone(),
            progress.current_time(),
            progress.duration(),
            progress.completed(),
            self.clock.now(),
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

        match all
            .iter_mut()
            .find(|existing| existing.video_id() == progress.video_id())
        {
            Some(existing) => *existing = stamped,
            None => all.push(stamped),
        }

        let records: Vec<VideoProgressRecord> =
            all.iter().map(VideoProgressRecord::from_progress).collect();
        let raw = serde_json::to_string(&records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(VIDEO_PROGRESS_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryStore;
    use training_core::time::{fixed_clock, fixed_now};

    fn store_with_kv() -> (ProgressStore, Arc<InMemoryStore>) {
        let kv = Arc::new(InMemoryStore::new());
        (ProgressStore::new(kv.clone(), fixed_clock()), kv)
    }

    #[tokio::test]
    async fn slide_progress_round_trips() {
        let (store, _kv) = store_with_kv();
        assert!(store.slide_progress().await.unwrap().is_none());

        let mut progress = store.reset_slide_progress(5).await.unwrap();
        progress.record_view(1, fixed_now()).unwrap();
        progress.record_view(2, fixed_now()).unwrap();
        store.save_slide_progress(&mut progress).await.unwrap();

        let loaded = store.slide_progress().await.unwrap().unwrap();
        assert_eq!(loaded.total_slides(), 5);
        assert_eq!(loaded.viewed_slides(), &[1, 2]);
        assert_eq!(loaded.percent(), 40.0);
    }

    #[tokio::test]
    async fn persisted_json_keeps_the_historical_shape() {
        let (store, kv) = store_with_kv();
        store.reset_slide_progress(3).await.unwrap();

        let raw = kv.get(SLIDE_PROGRESS_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["totalSlides"], 3);
        assert_eq!(value["currentSlideIndex"], 1);
        assert_eq!(value["progressPercent"], 0.0);
        assert!(value["viewedSlides"].as_array().unwrap().is_empty());
        assert!(value["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn malformed_slide_blob_reads_as_absent() {
        let (store, kv) = store_with_kv();
        kv.set(SLIDE_PROGRESS_KEY, "{not json").await.unwrap();
        assert!(store.slide_progress().await.unwrap().is_none());

        kv.set(SLIDE_PROGRESS_KEY, r#"{"unexpected":"shape"}"#)
            .await
            .unwrap();
        assert!(store.slide_progress().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inconsistent_slide_blob_reads_as_absent() {
        let (store, kv) = store_with_kv();
        // Viewed slide outside the deck.
        kv.set(
            SLIDE_PROGRESS_KEY,
            r#"{"totalSlides":3,"viewedSlides":[9],"currentSlideIndex":1,"progressPercent":0,"lastUpdated":"2024-07-03T09:46:40Z"}"#,
        )
        .await
        .unwrap();
        assert!(store.slide_progress().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_video_progress_replaces_by_id() {
        let (store, _kv) = store_with_kv();
        let id = VideoId::new("intro");

        let first = VideoProgress::at_position(id.clone(), 10.0, 120.0, fixed_now());
        store.save_video_progress(&first).await.unwrap();
        let second = VideoProgress::at_position(id.clone(), 40.0, 120.0, fixed_now());
        store.save_video_progress(&second).await.unwrap();

        let all = store.all_video_progress().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].current_time(), 40.0);

        let other = VideoProgress::at_position(VideoId::new("outro"), 5.0, 60.0, fixed_now());
        store.save_video_progress(&other).await.unwrap();
        assert_eq!(store.all_video_progress().await.unwrap().len(), 2);

        let looked_up = store.video_progress(&id).await.unwrap().unwrap();
        assert_eq!(looked_up.current_time(), 40.0);
    }

    #[tokio::test]
    async fn malformed_video_blob_reads_as_empty() {
        let (store, kv) = store_with_kv();
        kv.set(VIDEO_PROGRESS_KEY, "[[[").await.unwrap();
        assert!(store.all_video_progress().await.unwrap().is_empty());
    }
}
