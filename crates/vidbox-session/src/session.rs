//! The video session store.
//!
//! Each operation is a short sequence of API calls. State is mutated only
//! between awaits, through [`watch::Sender::send_modify`], so no lock is
//! ever held across a request.
//!
//! Info loads are sequenced by a generation counter kept in the state:
//! every new load (and every change that clears the info) bumps it, and a
//! response is applied only if its generation is still the latest. The
//! comparison and the write happen in the same `send_modify` call, so a
//! slow response for a previously selected video can never overwrite the
//! info of the current one, even on a multi-threaded runtime.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use vidbox_client::{ApiClientConfig, HttpVideoApi, UploadFile, VideoApi};
use vidbox_models::{GroupAnnotations, Video, VideoId};

use crate::error::{SessionError, SessionResult};
use crate::state::SessionState;

struct Inner {
    api: Arc<dyn VideoApi>,
    state: watch::Sender<SessionState>,
}

#[derive(Default)]
enum GroupsOutcome {
    Applied,
    Superseded,
    #[default]
    NoInfo,
}

/// Observable store over the video API.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct VideoSession {
    inner: Arc<Inner>,
}

impl VideoSession {
    /// Create a session over any [`VideoApi`].
    pub fn new(api: Arc<dyn VideoApi>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                state: watch::Sender::new(SessionState::default()),
            }),
        }
    }

    /// Create a session backed by the HTTP client.
    pub fn with_config(config: ApiClientConfig) -> SessionResult<Self> {
        Ok(Self::new(Arc::new(HttpVideoApi::new(config)?)))
    }

    /// Create from environment variables.
    pub fn from_env() -> SessionResult<Self> {
        Self::with_config(ApiClientConfig::from_env())
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Refresh the video list.
    ///
    /// If nothing is selected yet, the first video is selected and its info
    /// loaded. A failure of that follow-up load does not fail the refresh.
    pub async fn list_videos(&self) -> SessionResult<()> {
        let videos = match self.inner.api.list_videos().await {
            Ok(videos) => videos,
            Err(e) => {
                warn!(error = %e, "Failed to load videos");
                return Err(e.into());
            }
        };

        debug!(count = videos.len(), "Loaded videos");

        let auto_selected = self.update(|s| {
            s.videos = videos;
            if s.selected_video.is_none() {
                s.selected_video = s.videos.first().cloned();
                s.selected_video.clone()
            } else {
                None
            }
        });

        if let Some(first) = auto_selected {
            debug!(video_id = %first.id, "Auto-selecting first video");
            let _ = self.load_video_info(&first.id).await;
        }

        Ok(())
    }

    /// Focus a listed video and load its info.
    pub async fn select_video(&self, id: &VideoId) -> SessionResult<()> {
        let found = self.update(|s| {
            let found = s.video(id).cloned();
            if found.is_some() {
                s.selected_video = found.clone();
            }
            found
        });

        match found {
            Some(video) => self.load_video_info(&video.id).await,
            None => Err(SessionError::UnknownVideo(id.clone())),
        }
    }

    /// Load detail info and group boxes for a video.
    ///
    /// The current info is cleared first. Group boxes are best-effort: if
    /// they cannot be fetched the info is still published, with no
    /// annotations. If a newer load starts before this one finishes, this
    /// one's result is dropped.
    pub async fn load_video_info(&self, id: &VideoId) -> SessionResult<()> {
        let generation = self.update(|s| {
            s.begin_info_load();
            s.clear_info();
            s.info_generation
        });
        let _loading = scopeguard::guard((), |_| self.update(|s| s.end_info_load()));

        let mut info = match self.inner.api.video_info(id).await {
            Ok(info) => info,
            Err(e) => {
                warn!(video_id = %id, error = %e, "Failed to load video info");
                return Err(e.into());
            }
        };

        info.group_annotations = self.fetch_group_boxes_or_empty(id).await;

        debug!(video_id = %id, boxes = info.box_count(), "Loaded video info");

        let applied = self.update(|s| {
            if s.info_generation != generation {
                return false;
            }
            s.selected_info = Some(info);
            s.info_video_id = Some(id.clone());
            true
        });

        if !applied {
            debug!(video_id = %id, "Discarding superseded video info");
        }
        Ok(())
    }

    /// Re-fetch only the group boxes of the currently loaded info.
    ///
    /// On failure the existing annotations are kept.
    pub async fn load_video_groups(&self, id: &VideoId) -> SessionResult<()> {
        let generation = self.update(|s| {
            s.begin_info_load();
            s.info_generation
        });
        let _loading = scopeguard::guard((), |_| self.update(|s| s.end_info_load()));

        let frames = match self.inner.api.group_boxes(id).await {
            Ok(frames) => frames,
            Err(e) => {
                warn!(video_id = %id, error = %e, "Failed to load video group boxes");
                return Err(e.into());
            }
        };

        let outcome = self.update(|s| {
            if s.info_generation != generation {
                return GroupsOutcome::Superseded;
            }
            match (&mut s.selected_info, &s.info_video_id) {
                (Some(info), Some(loaded_for)) if loaded_for == id => {
                    info.group_annotations = frames;
                    GroupsOutcome::Applied
                }
                _ => GroupsOutcome::NoInfo,
            }
        });

        match outcome {
            GroupsOutcome::Applied => Ok(()),
            GroupsOutcome::Superseded => {
                debug!(video_id = %id, "Discarding group boxes for superseded info");
                Ok(())
            }
            GroupsOutcome::NoInfo => {
                warn!(video_id = %id, "No info loaded for video, discarding group boxes");
                Err(SessionError::NoInfoLoaded(id.clone()))
            }
        }
    }

    /// Upload a new video, then refresh the list and focus the new entry.
    ///
    /// `None` is a no-op. On failure the server's message is stored in
    /// `upload_error`.
    pub async fn upload_video(&self, file: Option<UploadFile>) -> SessionResult<Option<Video>> {
        let Some(file) = file else {
            return Ok(None);
        };

        self.update(|s| {
            s.uploading = true;
            s.upload_error = None;
        });
        let _uploading = scopeguard::guard((), |_| self.update(|s| s.uploading = false));

        let created = match self.inner.api.upload_video(file).await {
            Ok(created) => created,
            Err(e) => {
                let message = e.message();
                warn!(error = %e, "Video upload failed");
                self.update(|s| s.upload_error = Some(message));
                return Err(e.into());
            }
        };

        info!(video_id = %created.id, "Video uploaded");

        let _ = self.list_videos().await;

        // Re-resolve against the refreshed list, not the upload response.
        self.update(|s| s.selected_video = s.video(&created.id).cloned());
        let _ = self.load_video_info(&created.id).await;

        Ok(Some(created))
    }

    /// Delete a video on the server and drop it from the list.
    ///
    /// If it was focused, focus moves to the first remaining video.
    pub async fn delete_video(&self, video: &Video) -> SessionResult<()> {
        let id = video.id.clone();

        self.update(|s| s.deleting_id = Some(id.clone()));
        let _deleting = scopeguard::guard((), |_| self.update(|s| s.deleting_id = None));

        if let Err(e) = self.inner.api.delete_video(&id).await {
            warn!(video_id = %id, error = %e, "Failed to delete video");
            return Err(e.into());
        }

        info!(video_id = %id, "Video deleted");

        let next = self.update(|s| {
            s.videos.retain(|v| v.id != id);
            if s.is_selected(&id) {
                s.selected_video = s.videos.first().cloned();
                s.clear_info();
                s.selected_video.clone()
            } else {
                None
            }
        });

        if let Some(next) = next {
            let _ = self.load_video_info(&next.id).await;
        }

        Ok(())
    }

    /// Dismiss the last upload error.
    pub fn clear_upload_error(&self) {
        self.update(|s| s.upload_error = None);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn update<R: Default>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut result = R::default();
        self.inner.state.send_modify(|state| result = f(state));
        result
    }

    async fn fetch_group_boxes_or_empty(&self, id: &VideoId) -> GroupAnnotations {
        match self.inner.api.group_boxes(id).await {
            Ok(frames) => frames,
            Err(e) => {
                warn!(video_id = %id, error = %e, "Failed to load group boxes");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::json;
    use vidbox_client::{ApiError, ApiResult};
    use vidbox_models::VideoInfo;

    mock! {
        pub Api {}

        #[async_trait]
        impl VideoApi for Api {
            async fn list_videos(&self) -> ApiResult<Vec<Video>>;
            async fn video_info(&self, id: &VideoId) -> ApiResult<VideoInfo>;
            async fn group_boxes(&self, id: &VideoId) -> ApiResult<GroupAnnotations>;
            async fn upload_video(&self, file: UploadFile) -> ApiResult<Video>;
            async fn delete_video(&self, id: &VideoId) -> ApiResult<()>;
        }
    }

    fn info_with(key: &str, value: serde_json::Value) -> VideoInfo {
        let mut info = VideoInfo::default();
        info.fields.insert(key.to_string(), value);
        info
    }

    fn session(api: MockApi) -> VideoSession {
        VideoSession::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_upload_none_makes_no_calls() {
        // No expectations: any API call would panic.
        let session = session(MockApi::new());
        let before = session.snapshot();

        let result = session.upload_video(None).await.unwrap();

        assert!(result.is_none());
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test]
    async fn test_list_failure_keeps_stale_list() {
        let mut api = MockApi::new();
        let mut calls = 0;
        api.expect_list_videos().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![Video::new("a")])
            } else {
                Err(ApiError::from_http_status(500, "boom"))
            }
        });
        api.expect_video_info()
            .returning(|_| Ok(info_with("fps", json!(25))));
        api.expect_group_boxes().returning(|_| Ok(vec![]));

        let session = session(api);
        session.list_videos().await.unwrap();
        assert!(session.list_videos().await.is_err());

        let state = session.snapshot();
        assert_eq!(state.videos, vec![Video::new("a")]);
        assert_eq!(state.selected_video, Some(Video::new("a")));
    }

    #[tokio::test]
    async fn test_list_keeps_existing_selection() {
        let mut api = MockApi::new();
        api.expect_list_videos()
            .returning(|| Ok(vec![Video::new("a"), Video::new("b")]));
        api.expect_video_info()
            .times(2)
            .returning(|id| Ok(info_with("id", json!(id.as_str()))));
        api.expect_group_boxes().returning(|_| Ok(vec![]));

        let session = session(api);
        session.list_videos().await.unwrap();
        session.select_video(&VideoId::from("b")).await.unwrap();
        session.list_videos().await.unwrap();

        let state = session.snapshot();
        assert_eq!(state.selected_video, Some(Video::new("b")));
        assert_eq!(state.info_video_id, Some(VideoId::from("b")));
    }

    #[tokio::test]
    async fn test_select_unknown_video() {
        let session = session(MockApi::new());
        let err = session.select_video(&VideoId::from("zz")).await.unwrap_err();
        assert!(matches!(err, SessionError::UnknownVideo(_)));
        assert!(session.snapshot().selected_video.is_none());
    }

    #[tokio::test]
    async fn test_info_failure_leaves_info_absent_and_flag_reset() {
        let mut api = MockApi::new();
        api.expect_video_info()
            .returning(|_| Err(ApiError::from_http_status(404, "missing")));
        api.expect_group_boxes().never();

        let session = session(api);
        let result = session.load_video_info(&VideoId::from("x")).await;

        assert!(result.is_err());
        let state = session.snapshot();
        assert!(state.selected_info.is_none());
        assert!(!state.loading_info);
    }

    #[tokio::test]
    async fn test_group_box_failure_degrades_to_empty() {
        let mut api = MockApi::new();
        api.expect_video_info()
            .returning(|_| Ok(info_with("fps", json!(30))));
        api.expect_group_boxes()
            .returning(|_| Err(ApiError::from_http_status(500, "no boxes")));

        let session = session(api);
        session.load_video_info(&VideoId::from("v")).await.unwrap();

        let info = session.snapshot().selected_info.unwrap();
        assert!(info.group_annotations.is_empty());
        assert_eq!(info.field("fps"), Some(&json!(30)));
    }

    #[tokio::test]
    async fn test_load_groups_without_info_is_rejected() {
        let mut api = MockApi::new();
        api.expect_group_boxes().returning(|_| Ok(vec![vec![]]));

        let session = session(api);
        let err = session
            .load_video_groups(&VideoId::from("v"))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::NoInfoLoaded(_)));
        assert!(!session.snapshot().loading_info);
    }

    #[tokio::test]
    async fn test_load_groups_failure_keeps_previous_annotations() {
        let mut api = MockApi::new();
        let mut calls = 0;
        api.expect_video_info().returning(|_| Ok(VideoInfo::default()));
        api.expect_group_boxes().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(serde_json::from_value(json!([[{"id": 1, "bbox": [0, 0, 1, 1], "frameNo": 0}]]))
                    .unwrap())
            } else {
                Err(ApiError::InvalidResponse("reset".into()))
            }
        });

        let session = session(api);
        let id = VideoId::from("v");
        session.load_video_info(&id).await.unwrap();
        assert!(session.load_video_groups(&id).await.is_err());

        let info = session.snapshot().selected_info.unwrap();
        assert_eq!(info.box_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_unselected_video_keeps_selection() {
        let mut api = MockApi::new();
        api.expect_list_videos()
            .returning(|| Ok(vec![Video::new("a"), Video::new("b")]));
        api.expect_video_info()
            .times(1)
            .returning(|_| Ok(VideoInfo::default()));
        api.expect_group_boxes().returning(|_| Ok(vec![]));
        api.expect_delete_video().returning(|_| Ok(()));

        let session = session(api);
        session.list_videos().await.unwrap();
        session.delete_video(&Video::new("b")).await.unwrap();

        let state = session.snapshot();
        assert_eq!(state.videos, vec![Video::new("a")]);
        assert_eq!(state.selected_video, Some(Video::new("a")));
        assert!(state.selected_info.is_some());
        assert!(state.deleting_id.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let mut api = MockApi::new();
        api.expect_list_videos().returning(|| Ok(vec![]));

        let session = session(api);
        let mut rx = session.subscribe();
        assert!(!rx.has_changed().unwrap());

        session.list_videos().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().videos.is_empty());
    }

    #[tokio::test]
    async fn test_clear_upload_error() {
        let mut api = MockApi::new();
        api.expect_upload_video()
            .returning(|_| Err(ApiError::from_http_status(413, "too large")));

        let session = session(api);
        let _ = session
            .upload_video(Some(UploadFile::new("a.mp4", vec![0u8])))
            .await;
        assert_eq!(session.snapshot().upload_error.as_deref(), Some("too large"));

        session.clear_upload_error();
        assert!(session.snapshot().upload_error.is_none());
    }
}
