//! Session state snapshot.

use serde::Serialize;

use vidbox_models::{Video, VideoId, VideoInfo};

/// Everything a viewer renders from a [`crate::VideoSession`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Videos in server order
    pub videos: Vec<Video>,

    /// Focused video, taken from `videos`
    pub selected_video: Option<Video>,

    /// Detail info for the focused video
    pub selected_info: Option<VideoInfo>,

    /// Video `selected_info` was loaded for
    #[serde(skip)]
    pub info_video_id: Option<VideoId>,

    /// An upload is in flight
    pub uploading: bool,

    /// Message from the last failed upload
    pub upload_error: Option<String>,

    /// An info or group box load is in flight
    pub loading_info: bool,

    /// Video currently being deleted
    pub deleting_id: Option<VideoId>,

    /// Bumped whenever a newer info load starts or the info is dropped
    #[serde(skip)]
    pub(crate) info_generation: u64,

    /// Info and group box loads in flight
    #[serde(skip)]
    pub(crate) info_loads: usize,
}

impl SessionState {
    /// Look up a listed video by id.
    pub fn video(&self, id: &VideoId) -> Option<&Video> {
        self.videos.iter().find(|v| &v.id == id)
    }

    pub fn is_selected(&self, id: &VideoId) -> bool {
        self.selected_video.as_ref().is_some_and(|v| &v.id == id)
    }

    /// Any operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.uploading || self.loading_info || self.deleting_id.is_some()
    }

    /// Drop the current info along with the id it belongs to, and
    /// invalidate any info response still in flight.
    pub(crate) fn clear_info(&mut self) {
        self.selected_info = None;
        self.info_video_id = None;
        self.info_generation += 1;
    }

    pub(crate) fn begin_info_load(&mut self) {
        self.info_loads += 1;
        self.loading_info = true;
    }

    pub(crate) fn end_info_load(&mut self) {
        self.info_loads = self.info_loads.saturating_sub(1);
        self.loading_info = self.info_loads > 0;
    }
}
