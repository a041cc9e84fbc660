//! Video API HTTP client.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use vidbox_models::{GroupAnnotations, Video, VideoId, VideoInfo};

use crate::config::ApiClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_request, TRANSPORT_ERROR_STATUS};
use crate::upload::UploadFile;

/// The video annotation server's endpoints.
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// `GET /videos`
    async fn list_videos(&self) -> ApiResult<Vec<Video>>;

    /// `GET /videos/{id}/info`
    async fn video_info(&self, id: &VideoId) -> ApiResult<VideoInfo>;

    /// `GET /videos/{id}/group_boxes`
    async fn group_boxes(&self, id: &VideoId) -> ApiResult<GroupAnnotations>;

    /// `POST /videos` (multipart)
    async fn upload_video(&self, file: UploadFile) -> ApiResult<Video>;

    /// `DELETE /videos/{id}`
    async fn delete_video(&self, id: &VideoId) -> ApiResult<()>;
}

/// reqwest-backed [`VideoApi`].
#[derive(Clone)]
pub struct HttpVideoApi {
    http: Client,
    config: ApiClientConfig,
}

impl HttpVideoApi {
    /// Create a new client.
    pub fn new(config: ApiClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("vidbox-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::new(ApiClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn videos_url(&self) -> String {
        format!("{}/videos", self.config.base_url)
    }

    fn video_url(&self, id: &VideoId, suffix: &str) -> String {
        format!(
            "{}/videos/{}{}",
            self.config.base_url,
            urlencoding::encode(id.as_str()),
            suffix
        )
    }

    /// Send a request, record metrics, and turn non-success statuses into
    /// [`ApiError::Status`] carrying the response body.
    async fn execute(&self, operation: &'static str, request: RequestBuilder) -> ApiResult<Response> {
        let started = Instant::now();
        let result = request.send().await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                record_request(operation, TRANSPORT_ERROR_STATUS, latency_ms);
                debug!(operation, error = %e, "Request failed before a response");
                return Err(ApiError::Network(e));
            }
        };

        let status = response.status();
        record_request(operation, status.as_u16(), latency_ms);
        debug!(operation, status = status.as_u16(), latency_ms, "Request completed");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_http_status(status.as_u16(), body))
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl VideoApi for HttpVideoApi {
    async fn list_videos(&self) -> ApiResult<Vec<Video>> {
        let response = self
            .execute("list_videos", self.http.get(self.videos_url()))
            .await?;
        Self::read_json(response).await
    }

    async fn video_info(&self, id: &VideoId) -> ApiResult<VideoInfo> {
        let response = self
            .execute("video_info", self.http.get(self.video_url(id, "/info")))
            .await?;
        Self::read_json(response).await
    }

    async fn group_boxes(&self, id: &VideoId) -> ApiResult<GroupAnnotations> {
        let response = self
            .execute("group_boxes", self.http.get(self.video_url(id, "/group_boxes")))
            .await?;
        Self::read_json(response).await
    }

    async fn upload_video(&self, file: UploadFile) -> ApiResult<Video> {
        debug!(file_name = %file.file_name, bytes = file.len(), "Uploading video");

        let form = file.into_form()?;
        let response = self
            .execute("upload_video", self.http.post(self.videos_url()).multipart(form))
            .await?;
        Self::read_json(response).await
    }

    async fn delete_video(&self, id: &VideoId) -> ApiResult<()> {
        self.execute("delete_video", self.http.delete(self.video_url(id, "")))
            .await?;
        Ok(())
    }
}
