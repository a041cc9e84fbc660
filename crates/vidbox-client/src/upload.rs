//! Upload payloads.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::error::{ApiError, ApiResult};

/// Multipart field name the server reads the video from.
pub const UPLOAD_FIELD: &str = "file";

/// A file to upload as a new video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Build an upload from in-memory bytes. The content type is guessed
    /// from the file name.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        Self {
            content_type: guess_content_type(&file_name).to_string(),
            file_name,
            bytes: bytes.into(),
        }
    }

    /// Override the guessed content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Read an upload from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ApiError::invalid_config(format!("no file name in path {}", path.display()))
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Package as a multipart form under [`UPLOAD_FIELD`].
    pub(crate) fn into_form(self) -> ApiResult<Form> {
        let part = Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?;
        Ok(Form::new().part(UPLOAD_FIELD, part))
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}
