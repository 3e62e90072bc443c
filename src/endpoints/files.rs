//! Avatar, file and voice uploads; downloads.
//!
//! Uploads read the whole file into memory before sending. A missing or
//! unreadable local file is reported as an [`ApiResponse::Failure`], like any
//! other fault.

use std::path::Path;

use futures_util::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::gateway::{ApiClient, Route};
use crate::models::{FileUploadResponse, UploadResponse, VoiceUploadResponse};
use crate::response::ApiResponse;

/// MIME type of voice clips accepted by the service.
pub const VOICE_MIME_TYPE: &str = "audio/ogg";
/// File name used for the voice part of a voice upload.
pub const VOICE_FILE_NAME: &str = "voice.ogg";

impl ApiClient {
    /// Upload a new avatar for the current user from a local file.
    pub async fn upload_avatar(&self, path: impl AsRef<Path>) -> ApiResponse<UploadResponse> {
        match read_upload(path.as_ref()).await {
            Ok((file_name, bytes)) => self.upload_avatar_bytes(&file_name, bytes).await,
            Err(message) => ApiResponse::Failure(message),
        }
    }

    /// Upload a new avatar from bytes already in memory.
    pub async fn upload_avatar_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ApiResponse<UploadResponse> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("avatar", part);
        self.post_multipart_json("/api/upload/avatar", form).await
    }

    /// Upload a file to attach to a later message via
    /// [`SendMessageOptions::with_file_id`](crate::endpoints::messages::SendMessageOptions::with_file_id).
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> ApiResponse<FileUploadResponse> {
        match read_upload(path.as_ref()).await {
            Ok((file_name, bytes)) => self.upload_file_bytes(&file_name, bytes).await,
            Err(message) => ApiResponse::Failure(message),
        }
    }

    /// Upload an attachment from bytes already in memory.
    pub async fn upload_file_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ApiResponse<FileUploadResponse> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        self.post_multipart_json("/api/upload/file", form).await
    }

    /// Announce a voice message of `duration` seconds in `channel`.
    ///
    /// The returned `voice_id` names the slot the clip is uploaded into with
    /// [`upload_voice_file`](Self::upload_voice_file).
    pub async fn upload_voice_message(
        &self,
        channel: &str,
        duration: f64,
    ) -> ApiResponse<VoiceUploadResponse> {
        let body = serde_json::json!({ "channel": channel, "duration": duration });
        self.send_json(reqwest::Method::POST, "/api/voice/upload", Some(&body))
            .await
    }

    /// Upload the Ogg clip for a voice message announced earlier.
    pub async fn upload_voice_file(&self, voice_id: &str, bytes: Vec<u8>) -> ApiResponse<()> {
        let part = match Part::bytes(bytes)
            .file_name(VOICE_FILE_NAME)
            .mime_str(VOICE_MIME_TYPE)
        {
            Ok(part) => part,
            Err(e) => return ApiResponse::failure(e),
        };
        let form = Form::new().part("voice", part);
        self.post_multipart_unit(Route::new("/api/upload/voice", &[voice_id]), form)
            .await
    }

    /// Download a stored file into memory. `None` on any failure.
    pub async fn download_file(&self, filename: &str) -> Option<Vec<u8>> {
        self.get_bytes(Route::new("/api/download", &[filename]))
            .await
    }

    /// Download a stored file as a stream of chunks. `None` if the request
    /// failed or the service answered with a non-2xx status; errors while
    /// reading the body surface as items of the stream.
    pub async fn download_file_stream(
        &self,
        filename: &str,
    ) -> Option<impl Stream<Item = Result<Vec<u8>>> + Send + 'static> {
        let response = self
            .get_success(Route::new("/api/download", &[filename]))
            .await?;
        Some(
            response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ApiError::from)),
        )
    }

    /// Fetch a user's avatar image. `None` on any failure.
    pub async fn get_user_avatar(&self, username: &str) -> Option<Vec<u8>> {
        self.get_bytes(Route::new("/api/user", &[username, "avatar"]))
            .await
    }
}

/// Read a local file for upload, returning its file name and contents.
async fn read_upload(path: &Path) -> std::result::Result<(String, Vec<u8>), String> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    match tokio::fs::read(path).await {
        Ok(bytes) => Ok((file_name, bytes)),
        Err(e) => {
            warn!(path = %path.display(), "failed to read upload: {e}");
            Err(format!("failed to read {}: {e}", path.display()))
        }
    }
}
