//! HTTP multipart uploader adapter

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::application::ports::{UploadError, UploadRequest, Uploader};

// Response types for the upload endpoint

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    upload_id: Option<String>,
}

/// Uploads recordings as a multipart POST
pub struct HttpUploader {
    url: Option<String>,
    client: reqwest::Client,
}

impl HttpUploader {
    /// Create an uploader posting to `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            client: reqwest::Client::new(),
        }
    }

    /// Uploader with no endpoint; every upload fails with `NotConfigured`
    pub fn unconfigured() -> Self {
        Self {
            url: None,
            client: reqwest::Client::new(),
        }
    }

    /// Create from an optional URL, blank counts as unset
    pub fn from_url(url: Option<&str>) -> Self {
        match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => Self::new(url),
            None => Self::unconfigured(),
        }
    }

    /// Build the multipart body. Text fields go first, the binary file last.
    fn build_form(request: &UploadRequest) -> Result<Form, UploadError> {
        let file = Part::bytes(request.container.bytes().to_vec())
            .file_name(request.filename.clone())
            .mime_str(request.mime_type().as_str())
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;

        Ok(Form::new()
            .text("filename", request.filename.clone())
            .text("fileSize", request.file_size.to_string())
            .text("estimatedDuration", request.estimated_duration.to_string())
            .part("file", file))
    }

    /// Pull the upload id out of a response body
    fn extract_upload_id(body: &str) -> Result<String, UploadError> {
        let response: UploadResponse =
            serde_json::from_str(body).map_err(|e| UploadError::ParseError(e.to_string()))?;

        response
            .upload_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(UploadError::MissingUploadId)
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, request: &UploadRequest) -> Result<String, UploadError> {
        let url = self.url.as_deref().ok_or(UploadError::NotConfigured)?;
        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "upload response received");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UploadError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| UploadError::ParseError(e.to_string()))?;
        Self::extract_upload_id(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::{wav, SampleMatrix};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> UploadRequest {
        let matrix = SampleMatrix::silence(8000, 1, 12000).unwrap();
        UploadRequest::new(wav::encode(matrix), "muteone_capture.wav")
    }

    #[test]
    fn extracts_upload_id() {
        assert_eq!(
            HttpUploader::extract_upload_id(r#"{"uploadId":"abc","other":1}"#).unwrap(),
            "abc"
        );
    }

    #[test]
    fn missing_or_blank_upload_id_is_an_error() {
        assert!(matches!(
            HttpUploader::extract_upload_id(r#"{"status":"ok"}"#),
            Err(UploadError::MissingUploadId)
        ));
        assert!(matches!(
            HttpUploader::extract_upload_id(r#"{"uploadId":"  "}"#),
            Err(UploadError::MissingUploadId)
        ));
    }

    #[test]
    fn non_json_body_is_a_parse_error() {
        assert!(matches!(
            HttpUploader::extract_upload_id("<html>"),
            Err(UploadError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn unconfigured_uploader_fails_fast() {
        let err = HttpUploader::from_url(Some("  "))
            .upload(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::NotConfigured));
    }

    #[tokio::test]
    async fn posts_multipart_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(body_string_contains(r#"name="file"; filename="muteone_capture.wav""#))
            .and(body_string_contains(r#"name="fileSize""#))
            .and(body_string_contains("24044"))
            .and(body_string_contains(r#"name="estimatedDuration""#))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"uploadId":"up-1"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let uploader = HttpUploader::new(format!("{}/upload", server.uri()));
        let id = uploader.upload(&request()).await.unwrap();
        assert_eq!(id, "up-1");
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let err = HttpUploader::new(server.uri())
            .upload(&request())
            .await
            .unwrap_err();
        match err {
            UploadError::HttpStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_without_upload_id_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let err = HttpUploader::new(server.uri())
            .upload(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingUploadId));
    }
}
