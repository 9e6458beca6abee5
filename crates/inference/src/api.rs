//! REST client for the SemaDepth inference service.
//!
//! Wraps the `/detect`, `/dimensions`, `/measure` and `/calibrate` endpoints
//! using [`reqwest`]. Every request carries the client-wide timeout.

use std::time::Duration;

use async_trait::async_trait;
use semadepth_core::detection::DetectionBatch;
use semadepth_core::dimensions::CanonicalDimensions;

use crate::error::ServiceError;
use crate::service::{Calibrator, Detector, DimensionsSource, DistanceService, ImageUpload};
use crate::wire::{
    CalibrateResponse, DetectResponse, DimensionsRequest, ErrorBody, MeasureRequest,
    MeasureResponse,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// HTTP client for one inference service instance.
#[derive(Clone)]
pub struct InferenceApi {
    client: reqwest::Client,
    api_url: String,
}

impl InferenceApi {
    /// Create a client for `api_url`, e.g. `http://host:8000`.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Build the multipart form carrying an image under the `image` field.
    fn image_form(image: &ImageUpload) -> Result<reqwest::multipart::Form, ServiceError> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        Ok(reqwest::multipart::Form::new().part("image", part))
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        request.send().await.map_err(ServiceError::from_transport)
    }

    /// Ensure the response has a success status code, otherwise surface the
    /// service's `detail` message.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ServiceError::Api {
                status: status.as_u16(),
                detail: ErrorBody::detail_from(&body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let response = Self::ensure_success(response).await?;
        response.json::<T>().await.map_err(ServiceError::from_body)
    }
}

#[async_trait]
impl Detector for InferenceApi {
    async fn detect(&self, image: &ImageUpload) -> Result<DetectionBatch, ServiceError> {
        image.validate()?;
        tracing::debug!(
            file = %image.file_name,
            size_kib = image.size_kib(),
            "Submitting image for detection"
        );

        let form = Self::image_form(image)?;
        let response = Self::send(self.client.post(self.url("/detect")).multipart(form)).await?;
        let body: DetectResponse = Self::parse_response(response).await?;

        Ok(body.into_batch())
    }
}

#[async_trait]
impl DimensionsSource for InferenceApi {
    async fn dimensions(&self, label: &str) -> Result<CanonicalDimensions, ServiceError> {
        tracing::debug!(label, "Requesting canonical dimensions");
        let body = DimensionsRequest {
            label: label.to_string(),
        };
        let response = Self::send(self.client.post(self.url("/dimensions")).json(&body)).await?;
        Self::parse_response(response).await
    }
}

#[async_trait]
impl DistanceService for InferenceApi {
    async fn measure(&self, request: &MeasureRequest) -> Result<f64, ServiceError> {
        let response = Self::send(self.client.post(self.url("/measure")).json(request)).await?;
        let body: MeasureResponse = Self::parse_response(response).await?;
        if !body.distance_m.is_finite() {
            return Err(ServiceError::InvalidResponse(format!(
                "distance_m is not finite: {}",
                body.distance_m
            )));
        }
        Ok(body.distance_m)
    }
}

#[async_trait]
impl Calibrator for InferenceApi {
    async fn calibrate(&self, image: &ImageUpload) -> Result<CalibrateResponse, ServiceError> {
        image.validate()?;
        let form = Self::image_form(image)?;
        let response = Self::send(self.client.post(self.url("/calibrate")).multipart(form)).await?;
        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on an ephemeral port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    fn measure_request() -> MeasureRequest {
        MeasureRequest {
            pixel_width: 200.0,
            real_width_mm: 320.0,
            focal_constant: 1.5,
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = InferenceApi::new("http://localhost:8000/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(api.api_url(), "http://localhost:8000");
        assert_eq!(api.url("/measure"), "http://localhost:8000/measure");
    }

    #[tokio::test]
    async fn invalid_upload_is_rejected_before_any_request() {
        // Port 9 (discard) is never contacted: validation fails first.
        let api = InferenceApi::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let upload = ImageUpload::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = api.detect(&upload).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidUpload(_)));
    }

    #[tokio::test]
    async fn undecodable_success_body_is_an_invalid_response() {
        let url = serve_once("200 OK", "{\"distance\": \"far\"}").await;
        let api = InferenceApi::new(url, DEFAULT_TIMEOUT).unwrap();
        let err = api.measure(&measure_request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn error_status_carries_service_detail() {
        let url = serve_once("503 Service Unavailable", "{\"detail\": \"model loading\"}").await;
        let api = InferenceApi::new(url, DEFAULT_TIMEOUT).unwrap();
        let err = api.measure(&measure_request()).await.unwrap_err();
        assert_eq!(err.detail(), Some("model loading"));
    }
}
