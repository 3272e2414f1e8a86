//! Two-phase asset upload pipeline
//!
//! Phase 1: obtain a signed upload grant from the gateway.
//! Phase 2: PUT the raw bytes directly to object storage (not through the
//! gateway) with a matching Content-Type header.
//!
//! The returned `file_key` is meaningless until the owning entity's
//! metadata write records it. A completed transfer with no subsequent
//! metadata write leaves an orphaned object in storage; that window is a
//! known gap the client does not remediate (see `ops::OpError::OrphanedAsset`).

use crate::gateway::{ApiGateway, GatewayError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Upload pipeline errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// Signed-URL request rejected by the gateway (auth, quota, bad
    /// filename/content-type)
    #[error("Upload grant rejected: {0}")]
    Grant(#[source] GatewayError),

    /// Direct storage PUT returned non-2xx (expired URL, storage-side
    /// rejection)
    #[error("Transfer failed with status {0}")]
    Transfer(u16),

    /// Direct storage PUT failed before a response arrived
    #[error("Transfer network error: {0}")]
    Network(String),

    /// Viewable-link request rejected by the gateway
    #[error("Viewable link rejected: {0}")]
    Link(#[source] GatewayError),
}

/// A binary file queued for upload
#[derive(Debug, Clone)]
pub struct UploadSource {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadSource {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Moves binaries into object storage and resolves object keys back into
/// time-limited viewable links
pub struct Uploader {
    http: reqwest::Client,
    gateway: Arc<ApiGateway>,
}

impl Uploader {
    pub fn new(gateway: Arc<ApiGateway>) -> Result<Self, UploadError> {
        // Generous timeout: this client carries raw asset bytes
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;
        Ok(Self { http, gateway })
    }

    /// Phase 1: request a signed upload grant
    pub async fn request_grant(
        &self,
        filename: &str,
        content_type: &str,
        course_id: Uuid,
    ) -> Result<coursekit_common::api::UploadGrant, UploadError> {
        self.gateway
            .upload_grant(filename, content_type, course_id)
            .await
            .map_err(UploadError::Grant)
    }

    /// Phase 2: PUT the raw file bytes to the signed URL.
    ///
    /// On any failure the caller must not persist the grant's `file_key`.
    pub async fn transfer(
        &self,
        signed_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), UploadError> {
        let size = bytes.len();
        let response = self
            .http
            .put(signed_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Storage transfer rejected");
            return Err(UploadError::Transfer(status.as_u16()));
        }

        tracing::debug!(bytes = size, "Storage transfer complete");
        Ok(())
    }

    /// Both phases in order; returns the object key to record on the
    /// owning entity
    pub async fn upload(
        &self,
        course_id: Uuid,
        source: &UploadSource,
    ) -> Result<String, UploadError> {
        let grant = self
            .request_grant(&source.filename, &source.content_type, course_id)
            .await?;

        self.transfer(&grant.signed_url, &source.content_type, source.bytes.clone())
            .await?;

        tracing::info!(
            file_key = %grant.file_key,
            filename = %source.filename,
            "Asset uploaded"
        );
        Ok(grant.file_key)
    }

    /// Time-limited download link for an object key.
    ///
    /// Never cached: links expire, so every render re-requests.
    pub async fn viewable_link(&self, file_key: &str) -> Result<String, UploadError> {
        let link = self
            .gateway
            .viewable_link(file_key)
            .await
            .map_err(UploadError::Link)?;
        Ok(link.signed_url)
    }
}
