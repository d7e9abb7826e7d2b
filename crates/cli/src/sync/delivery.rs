// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery abstraction for sending one record to the remote service.
//!
//! Provides a trait-based delivery layer that enables:
//! - Real HTTP uploads to the media-ingest endpoint for production
//! - Mock deliveries for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use sq_core::OfflineRecord;

/// Error type for a single delivery attempt.
///
/// The orchestrator only distinguishes success from failure; the variants
/// exist so the failure reason shown to the user is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// Transport-level failure (DNS, refused, reset, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The remote answered but refused the item.
    #[error("rejected by remote ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// No answer within the delivery timeout.
    #[error("delivery timed out")]
    Timeout,
}

/// Result type for delivery operations.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Acknowledgement of a successful delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Identifier assigned by the remote service, if it returned one.
    pub remote_id: Option<String>,
}

/// "Deliver one item" collaborator.
///
/// This trait abstracts over the actual network transfer, allowing
/// for easy testing with mock implementations.
pub trait Delivery: Send + Sync {
    /// Transfer one record's payload and metadata, authorized by `token`.
    fn deliver<'a>(
        &'a self,
        record: &'a OfflineRecord,
        token: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<Receipt>> + Send + 'a>>;
}

/// Body returned by the ingest endpoint on success.
#[derive(Debug, Deserialize)]
struct IngestResponse {
    #[serde(default)]
    id: Option<String>,
}

/// HTTP delivery: multipart POST to the media-ingest endpoint.
pub struct HttpDelivery {
    client: Client,
    ingest_url: Url,
}

impl HttpDelivery {
    /// Create a delivery for `ingest_url`; `timeout` bounds each request.
    pub fn new(ingest_url: Url, timeout: Duration) -> DeliveryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("siteq/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeliveryError::Network(format!("client setup failed: {e}")))?;
        Ok(HttpDelivery { client, ingest_url })
    }

    /// The endpoint records are posted to.
    pub fn ingest_url(&self) -> &Url {
        &self.ingest_url
    }

    async fn post(&self, record: &OfflineRecord, token: Option<&str>) -> DeliveryResult<Receipt> {
        let metadata = serde_json::to_string(&record.metadata)
            .map_err(|e| DeliveryError::Network(format!("failed to encode metadata: {e}")))?;
        let kind = record.metadata.media_kind;
        let file = Part::bytes(record.payload.clone())
            .file_name(format!("{}.{}", record.id, kind.extension()))
            .mime_str(kind.mime_type())
            .map_err(|e| DeliveryError::Network(format!("invalid mime type: {e}")))?;
        let form = Form::new()
            .text("id", record.id.clone())
            .text("enqueued_at", record.enqueued_at.to_rfc3339())
            .text("metadata", metadata)
            .part("file", file);

        let mut request = self.client.post(self.ingest_url.clone()).multipart(form);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        // The remote id is informational; an unparseable body still counts as delivered
        let body = response.text().await.map_err(classify)?;
        let remote_id = serde_json::from_str::<IngestResponse>(&body)
            .ok()
            .and_then(|r| r.id);
        Ok(Receipt { remote_id })
    }
}

fn classify(e: reqwest::Error) -> DeliveryError {
    if e.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Network(e.to_string())
    }
}

impl Delivery for HttpDelivery {
    fn deliver<'a>(
        &'a self,
        record: &'a OfflineRecord,
        token: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<Receipt>> + Send + 'a>> {
        Box::pin(self.post(record, token))
    }
}

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
