use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{IdentifyPayload, TransportError, UpstreamResult};

// Port for the outbound HTTP calls made by the relay pipeline.
// The use case depends on this trait, not on reqwest.
#[async_trait]
pub trait IdentifyTransport: Send + Sync {
    // Lightweight probe of the upstream; returns the observed status code.
    async fn check_availability(&self, url: &str) -> Result<u16, TransportError>;

    // Fetches the image; non-2xx responses are reported as TransportError::Status.
    async fn download_image(&self, url: &str) -> Result<Bytes, TransportError>;

    // Sends one submission attempt. Any HTTP status is returned as Ok so the
    // caller can decide whether to retry.
    async fn submit(
        &self,
        endpoint: &str,
        payload: &IdentifyPayload,
    ) -> Result<UpstreamResult, TransportError>;
}
