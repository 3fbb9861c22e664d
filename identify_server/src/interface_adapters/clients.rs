use crate::domain::{IdentifyPayload, IdentifyTransport, TransportError, UpstreamResult};
use crate::interface_adapters::multipart;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONNECTION, HeaderMap, HeaderValue};
use std::time::Duration;

const USER_AGENT: &str = "Mushroom Identifier/1.0";

// Per-operation deadlines for the three outbound calls.
#[derive(Debug, Clone, Copy)]
pub struct TransportTimeouts {
    pub availability: Duration,
    pub download: Duration,
    pub submit: Duration,
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self {
            availability: Duration::from_secs(10),
            download: Duration::from_secs(180),
            submit: Duration::from_secs(60),
        }
    }
}

// Thin wrapper around reqwest for the image host and the identification API.
#[derive(Clone)]
pub struct ReqwestTransport {
    // Used for the availability probe and image downloads.
    http: Client,
    // Submission client: no keep-alive, since the upstream recycles connections.
    upstream: Client,
    timeouts: TransportTimeouts,
}

impl ReqwestTransport {
    pub fn new(timeouts: TransportTimeouts) -> Result<Self, reqwest::Error> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        let upstream = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeouts.submit)
            .connect_timeout(timeouts.submit / 3)
            .read_timeout(timeouts.submit * 2 / 3)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            http,
            upstream,
            timeouts,
        })
    }
}

fn network(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Network(format!("timed out: {err}"))
    } else {
        TransportError::Network(err.to_string())
    }
}

#[async_trait]
impl IdentifyTransport for ReqwestTransport {
    async fn check_availability(&self, url: &str) -> Result<u16, TransportError> {
        let res = self
            .http
            .get(url)
            .timeout(self.timeouts.availability)
            .send()
            .await
            .map_err(network)?;
        tracing::debug!(status = res.status().as_u16(), "availability probe answered.");
        Ok(res.status().as_u16())
    }

    async fn download_image(&self, url: &str) -> Result<Bytes, TransportError> {
        let res = self
            .http
            .get(url)
            .timeout(self.timeouts.download)
            .send()
            .await
            .map_err(network)?;
        let status = res.status();

        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        res.bytes().await.map_err(network)
    }

    async fn submit(
        &self,
        endpoint: &str,
        payload: &IdentifyPayload,
    ) -> Result<UpstreamResult, TransportError> {
        // Forms are consumed by send, so every attempt encodes a new one.
        let body = multipart::build(payload)?;
        tracing::debug!(
            content_type = %body.content_type,
            image_bytes = payload.image.len(),
            "submitting multipart payload."
        );

        let mut req = self.upstream.post(endpoint).multipart(body.form);
        if let Some(authorization) = &payload.authorization {
            let value = HeaderValue::from_bytes(authorization).map_err(|err| {
                TransportError::Payload(format!("invalid authorization header: {err}"))
            })?;
            req = req.header(AUTHORIZATION, value);
        }

        let res = req.send().await.map_err(network)?;
        let status = res.status().as_u16();
        let body = res.bytes().await.map_err(network)?;

        Ok(UpstreamResult { status, body })
    }
}
