use bytes::Bytes;
use std::borrow::Cow;
use std::fmt;

// Upstream bodies are truncated to this many bytes in log lines and messages.
const LOG_BODY_LIMIT: usize = 512;

pub fn truncate_for_log(body: &[u8]) -> Cow<'_, str> {
    if body.len() <= LOG_BODY_LIMIT {
        String::from_utf8_lossy(body)
    } else {
        Cow::Owned(format!(
            "{}... ({} bytes)",
            String::from_utf8_lossy(&body[..LOG_BODY_LIMIT]),
            body.len()
        ))
    }
}

// Failure of a single outbound call, before any retry decision is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    // Connection, TLS, timeout or body read failure.
    Network(String),
    // The remote answered with a non-success status.
    Status(u16),
    // The outbound form could not be encoded.
    Payload(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(reason) => write!(f, "network error: {reason}"),
            TransportError::Status(status) => write!(f, "unexpected status {status}"),
            TransportError::Payload(reason) => write!(f, "payload error: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {}

// Domain-level errors for the relay pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    MethodNotAllowed,
    InvalidRequest(String),
    ServiceUnavailable,
    Download {
        status: Option<u16>,
        reason: String,
    },
    Payload(String),
    // Final non-2xx answer from the upstream.
    Upstream {
        status: u16,
        body: Bytes,
    },
    // Network failure on the last submission attempt.
    TransientUpstreamFailure(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::MethodNotAllowed => write!(f, "method not allowed"),
            RelayError::InvalidRequest(reason) => write!(f, "invalid request: {reason}"),
            RelayError::ServiceUnavailable => write!(f, "upstream service unavailable"),
            RelayError::Download { status, reason } => {
                if let Some(status) = status {
                    write!(f, "image download failed with status {status}: {reason}")
                } else {
                    write!(f, "image download failed: {reason}")
                }
            }
            RelayError::Payload(reason) => write!(f, "failed to build payload: {reason}"),
            RelayError::Upstream { status, body } => {
                write!(f, "upstream error {status}: {}", truncate_for_log(body))
            }
            RelayError::TransientUpstreamFailure(reason) => {
                write!(f, "upstream request failed: {reason}")
            }
        }
    }
}

impl std::error::Error for RelayError {}
