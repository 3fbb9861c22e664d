use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};
use url::Url;

use crate::domain::{
    AuthStrategy, IdentifyPayload, IdentifyRequest, IdentifyTransport, RelayError,
    TransportError, UpstreamResult, UpstreamTarget, truncate_for_log,
};

// Bounded retry of the upstream submission.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

// Startup-resolved settings shared by every request.
#[derive(Debug, Clone)]
pub struct IdentifySettings {
    pub target: UpstreamTarget,
    pub retry: RetryPolicy,
    pub availability_check: bool,
    // Server-side credentials used when the caller does not supply one.
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
}

// Result of one submission attempt, as seen by the retry loop.
#[derive(Debug)]
enum Attempt {
    Success(UpstreamResult),
    Retryable(RelayError),
    Terminal(RelayError),
}

// Identification pipeline with injected transport.
pub struct IdentifyUseCase<'a, T: ?Sized> {
    pub transport: &'a T,
    pub settings: &'a IdentifySettings,
}

impl<'a, T> IdentifyUseCase<'a, T>
where
    T: IdentifyTransport + ?Sized,
{
    pub async fn execute(&self, request: IdentifyRequest) -> Result<UpstreamResult, RelayError> {
        let image_url = validate_image_url(&request.image_url)?;
        let credential = self.resolve_credential(&request)?;

        if self.settings.availability_check {
            self.ensure_available().await?;
        }

        // Downloading: the image is fetched exactly once per request.
        let image = self
            .transport
            .download_image(image_url.as_str())
            .await
            .map_err(|err| {
                warn!(stage = "download", error = %err, "image download failed");
                match err {
                    TransportError::Status(status) => RelayError::Download {
                        status: Some(status),
                        reason: format!("image host returned {status}"),
                    },
                    TransportError::Network(reason) | TransportError::Payload(reason) => {
                        RelayError::Download {
                            status: None,
                            reason,
                        }
                    }
                }
            })?;
        info!(bytes = image.len(), "image downloaded");

        let payload = self.build_payload(image, credential);
        self.submit_with_retry(&payload).await
    }

    async fn ensure_available(&self) -> Result<(), RelayError> {
        let url = &self.settings.target.availability_url;
        match self.transport.check_availability(url).await {
            // 405 means the upstream is up but rejects a bare GET.
            Ok(200) | Ok(405) => Ok(()),
            Ok(status) => {
                warn!(stage = "availability", status, "upstream reported unavailable");
                Err(RelayError::ServiceUnavailable)
            }
            Err(err) => {
                warn!(stage = "availability", error = %err, "upstream unreachable");
                Err(RelayError::ServiceUnavailable)
            }
        }
    }

    fn resolve_credential(&self, request: &IdentifyRequest) -> Result<Credential, RelayError> {
        match &self.settings.target.auth {
            AuthStrategy::None => Ok(Credential::None),
            AuthStrategy::FormField { field } => non_empty(request.api_key.as_deref())
                .or_else(|| non_empty(self.settings.api_key.as_deref()))
                .map(|key| Credential::Field {
                    field: field.clone(),
                    value: key.to_string(),
                })
                .ok_or_else(|| RelayError::InvalidRequest("apiKey is required".to_string())),
            AuthStrategy::Header { scheme } => {
                // The inbound header already carries its scheme; pass its bytes through
                // as-is. The configured token is only used when the caller sent none.
                if let Some(header) = request
                    .auth_token
                    .as_ref()
                    .filter(|header| !header.trim_ascii().is_empty())
                {
                    return Ok(Credential::Header(header.clone()));
                }
                let configured = non_empty(self.settings.auth_token.as_deref()).map(|token| {
                    Bytes::from(match scheme {
                        Some(scheme) => format!("{scheme} {token}"),
                        None => token.to_string(),
                    })
                });
                Ok(configured.map_or(Credential::None, Credential::Header))
            }
        }
    }

    // BuildingPayload: credential field first, then the target's fixed fields.
    fn build_payload(&self, image: Bytes, credential: Credential) -> IdentifyPayload {
        let target = &self.settings.target;
        let mut fields = Vec::with_capacity(target.extra_fields.len() + 1);
        let mut authorization = None;
        match credential {
            Credential::None => {}
            Credential::Field { field, value } => fields.push((field, value)),
            Credential::Header(value) => authorization = Some(value),
        }
        fields.extend(target.extra_fields.iter().cloned());

        IdentifyPayload {
            image,
            fields,
            file: target.file.clone(),
            authorization,
        }
    }

    // Submitting: re-entered until success, a terminal failure, or the attempt bound.
    async fn submit_with_retry(
        &self,
        payload: &IdentifyPayload,
    ) -> Result<UpstreamResult, RelayError> {
        let endpoint = &self.settings.target.endpoint;
        let max_attempts = self.settings.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let outcome = self.transport.submit(endpoint, payload).await;
            if let Ok(result) = &outcome {
                info!(
                    attempt,
                    status = result.status,
                    body = %truncate_for_log(&result.body),
                    "upstream responded"
                );
            }

            match classify(outcome) {
                Attempt::Success(result) => return Ok(result),
                Attempt::Terminal(err) => {
                    warn!(stage = "submit", attempt, error = %err, "upstream failed, not retrying");
                    return Err(err);
                }
                Attempt::Retryable(err) if attempt >= max_attempts => {
                    warn!(stage = "submit", attempt, error = %err, "upstream retries exhausted");
                    return Err(err);
                }
                Attempt::Retryable(err) => {
                    warn!(
                        stage = "submit",
                        attempt,
                        max_attempts,
                        error = %err,
                        "transient upstream failure, retrying"
                    );
                    tokio::time::sleep(self.settings.retry.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

enum Credential {
    None,
    Field { field: String, value: String },
    Header(Bytes),
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn validate_image_url(raw: &str) -> Result<Url, RelayError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RelayError::InvalidRequest("imageUrl is required".to_string()));
    }
    let url = Url::parse(raw)
        .map_err(|err| RelayError::InvalidRequest(format!("imageUrl is not a valid URL: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RelayError::InvalidRequest(
            "imageUrl must use http or https".to_string(),
        ));
    }
    Ok(url)
}

// 5xx and 429 are worth another attempt; other 4xx mean the input itself is bad.
fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

fn classify(outcome: Result<UpstreamResult, TransportError>) -> Attempt {
    match outcome {
        Ok(result) if result.is_success() => Attempt::Success(result),
        Ok(UpstreamResult { status, body }) => {
            let err = RelayError::Upstream { status, body };
            if is_retryable_status(status) {
                Attempt::Retryable(err)
            } else {
                Attempt::Terminal(err)
            }
        }
        Err(TransportError::Network(reason)) => {
            Attempt::Retryable(RelayError::TransientUpstreamFailure(reason))
        }
        Err(TransportError::Payload(reason)) => Attempt::Terminal(RelayError::Payload(reason)),
        Err(TransportError::Status(status)) => Attempt::Terminal(RelayError::Upstream {
            status,
            body: Bytes::new(),
        }),
    }
}
