use crate::domain::{IdentifyRequest, RelayError};
use crate::interface_adapters::protocol::{ErrorEnvelope, IdentifyRequestBody};
use crate::interface_adapters::state::AppState;
use crate::use_cases::IdentifyUseCase;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[tracing::instrument(
    name = "identify",
    skip_all,
    fields(request_id = %uuid::Uuid::new_v4())
)]
pub async fn identify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, (StatusCode, Json<ErrorEnvelope>)> {
    // Parse by hand so malformed JSON maps to our 400 envelope.
    let payload: IdentifyRequestBody = serde_json::from_slice(&body).map_err(|err| {
        tracing::warn!(error = %err, "rejecting malformed identify body.");
        map_relay_error(&RelayError::InvalidRequest(format!("invalid JSON body: {err}")))
    })?;

    tracing::info!(image_url = %payload.image_url, "received identify request.");

    // Kept as raw bytes: opaque header values must reach the upstream unchanged.
    let auth_token = headers
        .get(header::AUTHORIZATION)
        .map(|value| Bytes::copy_from_slice(value.as_bytes()));
    let request = IdentifyRequest {
        image_url: payload.image_url,
        api_key: payload.api_key,
        auth_token,
    };

    let use_case = IdentifyUseCase {
        transport: state.transport.as_ref(),
        settings: state.settings.as_ref(),
    };
    let result = use_case.execute(request).await.map_err(|err| {
        tracing::error!(error = %err, "identify request failed.");
        map_relay_error(&err)
    })?;

    tracing::info!(status = result.status, "relaying upstream response.");

    // The upstream body goes back untouched; only the content type is set.
    let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::OK);
    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        result.body,
    )
        .into_response())
}

// Any method other than POST (OPTIONS is answered by the CORS layer).
pub async fn method_not_allowed() -> (StatusCode, Json<ErrorEnvelope>) {
    map_relay_error(&RelayError::MethodNotAllowed)
}

// Helper to build a JSON error response.
fn error_response(
    status: StatusCode,
    message: &str,
    details: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    (
        status,
        Json(ErrorEnvelope {
            error: message.to_string(),
            details,
        }),
    )
}

// Maps domain errors to HTTP responses.
pub fn map_relay_error(err: &RelayError) -> (StatusCode, Json<ErrorEnvelope>) {
    match err {
        RelayError::MethodNotAllowed => {
            error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed", None)
        }
        RelayError::InvalidRequest(reason) => error_response(
            StatusCode::BAD_REQUEST,
            "invalid request",
            Some(reason.clone()),
        ),
        RelayError::ServiceUnavailable => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "identification service is temporarily unavailable, please retry later",
            None,
        ),
        RelayError::Download { .. } => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to download image",
            Some(err.to_string()),
        ),
        RelayError::Payload(reason) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to build upstream payload",
            Some(reason.clone()),
        ),
        RelayError::Upstream { status, body } => {
            let text = String::from_utf8_lossy(body).into_owned();
            match StatusCode::from_u16(*status) {
                // Client errors carry the upstream body as-is.
                Ok(code) if code.is_client_error() => {
                    error_response(code, "upstream API error", Some(text))
                }
                Ok(code) if code.is_server_error() => error_response(
                    code,
                    "upstream API error",
                    Some(format!("upstream status {status}: {text}")),
                ),
                _ => error_response(
                    StatusCode::BAD_GATEWAY,
                    "upstream API error",
                    Some(format!("upstream status {status}: {text}")),
                ),
            }
        }
        RelayError::TransientUpstreamFailure(reason) => error_response(
            StatusCode::BAD_GATEWAY,
            "upstream request failed",
            Some(reason.clone()),
        ),
    }
}
