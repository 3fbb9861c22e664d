use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequestBody {
    // Missing and empty are treated the same by validation.
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

// Body of every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub upstream: String,
}
