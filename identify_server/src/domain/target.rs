use crate::domain::FilePart;

// How the upstream expects to be authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    None,
    // Credential is sent as the first text field of the form.
    FormField { field: String },
    // Credential is sent as the Authorization header, optionally prefixed (e.g. "JWT").
    Header { scheme: Option<String> },
}

impl AuthStrategy {
    // Parses the UPSTREAM_AUTH override: "none", "header", "header:<scheme>" or
    // "field:<name>".
    pub fn from_config(value: &str) -> Option<Self> {
        let value = value.trim();
        let (kind, arg) = match value.split_once(':') {
            Some((kind, arg)) => (kind.trim(), Some(arg.trim()).filter(|arg| !arg.is_empty())),
            None => (value, None),
        };
        match (kind.to_ascii_lowercase().as_str(), arg) {
            ("none", None) => Some(AuthStrategy::None),
            ("header", scheme) => Some(AuthStrategy::Header {
                scheme: scheme.map(str::to_string),
            }),
            ("field", Some(field)) => Some(AuthStrategy::FormField {
                field: field.to_string(),
            }),
            _ => None,
        }
    }
}

// The identification API being relayed to, selected once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub name: String,
    pub endpoint: String,
    pub availability_url: String,
    pub file: FilePart,
    // Fixed text fields sent on every submission, after any credential field.
    pub extra_fields: Vec<(String, String)>,
    pub auth: AuthStrategy,
}

impl UpstreamTarget {
    pub fn inaturalist() -> Self {
        Self {
            name: "inaturalist".to_string(),
            endpoint: "https://api.inaturalist.org/v2/computervision/score_image".to_string(),
            availability_url: "https://api.inaturalist.org/v2".to_string(),
            file: FilePart {
                field: "images".to_string(),
                file_name: "image.jpg".to_string(),
                mime: "image/jpeg".to_string(),
            },
            extra_fields: Vec::new(),
            auth: AuthStrategy::Header {
                scheme: Some("JWT".to_string()),
            },
        }
    }

    pub fn mushroom_observer() -> Self {
        Self {
            name: "mushroom_observer".to_string(),
            endpoint: "https://mushroomobserver.org/api2".to_string(),
            availability_url: "https://mushroomobserver.org/api2".to_string(),
            file: FilePart {
                field: "file".to_string(),
                file_name: "image.jpg".to_string(),
                mime: "image/jpeg".to_string(),
            },
            extra_fields: vec![("method".to_string(), "identify_image".to_string())],
            auth: AuthStrategy::FormField {
                field: "api_key".to_string(),
            },
        }
    }

    // Looks up a built-in target by the name used in configuration.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "inaturalist" | "inat" => Some(Self::inaturalist()),
            "mushroom_observer" | "mushroomobserver" | "mo" => Some(Self::mushroom_observer()),
            _ => None,
        }
    }
}
