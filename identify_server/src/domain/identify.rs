use bytes::Bytes;

// Inbound identification request after the JSON envelope has been unpacked.
#[derive(Debug, Clone)]
pub struct IdentifyRequest {
    pub image_url: String,
    // Key supplied by the caller in the body, when the target embeds one in the form.
    pub api_key: Option<String>,
    // Raw inbound Authorization header bytes, forwarded verbatim for header-auth
    // targets. Not required to be UTF-8.
    pub auth_token: Option<Bytes>,
}

// Status and body returned by the upstream; the body is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResult {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// Naming of the binary part in the outbound form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
}

// Everything needed to encode one upstream submission.
// Kept immutable so each retry can encode a fresh form from the same data.
#[derive(Debug, Clone)]
pub struct IdentifyPayload {
    pub image: Bytes,
    // Text fields in wire order; they are written before the file part.
    pub fields: Vec<(String, String)>,
    pub file: FilePart,
    pub authorization: Option<Bytes>,
}
