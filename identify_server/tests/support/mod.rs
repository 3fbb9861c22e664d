// Shared bootstrapping for relay integration tests.
use identify_server::domain::{AuthStrategy, FilePart, UpstreamTarget};
use identify_server::interface_adapters::clients::{ReqwestTransport, TransportTimeouts};
use identify_server::interface_adapters::state::AppState;
use identify_server::use_cases::{IdentifySettings, RetryPolicy};
use std::{sync::Arc, time::Duration};
use wiremock::MockServer;

pub const IDENTIFY_PATH: &str = "/v2/computervision/score_image";
pub const PROBE_PATH: &str = "/v2";

// Small JPEG-looking payload with bytes that are not valid UTF-8.
pub const IMAGE_BYTES: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00\x01\x02\x00\xfe\xfa-fake-image-\x00\xff\xd9";

// Header-auth target pointed at the mock upstream.
pub fn header_target(upstream: &MockServer) -> UpstreamTarget {
    UpstreamTarget {
        name: "mock-inaturalist".to_string(),
        endpoint: format!("{}{IDENTIFY_PATH}", upstream.uri()),
        availability_url: format!("{}{PROBE_PATH}", upstream.uri()),
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

// Form-key target shaped like Mushroom Observer, pointed at the mock upstream.
pub fn form_key_target(upstream: &MockServer) -> UpstreamTarget {
    UpstreamTarget {
        name: "mock-mushroom-observer".to_string(),
        endpoint: format!("{}{IDENTIFY_PATH}", upstream.uri()),
        availability_url: format!("{}{PROBE_PATH}", upstream.uri()),
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

pub fn settings(target: UpstreamTarget) -> IdentifySettings {
    IdentifySettings {
        target,
        retry: RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        },
        availability_check: true,
        api_key: None,
        auth_token: None,
    }
}

// Start the relay on an ephemeral port and return its base URL.
pub async fn spawn_relay(settings: IdentifySettings) -> String {
    let transport = ReqwestTransport::new(TransportTimeouts {
        availability: Duration::from_secs(2),
        download: Duration::from_secs(5),
        submit: Duration::from_secs(5),
    })
    .expect("expected http client to build");
    let state = Arc::new(AppState {
        transport: Arc::new(transport),
        settings: Arc::new(settings),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        identify_server::run(listener, state)
            .await
            .expect("server failed");
    });

    format!("http://{addr}")
}

// Content of the form part whose headers contain `disposition`: everything from
// the blank line after its headers up to the CRLF before the next boundary.
pub fn part_content<'a>(body: &'a [u8], content_type: &str, disposition: &[u8]) -> &'a [u8] {
    let boundary = content_type
        .split("boundary=")
        .nth(1)
        .expect("expected boundary in content type");
    let delimiter = format!("\r\n--{boundary}");

    let headers_at = find(body, disposition).expect("expected part headers");
    let content_start = headers_at
        + find(&body[headers_at..], b"\r\n\r\n").expect("expected end of part headers")
        + 4;
    let content_len =
        find(&body[content_start..], delimiter.as_bytes()).expect("expected closing boundary");
    &body[content_start..content_start + content_len]
}

// Position of `needle` inside `haystack`, if present.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
