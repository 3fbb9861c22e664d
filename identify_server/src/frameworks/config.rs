use crate::domain::{AuthStrategy, UpstreamTarget};
use crate::interface_adapters::clients::TransportTimeouts;
use crate::use_cases::{IdentifySettings, RetryPolicy};
use std::{env, fmt, net::IpAddr, time::Duration};

// Runtime settings, resolved once at startup from the environment.

pub fn http_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080)
}

pub fn bind_addr() -> IpAddr {
    env::var("BIND_ADDR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([0, 0, 0, 0]))
}

fn millis(name: &str, default: u64) -> Duration {
    let millis = env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_millis(millis)
}

fn flag(name: &str, default: bool) -> bool {
    match env::var(name).as_deref().map(str::trim) {
        Ok("1") | Ok("true") | Ok("yes") | Ok("on") => true,
        Ok("0") | Ok("false") | Ok("no") | Ok("off") => false,
        _ => default,
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn transport_timeouts() -> TransportTimeouts {
    TransportTimeouts {
        availability: millis("AVAILABILITY_TIMEOUT_MS", 10_000),
        download: millis("DOWNLOAD_TIMEOUT_MS", 180_000),
        submit: millis("SUBMIT_TIMEOUT_MS", 60_000),
    }
}

pub fn retry_policy() -> RetryPolicy {
    let max_attempts = env::var("SUBMIT_MAX_ATTEMPTS")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(3);
    RetryPolicy {
        max_attempts,
        delay: millis("SUBMIT_RETRY_DELAY_MS", 5_000),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    UnknownTarget(String),
    InvalidAuth(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownTarget(name) => write!(
                f,
                "unknown UPSTREAM_TARGET {name:?} (expected inaturalist or mushroom_observer)"
            ),
            ConfigError::InvalidAuth(value) => write!(
                f,
                "invalid UPSTREAM_AUTH {value:?} (expected none, header, header:<scheme> or field:<name>)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// Built-in target chosen by UPSTREAM_TARGET, with per-field overrides applied.
pub fn upstream_target() -> Result<UpstreamTarget, ConfigError> {
    let name = env::var("UPSTREAM_TARGET").unwrap_or_else(|_| "inaturalist".to_string());
    let mut target = UpstreamTarget::by_name(&name).ok_or(ConfigError::UnknownTarget(name))?;

    if let Some(auth) = non_empty("UPSTREAM_AUTH") {
        target.auth = AuthStrategy::from_config(&auth).ok_or(ConfigError::InvalidAuth(auth))?;
    }
    if let Some(endpoint) = non_empty("UPSTREAM_ENDPOINT") {
        target.endpoint = endpoint;
    }
    if let Some(url) = non_empty("UPSTREAM_AVAILABILITY_URL") {
        target.availability_url = url;
    }
    if let Some(field) = non_empty("UPSTREAM_IMAGE_FIELD") {
        target.file.field = field;
    }
    if let Some(file_name) = non_empty("UPSTREAM_FILE_NAME") {
        target.file.file_name = file_name;
    }
    Ok(target)
}

pub fn identify_settings() -> Result<IdentifySettings, ConfigError> {
    Ok(IdentifySettings {
        target: upstream_target()?,
        retry: retry_policy(),
        availability_check: flag("AVAILABILITY_CHECK", true),
        api_key: non_empty("UPSTREAM_API_KEY"),
        auth_token: non_empty("UPSTREAM_AUTH_TOKEN"),
    })
}
