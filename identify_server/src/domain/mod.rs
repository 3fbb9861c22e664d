mod errors;
mod identify;
mod ports;
mod target;

// Re-export the domain boundary types and ports.
pub use errors::{RelayError, TransportError, truncate_for_log};
pub use identify::{FilePart, IdentifyPayload, IdentifyRequest, UpstreamResult};
pub use ports::IdentifyTransport;
pub use target::{AuthStrategy, UpstreamTarget};
