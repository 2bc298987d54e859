// Typed errors for the stream client

use thiserror::Error;

/// Transport failures surfaced to the stream consumer as `TransportEvent::Error`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Connect(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("unexpected content type {0:?}, expected text/event-stream")]
    ContentType(String),
    #[error("stream ended by server")]
    Eof,
}
