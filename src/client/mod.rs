// Stream consumer side: SSE decoding, reconnecting transport, and the dashboard state machine

pub mod consumer;
pub mod format;
pub mod freshness;
pub mod history;
pub mod sse;
pub mod transport;

pub use consumer::{ConnectionState, Status, StreamConsumer};
pub use freshness::Freshness;
pub use history::{HISTORY_MAX, History};
pub use sse::{SseDecoder, SseEvent};
pub use transport::{EventStreamClient, TransportEvent};
