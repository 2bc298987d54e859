// Reconnecting event-stream client over reqwest

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Instrument;

use super::sse::{SseDecoder, SseEvent};
use crate::error::ClientError;
use crate::routes::AUTH_HEADER;

/// Delay before reconnecting when the server never sent `retry:`.
pub const DEFAULT_RETRY: Duration = Duration::from_secs(3);

/// What the transport reports to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connecting,
    Opened,
    Message(SseEvent),
    /// Connect or read failure; a reconnect follows.
    Error(String),
    /// Server ended the stream; a reconnect follows.
    Closed,
}

pub struct EventStreamClient {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
    retry: Duration,
    last_event_id: Option<String>,
}

impl EventStreamClient {
    pub fn new(url: impl Into<String>, token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::version::user_agent())
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
            token: token.filter(|t| !t.is_empty()),
            retry: DEFAULT_RETRY,
            last_event_id: None,
        })
    }

    /// Overrides the reconnect delay until the server advertises its own.
    pub fn with_retry(mut self, retry: Duration) -> Self {
        self.retry = retry;
        self
    }

    /// Spawns the connection loop; it stops once the returned receiver is dropped.
    pub fn spawn(self, buffer: usize) -> (mpsc::Receiver<TransportEvent>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let span = tracing::info_span!("event_stream", url = %self.url);
        let handle = tokio::spawn(self.run(tx).instrument(span));
        (rx, handle)
    }

    pub async fn run(mut self, tx: mpsc::Sender<TransportEvent>) {
        loop {
            if tx.send(TransportEvent::Connecting).await.is_err() {
                return;
            }
            let event = match self.connect_once(&tx).await {
                Ok(()) => return,
                Err(ClientError::Eof) => {
                    tracing::debug!("stream closed by server");
                    TransportEvent::Closed
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stream connection failed");
                    TransportEvent::Error(e.to_string())
                }
            };
            if tx.send(event).await.is_err() {
                return;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.retry) => {}
                _ = tx.closed() => return,
            }
        }
    }

    /// Streams one connection. `Ok(())` means the receiver went away.
    async fn connect_once(&mut self, tx: &mpsc::Sender<TransportEvent>) -> Result<(), ClientError> {
        let mut req = self.http.get(&self.url).header(ACCEPT, "text/event-stream");
        if let Some(token) = &self.token {
            req = req.header(AUTH_HEADER, token);
        }
        if let Some(id) = &self.last_event_id {
            req = req.header("Last-Event-ID", id);
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                status: resp.status().as_u16(),
                url: self.url.clone(),
            });
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("text/event-stream") {
            return Err(ClientError::ContentType(content_type));
        }
        if tx.send(TransportEvent::Opened).await.is_err() {
            return Ok(());
        }

        let mut decoder = SseDecoder::new();
        let mut body = resp.bytes_stream();
        let result = loop {
            let chunk = match body.next().await {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => break Err(ClientError::Connect(e)),
                None => break Err(ClientError::Eof),
            };
            let mut gone = false;
            for event in decoder.feed(&chunk) {
                if tx.send(TransportEvent::Message(event)).await.is_err() {
                    gone = true;
                    break;
                }
            }
            if gone {
                break Ok(());
            }
        };
        if let Some(retry) = decoder.retry() {
            self.retry = retry;
        }
        if let Some(id) = decoder.last_event_id() {
            self.last_event_id = Some(id.to_string());
        }
        result
    }
}
