//! Streaming session to the poke server.
//!
//! Owns the one outbound connection. The subscription response body is
//! drained by a background task that frames lines and pushes them into a
//! bounded channel; [`StreamSession::poll_line`] only ever `try_recv`s,
//! so the caller's tick never waits on the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use lightpoke_api::{ServerEndpoint, StreamSession, transport::TransportConfig};
//!
//! let mut session = StreamSession::new(TransportConfig::default());
//! session.open(&ServerEndpoint::parse("http://192.168.0.150:3000"))?;
//! session.send_subscribe("my-key").await?;
//!
//! if let Some(line) = session.poll_line() {
//!     println!("{line}");
//! }
//! ```

use reqwest::Method;
use reqwest::header::{ACCEPT, CONNECTION, CONTENT_LENGTH};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::endpoint::ServerEndpoint;
use crate::error::Error;
use crate::framing::LineFramer;
use crate::protocol::{self, MAX_LINE_BYTES};
use crate::transport::TransportConfig;

// ── Line channel capacity ────────────────────────────────────────────

const LINE_CHANNEL_CAPACITY: usize = 64;

// ── StreamSession ────────────────────────────────────────────────────

/// A single outbound connection to the poke server.
pub struct StreamSession {
    config: TransportConfig,
    client: Option<reqwest::Client>,
    endpoint: Option<ServerEndpoint>,
    reader: Option<StreamReader>,
}

/// Background reader for one subscription response.
struct StreamReader {
    lines: mpsc::Receiver<String>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl StreamSession {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            client: None,
            endpoint: None,
            reader: None,
        }
    }

    /// The endpoint of the last successful [`open`](Self::open).
    pub fn endpoint(&self) -> Option<&ServerEndpoint> {
        self.endpoint.as_ref()
    }

    /// Tear down any existing connection and prepare a fresh one to
    /// `endpoint`.
    ///
    /// On failure the session is left closed.
    pub fn open(&mut self, endpoint: &ServerEndpoint) -> Result<(), Error> {
        self.close();
        self.client = None;
        self.endpoint = None;

        if !endpoint.is_connectable() {
            return Err(Error::InvalidEndpoint {
                endpoint: endpoint.to_string(),
            });
        }

        self.client = Some(self.config.build_client()?);
        self.endpoint = Some(endpoint.clone());
        debug!(endpoint = %endpoint, "session opened");
        Ok(())
    }

    /// Issue the long-lived event-stream request for `api_key`.
    ///
    /// Once the server answers with a success status, its body becomes
    /// the line source for [`poll_line`](Self::poll_line). The response
    /// headers must arrive within the transport's request timeout.
    pub async fn send_subscribe(&mut self, api_key: &str) -> Result<(), Error> {
        self.close();

        let path = protocol::stream_path(api_key);
        let (client, endpoint) = self.ready()?;
        let url = endpoint.url(&path)?;

        info!(url = %url, "subscribing to poke stream");

        // Only the header phase is bounded; the body stays open indefinitely.
        let request = client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CONNECTION, "keep-alive")
            .send();
        let limit = self.config.request_timeout;
        let response = tokio::time::timeout(limit, request)
            .await
            .map_err(|_| Error::Timeout {
                path: path.clone(),
                after: limit,
            })??;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                path,
            });
        }

        let (line_tx, lines) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(read_lines(response, line_tx, cancel.clone()));

        self.reader = Some(StreamReader {
            lines,
            cancel,
            task,
        });
        info!("poke stream connected");
        Ok(())
    }

    /// Issue a short-lived request with `Connection: close` and an empty
    /// body. The socket is not kept for reuse.
    pub async fn send_one_shot(&mut self, method: Method, path: &str) -> Result<(), Error> {
        let (client, endpoint) = self.ready()?;
        let url = endpoint.url(path)?;

        debug!(%method, url = %url, "sending one-shot request");

        let response = client
            .request(method, url)
            .header(CONNECTION, "close")
            .header(CONTENT_LENGTH, "0")
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Status {
                status: status.as_u16(),
                path: path.to_owned(),
            })
        }
    }

    /// Next buffered line, if any. Never blocks.
    pub fn poll_line(&mut self) -> Option<String> {
        let line = self.reader.as_mut()?.lines.try_recv().ok()?;
        trace!(line = %line, "stream line");
        Some(line)
    }

    /// `true` while a subscription response is still being read.
    pub fn is_open(&self) -> bool {
        self.reader
            .as_ref()
            .is_some_and(|reader| !reader.task.is_finished())
    }

    /// Stop reading the current subscription, if any.
    pub fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.cancel.cancel();
            debug!("poke stream closed");
        }
    }

    fn ready(&self) -> Result<(&reqwest::Client, &ServerEndpoint), Error> {
        match (&self.client, &self.endpoint) {
            (Some(client), Some(endpoint)) => Ok((client, endpoint)),
            _ => Err(Error::NotConnected),
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

// ── Background reader ────────────────────────────────────────────────

/// Drain the response body into the line channel until the stream ends,
/// errors, or the session cancels it.
async fn read_lines(
    mut response: reqwest::Response,
    line_tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) {
    let mut framer = LineFramer::new(MAX_LINE_BYTES);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            chunk = response.chunk() => {
                match chunk {
                    Ok(Some(bytes)) => {
                        for line in framer.push(&bytes) {
                            // Receiver dropped means the session moved on.
                            if line_tx.send(line).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(None) => {
                        info!("poke stream ended by server");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "poke stream read failed");
                        break;
                    }
                }
            }
        }
    }

    debug!("stream reader exiting");
}
