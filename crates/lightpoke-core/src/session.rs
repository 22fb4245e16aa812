//! The transport seam the controller drives.

use std::future::Future;

use lightpoke_api::{Method, ServerEndpoint, StreamSession};

use crate::error::CoreError;

/// One outbound connection to the poke server.
///
/// [`StreamSession`] is the production implementation; tests substitute
/// a scripted one.
pub trait PokeSession: Send {
    /// Close any existing connection and prepare a new one to `endpoint`.
    fn open(&mut self, endpoint: &ServerEndpoint) -> Result<(), CoreError>;

    /// Start the long-lived event-stream request for `api_key`.
    fn send_subscribe(&mut self, api_key: &str)
    -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Fire a short-lived request that closes its connection afterwards.
    fn send_one_shot(
        &mut self,
        method: Method,
        path: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Next buffered line, if any. Must not block.
    fn poll_line(&mut self) -> Option<String>;

    fn is_open(&self) -> bool;

    fn close(&mut self);
}

impl PokeSession for StreamSession {
    fn open(&mut self, endpoint: &ServerEndpoint) -> Result<(), CoreError> {
        StreamSession::open(self, endpoint).map_err(CoreError::from)
    }

    async fn send_subscribe(&mut self, api_key: &str) -> Result<(), CoreError> {
        StreamSession::send_subscribe(self, api_key)
            .await
            .map_err(CoreError::from)
    }

    async fn send_one_shot(&mut self, method: Method, path: &str) -> Result<(), CoreError> {
        StreamSession::send_one_shot(self, method, path)
            .await
            .map_err(CoreError::from)
    }

    fn poll_line(&mut self) -> Option<String> {
        StreamSession::poll_line(self)
    }

    fn is_open(&self) -> bool {
        StreamSession::is_open(self)
    }

    fn close(&mut self) {
        StreamSession::close(self);
    }
}
