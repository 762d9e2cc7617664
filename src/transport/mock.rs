//! Scripted DevTools endpoint for tests.
//!
//! Binds a WebSocket listener on a random local port, accepts one client
//! and answers every incoming command through a responder closure. The
//! responder returns the frames to push back, so a single command can be
//! answered with events followed by its reply.

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::error::{Error, Result};

use super::Connection;

// ============================================================================
// Constants
// ============================================================================

/// How long to wait for the client to dial in.
const ACCEPT_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Types
// ============================================================================

/// Computes the frames sent back for one incoming command.
pub(crate) type Responder = Box<dyn FnMut(&Value) -> Vec<Value> + Send>;

// ============================================================================
// MockEndpoint
// ============================================================================

/// A bound, not yet connected, scripted endpoint.
pub(crate) struct MockEndpoint {
    listener: TcpListener,
    addr: SocketAddr,
}

impl MockEndpoint {
    /// Binds to `127.0.0.1:0`.
    pub(crate) async fn bind() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        debug!(%addr, "Mock endpoint bound");
        Ok(Self { listener, addr })
    }

    /// Returns the DevTools-style URL of this endpoint.
    pub(crate) fn ws_url(&self) -> String {
        format!("ws://{}/devtools/browser/mock", self.addr)
    }

    /// Serves one client in the background and returns a connection to it.
    pub(crate) async fn connect(self, mut responder: Responder) -> Result<Connection> {
        let ws_url = self.ws_url();
        let listener = self.listener;

        tokio::spawn(async move {
            let Ok(Ok((stream, _))) = timeout(ACCEPT_TIMEOUT, listener.accept()).await else {
                return;
            };
            let Ok(ws_stream) = tokio_tungstenite::accept_async(stream).await else {
                return;
            };
            let (mut write, mut read) = ws_stream.split();

            while let Some(Ok(message)) = read.next().await {
                let Message::Text(text) = message else {
                    continue;
                };
                let Ok(command) = serde_json::from_str::<Value>(&text) else {
                    continue;
                };
                for frame in responder(&command) {
                    if write.send(Message::Text(frame.to_string().into())).await.is_err() {
                        return;
                    }
                }
            }
        });

        Connection::connect(&ws_url)
            .await
            .map_err(|e| Error::connection(format!("mock connect failed: {e}")))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Builds a success reply for `command`.
pub(crate) fn reply(command: &Value, result: Value) -> Value {
    json!({ "id": command["id"], "result": result })
}

/// Builds an error reply for `command`.
pub(crate) fn reply_error(command: &Value, code: i64, message: &str) -> Value {
    json!({ "id": command["id"], "error": { "code": code, "message": message } })
}

/// Builds an event frame, optionally scoped to a session.
pub(crate) fn event(method: &str, params: Value, session_id: Option<&str>) -> Value {
    match session_id {
        Some(session_id) => json!({ "method": method, "params": params, "sessionId": session_id }),
        None => json!({ "method": method, "params": params }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::{Command, PageCommand, Request};

    #[tokio::test]
    async fn test_mock_round_trip() {
        let endpoint = MockEndpoint::bind().await.expect("bind");
        assert!(endpoint.ws_url().starts_with("ws://127.0.0.1:"));

        let connection = endpoint
            .connect(Box::new(|command| vec![reply(command, json!({"ok": true}))]))
            .await
            .expect("connect");

        let response = connection
            .send(Request::new(Command::Page(PageCommand::Enable)))
            .await
            .expect("reply");
        assert!(response.is_success());
        assert!(response.get_bool("ok"));
    }

    #[tokio::test]
    async fn test_mock_error_reply() {
        let endpoint = MockEndpoint::bind().await.expect("bind");
        let connection = endpoint
            .connect(Box::new(|command| vec![reply_error(command, -32000, "nope")]))
            .await
            .expect("connect");

        let result = connection
            .send(Request::new(Command::Page(PageCommand::Enable)))
            .await
            .expect("reply")
            .into_result();
        assert!(matches!(result, Err(Error::Cdp { code: -32000, .. })));
    }
}
