//! Performance trace recording.
//!
//! Traces are recorded in stream transfer mode: `Tracing.end` is answered by
//! a `Tracing.tracingComplete` event carrying an IO stream handle, which is
//! then drained chunk by chunk into a file.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identifiers::StreamHandle;
use crate::protocol::{Command, IoCommand, ParsedEvent, TraceConfig, TracingCommand};

use super::Tab;

// ============================================================================
// Constants
// ============================================================================

/// Transfer mode that hands the trace back as an IO stream.
const TRANSFER_MODE: &str = "ReturnAsStream";

/// How long to wait for `Tracing.tracingComplete` after `Tracing.end`.
const TRACE_COMPLETE_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-chunk read timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Tab - Tracing
// ============================================================================

impl Tab {
    /// Starts recording a performance trace.
    ///
    /// # Arguments
    ///
    /// * `categories` - Trace categories to include
    ///
    /// # Errors
    ///
    /// Returns an error if tracing is already running or the command fails.
    pub async fn start_tracing(&self, categories: &[String]) -> Result<()> {
        debug!(categories = ?categories, session_id = %self.inner.session_id, "Starting trace");

        let command = Command::Tracing(TracingCommand::Start {
            trace_config: TraceConfig {
                included_categories: categories.to_vec(),
            },
            transfer_mode: TRANSFER_MODE.to_string(),
        });
        self.send_command(command).await?;
        Ok(())
    }

    /// Stops tracing and writes the trace to `path`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the trace is never completed
    /// - [`Error::Protocol`] if no stream handle is returned
    /// - [`Error::Io`] if the file cannot be written
    pub async fn stop_tracing(&self, path: &Path) -> Result<u64> {
        let mut events = self.subscribe();

        self.send_command(Command::Tracing(TracingCommand::End))
            .await?;

        let stream = timeout(TRACE_COMPLETE_TIMEOUT, async {
            while let Some(event) = events.recv().await {
                if let ParsedEvent::TracingComplete { stream, data_loss } = event.parse() {
                    if data_loss {
                        warn!("Trace buffer overflowed, trace is incomplete");
                    }
                    return Ok(stream);
                }
            }
            Err(Error::ConnectionClosed)
        })
        .await
        .map_err(|_| {
            Error::timeout(
                "Tracing.tracingComplete",
                TRACE_COMPLETE_TIMEOUT.as_millis() as u64,
            )
        })??;
        drop(events);

        let handle = stream.ok_or_else(|| Error::protocol("Trace completed without a stream"))?;
        let written = self.drain_stream(&handle, path).await;

        if let Err(e) = self
            .send_command(Command::Io(IoCommand::Close {
                handle: handle.clone(),
            }))
            .await
        {
            debug!(error = %e, handle = %handle, "IO.close failed");
        }

        let written = written?;
        debug!(path = %path.display(), bytes = written, "Trace written");
        Ok(written)
    }

    /// Copies an IO stream into a file until EOF.
    async fn drain_stream(&self, handle: &StreamHandle, path: &Path) -> Result<u64> {
        let mut file = File::create(path).await?;
        let mut written = 0u64;

        loop {
            let chunk = self
                .send_command_with_timeout(
                    Command::Io(IoCommand::Read {
                        handle: handle.clone(),
                    }),
                    READ_TIMEOUT,
                )
                .await?;

            let data = chunk.get("data").and_then(|v| v.as_str()).unwrap_or_default();
            let encoded = chunk
                .get("base64Encoded")
                .and_then(|v| v.as_bool())
                .unwrap_or_default();

            if encoded {
                let bytes = Base64Standard
                    .decode(data)
                    .map_err(|e| Error::protocol(format!("Invalid base64 trace chunk: {e}")))?;
                file.write_all(&bytes).await?;
                written += bytes.len() as u64;
            } else {
                file.write_all(data.as_bytes()).await?;
                written += data.len() as u64;
            }

            if chunk.get("eof").and_then(|v| v.as_bool()).unwrap_or(true) {
                break;
            }
        }

        file.flush().await?;
        Ok(written)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as Base64Standard;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::identifiers::{SessionId, TargetId};
    use crate::transport::mock::{MockEndpoint, event, reply};

    use super::Tab;

    #[tokio::test]
    async fn test_stop_tracing_streams_chunks_to_file() {
        let endpoint = MockEndpoint::bind().await.expect("bind");
        let reads = Arc::new(AtomicUsize::new(0));
        let reads_seen = Arc::clone(&reads);

        let connection = endpoint
            .connect(Box::new(move |command| {
                match command["method"].as_str().unwrap_or_default() {
                    "Tracing.end" => vec![
                        reply(command, json!({})),
                        event(
                            "Tracing.tracingComplete",
                            json!({"dataLossOccurred": false, "stream": "h1"}),
                            Some("S1"),
                        ),
                    ],
                    "IO.read" => {
                        let n = reads_seen.fetch_add(1, Ordering::SeqCst);
                        let result = if n == 0 {
                            json!({"data": "{\"traceEvents\":", "eof": false})
                        } else {
                            json!({
                                "data": Base64Standard.encode("[]}"),
                                "base64Encoded": true,
                                "eof": true
                            })
                        };
                        vec![reply(command, result)]
                    }
                    _ => vec![reply(command, json!({}))],
                }
            }))
            .await
            .expect("connect");

        let tab = Tab::new(SessionId::new("S1"), TargetId::new("T1"), connection.clone());
        let router = tab.clone();
        connection.set_event_handler(Box::new(move |e: crate::protocol::Event| router.dispatch(e)));

        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("trace.json");
        let written = tab.stop_tracing(&path).await.expect("trace");

        let contents = std::fs::read_to_string(&path).expect("read trace");
        assert_eq!(contents, "{\"traceEvents\":[]}");
        assert_eq!(written, contents.len() as u64);
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert_eq!(tab.subscriber_count(), 0);
    }
}
