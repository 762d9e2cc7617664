//! Core Tab struct and accessors.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::Result;
use crate::identifiers::{SessionId, TargetId};
use crate::protocol::{Command, Event, Request};
use crate::transport::Connection;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a tab.
pub(crate) struct TabInner {
    /// Flat session attached to the page target.
    pub session_id: SessionId,
    /// Page target.
    pub target_id: TargetId,
    /// Connection shared with the owning window.
    pub connection: Connection,
    /// Event subscribers for this session.
    pub subscribers: Mutex<Vec<mpsc::UnboundedSender<Event>>>,
}

// ============================================================================
// Tab
// ============================================================================

/// A handle to a page target attached in flat session mode.
///
/// Tabs provide navigation, viewport emulation, capture and tracing.
#[derive(Clone)]
pub struct Tab {
    pub(crate) inner: Arc<TabInner>,
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("session_id", &self.inner.session_id)
            .field("target_id", &self.inner.target_id)
            .finish_non_exhaustive()
    }
}

impl Tab {
    /// Creates a new tab handle.
    pub(crate) fn new(session_id: SessionId, target_id: TargetId, connection: Connection) -> Self {
        Self {
            inner: Arc::new(TabInner {
                session_id,
                target_id,
                connection,
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }
}

// ============================================================================
// Tab - Accessors
// ============================================================================

impl Tab {
    /// Returns the session ID.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }

    /// Returns the page target ID.
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &TargetId {
        &self.inner.target_id
    }
}

// ============================================================================
// Tab - Events
// ============================================================================

impl Tab {
    /// Subscribes to every event of this session.
    ///
    /// The stream ends when the tab's window closes. Dropping the receiver
    /// unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = self.inner.subscribers.lock();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.push(tx);
        rx
    }

    /// Fans an event out to live subscribers and prunes closed ones.
    pub(crate) fn dispatch(&self, event: Event) {
        let mut subscribers = self.inner.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        trace!(
            method = %event.method,
            subscribers = subscribers.len(),
            "Event dispatched"
        );
    }

    /// Returns the number of live subscribers.
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.inner.subscribers.lock();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}

// ============================================================================
// Tab - Internal
// ============================================================================

impl Tab {
    /// Sends a session command and returns its result payload.
    pub(crate) async fn send_command(&self, command: Command) -> Result<Value> {
        let request = Request::for_session(self.inner.session_id.clone(), command);
        self.inner.connection.send(request).await?.into_result()
    }

    /// Sends a session command with a custom timeout.
    pub(crate) async fn send_command_with_timeout(
        &self,
        command: Command,
        timeout: Duration,
    ) -> Result<Value> {
        let request = Request::for_session(self.inner.session_id.clone(), command);
        self.inner
            .connection
            .send_with_timeout(request, timeout)
            .await?
            .into_result()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::Tab;

    use crate::identifiers::{SessionId, TargetId};
    use crate::transport::mock::MockEndpoint;

    #[test]
    fn test_tab_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Tab>();
    }

    #[test]
    fn test_tab_is_debug() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<Tab>();
    }

    #[tokio::test]
    async fn test_dropped_receivers_are_not_counted() {
        let endpoint = MockEndpoint::bind().await.expect("bind");
        let connection = endpoint
            .connect(Box::new(|_| Vec::new()))
            .await
            .expect("connect");
        let tab = Tab::new(SessionId::new("S1"), TargetId::new("T1"), connection);

        let first = tab.subscribe();
        let second = tab.subscribe();
        assert_eq!(tab.subscriber_count(), 2);

        drop(first);
        assert_eq!(tab.subscriber_count(), 1);

        drop(second);
        let _third = tab.subscribe();
        assert_eq!(tab.subscriber_count(), 1);
    }
}
