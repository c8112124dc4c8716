//! Online signature results delivered from another window.
//!
//! The signing flow runs in a popup or iframe served by the API host. When
//! it finishes, that window posts a JSON message back to its opener. An
//! [`AuthorizationOnlineSignature`] listens for exactly one such message
//! from the trusted origin, classifies it like an API response, and stops
//! listening.
//!
//! The message transport is injected through [`MessageChannel`];
//! [`MessageHub`] is an in-process implementation.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::Result;
use crate::error::IbercheckError;
use crate::problem::test_for_logical_error;

/// A message received from another window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowMessage {
    /// Origin declared by the sending window.
    pub origin: String,
    /// JSON-encoded payload.
    pub data: String,
}

impl WindowMessage {
    pub fn new(origin: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            data: data.into(),
        }
    }
}

/// Source of inbound cross-window messages.
pub trait MessageChannel {
    type Subscription: MessageSubscription;

    /// Starts receiving every message posted from now on.
    fn subscribe(&self) -> Self::Subscription;
}

/// A live subscription to a [`MessageChannel`].
pub trait MessageSubscription {
    /// Waits for the next message. `None` once the channel is gone.
    fn recv(&mut self) -> impl Future<Output = Option<WindowMessage>> + Send;

    /// Stops receiving messages.
    fn unsubscribe(self);
}

/// Lifecycle of a single wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Listening,
    Resolved,
    Rejected,
}

/// Waits for the result of an online signature.
#[derive(Debug, Clone)]
pub struct AuthorizationOnlineSignature {
    api_host: String,
}

impl AuthorizationOnlineSignature {
    /// `api_host` is the only origin whose messages are acted upon,
    /// compared exactly (scheme, host and port, no trailing slash).
    pub fn new(api_host: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
        }
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// Subscribes to `channel` immediately and returns a future that
    /// completes on the first message from the trusted origin.
    ///
    /// Messages from other origins are skipped. The first trusted message
    /// ends the subscription whatever its content. There is no timeout;
    /// wrap the future in [`tokio::time::timeout`] to bound the wait.
    ///
    /// # Errors
    ///
    /// The future fails with [`IbercheckError::Parse`] if the payload is not
    /// JSON, with the classified error if it is a Problem Document, and with
    /// [`IbercheckError::ChannelClosed`] if the channel ends first.
    pub fn wait_for_result<C: MessageChannel>(
        self,
        channel: &C,
    ) -> impl Future<Output = Result<Value>> + use<C> {
        let subscription = channel.subscribe();
        debug!(api_host = %self.api_host, state = ?ListenerState::Listening, "waiting for signature result");

        async move { self.listen(subscription).await }
    }

    async fn listen<S: MessageSubscription>(self, mut subscription: S) -> Result<Value> {
        let outcome = loop {
            let Some(message) = subscription.recv().await else {
                break Err(IbercheckError::ChannelClosed);
            };

            if message.origin != self.api_host {
                debug!(origin = %message.origin, "ignoring message from untrusted origin");
                continue;
            }

            break decode_result(&message.data);
        };
        subscription.unsubscribe();

        let state = match &outcome {
            Ok(_) => ListenerState::Resolved,
            Err(_) => ListenerState::Rejected,
        };
        info!(api_host = %self.api_host, ?state, "signature wait finished");

        outcome
    }
}

fn decode_result(data: &str) -> Result<Value> {
    let payload: Value =
        serde_json::from_str(data).map_err(|e| IbercheckError::Parse(e.to_string()))?;
    test_for_logical_error(&payload)?;

    Ok(payload)
}

type Subscribers = Vec<(u64, mpsc::UnboundedSender<WindowMessage>)>;

#[derive(Debug, Default)]
struct HubState {
    next_id: u64,
    subscribers: Subscribers,
}

/// In-process [`MessageChannel`]: every posted message is delivered to
/// every current subscriber.
#[derive(Debug, Clone, Default)]
pub struct MessageHub {
    state: Arc<Mutex<HubState>>,
}

impl MessageHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts a message as if sent from `origin`. Returns how many
    /// subscribers it was delivered to.
    pub fn post_message(&self, origin: impl Into<String>, data: impl Into<String>) -> usize {
        let message = WindowMessage::new(origin, data);
        let mut state = self.lock();
        state
            .subscribers
            .retain(|(_, tx)| tx.send(message.clone()).is_ok());

        state.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MessageChannel for MessageHub {
    type Subscription = HubSubscription;

    fn subscribe(&self) -> HubSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, tx));

        HubSubscription {
            id,
            rx,
            hub: self.clone(),
        }
    }
}

/// Subscription handed out by [`MessageHub`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct HubSubscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<WindowMessage>,
    hub: MessageHub,
}

impl MessageSubscription for HubSubscription {
    fn recv(&mut self) -> impl Future<Output = Option<WindowMessage>> + Send {
        self.rx.recv()
    }

    fn unsubscribe(self) {}
}

impl Drop for HubSubscription {
    fn drop(&mut self) {
        let id = self.id;
        self.hub.lock().subscribers.retain(|(sub, _)| *sub != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hub_delivers_to_every_subscriber() {
        let hub = MessageHub::new();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        assert_eq!(hub.post_message("http://a", "1"), 2);
        assert_eq!(first.recv().await, Some(WindowMessage::new("http://a", "1")));
        assert_eq!(second.recv().await, Some(WindowMessage::new("http://a", "1")));
    }

    #[test]
    fn unsubscribe_removes_subscriber() {
        let hub = MessageHub::new();
        let sub = hub.subscribe();
        let _other = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        sub.unsubscribe();
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(hub.post_message("http://a", "{}"), 1);
    }

    #[test]
    fn decode_rejects_non_json() {
        assert!(matches!(decode_result("not json"), Err(IbercheckError::Parse(_))));
    }
}
