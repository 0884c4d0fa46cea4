//! Auth-state stream shared by provider implementations.
//!
//! A subscriber first sees the identity that was current when it
//! subscribed, then every later change in order. Snapshot and subscription
//! are taken under one lock so no change falls between them.

use member_types::Identity;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 64;

struct HubInner {
    current: RwLock<Option<Identity>>,
    sender: broadcast::Sender<Option<Identity>>,
}

/// Holder of the current identity and the change broadcast.
#[derive(Clone)]
pub struct AuthStateHub {
    inner: Arc<HubInner>,
}

impl AuthStateHub {
    /// Create a hub with an initial identity.
    pub fn new(initial: Option<Identity>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(HubInner {
                current: RwLock::new(initial),
                sender,
            }),
        }
    }

    /// The identity as of the latest change.
    pub fn current(&self) -> Option<Identity> {
        self.inner.current.read().clone()
    }

    /// Record a state change and notify subscribers.
    pub fn publish(&self, identity: Option<Identity>) {
        let mut current = self.inner.current.write();
        *current = identity.clone();
        let user_id = identity.as_ref().map(|i| i.id.clone());
        // No receivers is fine: nobody is subscribed yet.
        let receivers = self.inner.sender.send(identity).unwrap_or(0);
        debug!(user_id = ?user_id, receivers, "auth state changed");
    }

    /// Subscribe; the returned subscription yields the current identity first.
    pub fn subscribe(&self) -> AuthStateSubscription {
        let current = self.inner.current.read();
        let receiver = self.inner.sender.subscribe();
        AuthStateSubscription {
            pending_initial: Some(current.clone()),
            receiver,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }
}

/// A registration on the auth-state stream.
///
/// Dropping it (or calling [`unsubscribe`](Self::unsubscribe)) releases the
/// registration.
pub struct AuthStateSubscription {
    pending_initial: Option<Option<Identity>>,
    receiver: broadcast::Receiver<Option<Identity>>,
    hub: Weak<HubInner>,
}

impl AuthStateSubscription {
    /// Wait for the next notification.
    ///
    /// Returns `None` once the provider is gone. A subscriber that fell
    /// behind skips to the provider's current identity.
    pub async fn next(&mut self) -> Option<Option<Identity>> {
        if let Some(initial) = self.pending_initial.take() {
            return Some(initial);
        }

        match self.receiver.recv().await {
            Ok(identity) => Some(identity),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "auth state subscriber lagged; resyncing to current");
                let inner = self.hub.upgrade()?;
                let current = inner.current.read();
                self.receiver = inner.sender.subscribe();
                Some(current.clone())
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Release the registration.
    pub fn unsubscribe(self) {
        drop(self);
    }
}
