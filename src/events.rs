//! Login and logout notifications
//!
//! Subscribers register plain callbacks on one of two channels. Each
//! notification invokes the callbacks registered at that moment,
//! synchronously and in registration order. Nothing is queued: a
//! notification fired with no subscriber is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct Channel {
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl Channel {
    fn push(&self, id: SubscriptionId, listener: Listener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn fire(&self, success: bool) {
        // Snapshot so callbacks may subscribe or unsubscribe re-entrantly.
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(success);
        }
    }
}

/// Login/logout notification hub.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use authflow::events::EventNotifier;
///
/// let events = EventNotifier::new();
/// let seen = Arc::new(AtomicBool::new(false));
/// let flag = seen.clone();
/// events.on_login(move |success| flag.store(success, Ordering::SeqCst));
///
/// events.emit_login(true);
/// assert!(seen.load(Ordering::SeqCst));
/// ```
#[derive(Default)]
pub struct EventNotifier {
    next_id: AtomicU64,
    login: Channel,
    logout: Channel,
}

impl std::fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventNotifier")
            .field("login_listeners", &self.login.len())
            .field("logout_listeners", &self.logout.len())
            .finish()
    }
}

impl EventNotifier {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback for login notifications.
    pub fn on_login<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.login.push(id, Arc::new(listener));
        id
    }

    /// Registers a callback for logout notifications.
    pub fn on_logout<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.logout.push(id, Arc::new(listener));
        id
    }

    /// Removes a subscription from whichever channel holds it.
    ///
    /// Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.login.remove(id) || self.logout.remove(id)
    }

    /// Notifies login subscribers.
    pub fn emit_login(&self, success: bool) {
        tracing::debug!(success, listeners = self.login.len(), "Emitting login event");
        self.login.fire(success);
    }

    /// Notifies logout subscribers.
    pub fn emit_logout(&self, success: bool) {
        tracing::debug!(success, listeners = self.logout.len(), "Emitting logout event");
        self.logout.fire(success);
    }
}
