//! Event coordinator: typed notifications from tree navigation to the
//! request document controller.
//!
//! Each subscriber owns an unbounded channel, so an event published while the
//! subscriber is busy waits in its queue instead of being lost. Dropping a
//! [`Subscription`] has the same effect as unsubscribing.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Notifications sent to document views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// Load the request file at this path.
    LoadFile(PathBuf),
    /// Reset to the unattached state.
    ClearActive,
    /// A node was renamed; follow any attached path below `from`.
    Relocated {
        /// Old path of the renamed node.
        from: PathBuf,
        /// New path of the renamed node.
        to: PathBuf,
    },
}

/// Identifies a subscription for [`EventCoordinator::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receiving end handed to a subscriber.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<WorkspaceEvent>,
}

impl Subscription {
    /// Returns the subscription id.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Takes the next queued event without waiting.
    pub fn try_next(&mut self) -> Option<WorkspaceEvent> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next event. Returns `None` once unsubscribed.
    pub async fn next(&mut self) -> Option<WorkspaceEvent> {
        self.receiver.recv().await
    }
}

/// Publishes [`WorkspaceEvent`]s to every live subscriber.
#[derive(Debug, Default)]
pub struct EventCoordinator {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, mpsc::UnboundedSender<WorkspaceEvent>)>,
}

impl EventCoordinator {
    /// Creates a coordinator with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber.
    pub fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.push((id, sender));
        debug!(id = id.0, "subscriber registered");
        Subscription { id, receiver }
    }

    /// Removes a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers an event to every subscriber and returns how many got it.
    ///
    /// Subscribers whose receiving end was dropped are pruned.
    pub fn publish(&mut self, event: &WorkspaceEvent) -> usize {
        self.subscribers
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
        let delivered = self.subscribers.len();
        if delivered == 0 {
            warn!(?event, "workspace event published with no subscriber");
        } else {
            debug!(?event, delivered, "workspace event published");
        }
        delivered
    }

    /// Asks document views to load a file.
    pub fn notify_load_file(&mut self, path: impl Into<PathBuf>) -> usize {
        self.publish(&WorkspaceEvent::LoadFile(path.into()))
    }

    /// Asks document views to reset.
    pub fn notify_clear_active(&mut self) -> usize {
        self.publish(&WorkspaceEvent::ClearActive)
    }

    /// Tells document views a node moved.
    pub fn notify_relocated(&mut self, from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> usize {
        self.publish(&WorkspaceEvent::Relocated {
            from: from.into(),
            to: to.into(),
        })
    }
}
