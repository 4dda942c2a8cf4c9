use tokio::sync::broadcast;

use crate::sync::SyncEvent;

/// Broadcast hub carrying [`SyncEvent`]s between consumers.
///
/// Thin wrapper over a Tokio broadcast channel: publishing is fire-and-forget
/// and a send with no live subscribers is not an error. Cloning the hub
/// clones the sender, so every consumer session can hold its own handle to
/// the one shared bus.
#[derive(Clone)]
pub struct SyncHub {
    sender: broadcast::Sender<SyncEvent>,
}

impl SyncHub {
    /// Construct a hub backed by a broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers, ignoring delivery errors.
    pub fn publish(&self, event: SyncEvent) {
        let _ = self.sender.send(event);
    }
}
