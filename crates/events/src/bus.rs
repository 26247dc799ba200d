//! Generic broadcast bus.

use tokio::sync::broadcast;

/// Events a receiver may fall behind by before it sees `RecvError::Lagged`.
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out of `E` to every live subscriber, shared as `Arc<EventBus<E>>`.
///
/// ```rust
/// use userdir_events::EventBus;
///
/// let bus: EventBus<u32> = EventBus::default();
/// let mut rx = bus.subscribe();
/// assert_eq!(bus.publish(7), 1);
/// assert_eq!(rx.try_recv().unwrap(), 7);
/// ```
pub struct EventBus<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> EventBus<E> {
    /// A bus buffering up to `capacity` events per slow receiver.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send `event` to current subscribers and return how many there are.
    /// Without subscribers the event is dropped.
    pub fn publish(&self, event: E) -> usize {
        self.sender.send(event).unwrap_or_else(|_| {
            tracing::trace!("No subscribers, event dropped");
            0
        })
    }

    /// Receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
