use tokio::sync::broadcast;
use tracing::debug;

/// Events that credit/quota consumers care about. Fired after the backend
/// acknowledged the change, never optimistically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    BookingCreated { slot_id: String },
    BookingCancelled { slot_id: String },
}

impl RefreshEvent {
    pub fn slot_id(&self) -> &str {
        match self {
            RefreshEvent::BookingCreated { slot_id } => slot_id,
            RefreshEvent::BookingCancelled { slot_id } => slot_id,
        }
    }
}

/// Broadcast bus decoupling the booking flow from whoever needs to refresh
/// credits or slot lists afterwards. Cloning shares the same channel.
#[derive(Clone)]
pub struct RefreshNotifier {
    tx: broadcast::Sender<RefreshEvent>,
}

impl RefreshNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.tx.subscribe()
    }

    pub fn booking_created(&self, slot_id: &str) {
        self.emit(RefreshEvent::BookingCreated {
            slot_id: slot_id.to_string(),
        });
    }

    pub fn booking_cancelled(&self, slot_id: &str) {
        self.emit(RefreshEvent::BookingCancelled {
            slot_id: slot_id.to_string(),
        });
    }

    fn emit(&self, event: RefreshEvent) {
        // A send error only means nobody is subscribed right now.
        if self.tx.send(event).is_err() {
            debug!("Refresh event dropped, no subscribers");
        }
    }
}

impl Default for RefreshNotifier {
    fn default() -> Self {
        Self::new()
    }
}
