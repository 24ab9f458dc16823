use crate::models::AppointmentStatus;
use tokio::sync::broadcast;

/// Events emitted by the booking engine for external listeners (reporting,
/// notifications).
#[derive(Debug, Clone)]
pub enum SystemEvent {
    AppointmentStatusChanged {
        appointment_id: String,
        old_status: AppointmentStatus,
        new_status: AppointmentStatus,
        changed_by: String,
        timestamp: String, // ISO 8601
    },
    /// Revenue recognition for the reporting sink. Emitted when an
    /// appointment transitions into Completed; a side effect, never a
    /// precondition.
    RevenueRecognized {
        appointment_id: String,
        client_id: String,
        staff_id: String,
        amount: i64,
        timestamp: String, // ISO 8601
    },
}

/// Event bus for publishing and subscribing to system events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SystemEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all subscribers (non-blocking, fire-and-forget).
    pub fn publish(&self, event: SystemEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(
                "Failed to publish event (no subscribers or channel full): {}",
                e
            );
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SystemEvent> {
        self.tx.subscribe()
    }
}
