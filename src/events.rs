use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::MovementKind;

/// Domain events emitted by the services after a successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CategoryCreated { name: String },
    CategoryUpdated { name: String },
    CategoryDeleted { name: String },

    ProductCreated { name: String },
    ProductUpdated { name: String },
    ProductDeleted { name: String },

    MovementApplied {
        movement_id: Uuid,
        product: String,
        kind: MovementKind,
        quantity: i32,
        new_stock: i32,
        occurred_at: DateTime<Utc>,
    },

    DataCleared,
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), ServiceError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))
    }

    /// Best-effort send: mutations are already committed when events fire,
    /// so a full channel degrades to a warning, never a client error.
    pub async fn notify(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping domain event: {}", e);
        }
    }
}

/// Consumes the event stream for the lifetime of the process.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::MovementApplied {
                product,
                kind,
                quantity,
                new_stock,
                ..
            } => {
                info!(
                    product = %product,
                    kind = %kind,
                    quantity = %quantity,
                    new_stock = %new_stock,
                    "Movement applied"
                );
            }
            Event::DataCleared => info!("All inventory data cleared"),
            other => info!(event = ?other, "Domain event"),
        }
    }
    info!("Event channel closed; processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_survives_a_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or error out to the caller.
        sender.notify(Event::DataCleared).await;
    }

    #[tokio::test]
    async fn send_on_a_closed_channel_is_an_event_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        let err = sender.send(Event::DataCleared).await.unwrap_err();
        assert!(matches!(err, ServiceError::EventError(_)));
        assert_eq!(err.wire_message(), "Internal server error");
    }

    #[tokio::test]
    async fn send_delivers_in_order() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender
            .send(Event::CategoryCreated { name: "Limpeza".into() })
            .await
            .unwrap();
        sender
            .send(Event::ProductCreated { name: "Detergente".into() })
            .await
            .unwrap();

        assert!(matches!(rx.recv().await, Some(Event::CategoryCreated { .. })));
        assert!(matches!(rx.recv().await, Some(Event::ProductCreated { .. })));
    }
}
