use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// The events the system can emit. Consumers subscribe via process_events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Student events
    StudentRegistered(Uuid),
    StudentUpdated(Uuid),
    StudentDeleted(Uuid),

    // Billing events
    TuitionCharged {
        charge_id: Uuid,
        student_id: Uuid,
        amount: i64,
    },
    TuitionSettled {
        charge_id: Uuid,
        student_id: Uuid,
    },
    TuitionSettlementCancelled {
        reverted: u64,
    },
    TuitionChargeDeleted {
        charge_id: Uuid,
        student_id: Uuid,
        refunded: i64,
    },
    MonthlyBillingCompleted {
        billing_month: String,
        charges_created: u64,
    },

    // Bookstore events
    BookCreated(Uuid),
    BookRestocked {
        book_id: Uuid,
        quantity: i32,
        new_stock: i32,
    },
    BookReturnedToSupplier {
        book_id: Uuid,
        quantity: i32,
        new_stock: i32,
    },
    BookSold {
        sale_id: Uuid,
        book_id: Uuid,
        student_id: Uuid,
        quantity: i32,
    },
    BookSaleSettled {
        sale_id: Uuid,
        student_id: Uuid,
    },
    SupplierEntrySettled(Uuid),

    // Payroll events
    WorkRecorded {
        record_id: Uuid,
        teacher_id: Uuid,
    },
    PayrollSettled {
        teacher_id: Uuid,
        year: i32,
        month: i32,
        amount: i64,
    },
    PayrollUnsettled {
        teacher_id: Uuid,
        year: i32,
        month: i32,
    },

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

/// Drains the event channel and logs each event. Runs for the lifetime of
/// the server; exits when every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::TuitionCharged {
                charge_id,
                student_id,
                amount,
            } => {
                info!(
                    %charge_id, %student_id, amount,
                    "tuition charged"
                );
            }
            Event::BookSold {
                sale_id,
                book_id,
                student_id,
                quantity,
            } => {
                info!(%sale_id, %book_id, %student_id, quantity, "book sold");
            }
            Event::PayrollSettled {
                teacher_id,
                year,
                month,
                amount,
            } => {
                info!(%teacher_id, year, month, amount, "payroll settled");
            }
            Event::Generic { message, .. } => {
                warn!("generic event: {}", message);
            }
            other => {
                info!("event: {:?}", other);
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::StudentRegistered(Uuid::new_v4()))
            .await
            .unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(Event::StudentRegistered(_))
        ));
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender.send(Event::with_data("orphaned".into())).await;
        assert!(result.is_err());
    }
}
