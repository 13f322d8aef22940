use crate::model::id::{CustomerId, TechnicianId};
use async_trait::async_trait;
use shared::error::AppResult;
use strum::{Display, EnumString};

/// The only event names the core pushes through the fan-out. Clients
/// subscribe per recipient; delivery is at-most-once best effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum NotifyEvent {
    NewBookingRequest,
    BookingRequestClosed,
    BookingAccepted,
    BookingAutoCancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Customer(CustomerId),
    Technician(TechnicianId),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        recipient: Recipient,
        event: NotifyEvent,
        payload: serde_json::Value,
    ) -> AppResult<()>;
}

/// State transitions commit before notifications go out, so a failed
/// push must never surface to the caller; it is logged and dropped.
pub async fn notify_best_effort(
    notifier: &dyn Notifier,
    recipient: Recipient,
    event: NotifyEvent,
    payload: serde_json::Value,
) {
    if let Err(error) = notifier.notify(recipient, event, payload).await {
        tracing::warn!(?recipient, %event, %error, "notification dropped");
    }
}
