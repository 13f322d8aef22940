use crate::model::id::{BookingId, TechnicianId};
use async_trait::async_trait;
use shared::error::AppResult;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum CancelReason {
    Customer,
    Auto,
    Rejected,
}

/// Advisory hooks for collaborators observing booking resolution, e.g.
/// payment capture on confirmation and refunds on cancellation. Hooks
/// fire after the durable transition; a hook failure is logged and never
/// unwinds the transition.
#[async_trait]
pub trait BookingHooks: Send + Sync {
    async fn on_booking_confirmed(
        &self,
        booking_id: BookingId,
        technician_id: TechnicianId,
    ) -> AppResult<()>;

    async fn on_booking_cancelled(
        &self,
        booking_id: BookingId,
        reason: CancelReason,
    ) -> AppResult<()>;
}
