use crate::model::{
    booking::{event::CreateBooking, Booking, BookingStatus},
    id::{BookingId, CustomerId, SubServiceId, TechnicianId},
    slot::TimeSlot,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::error::AppResult;

/// The durable booking record, the single source of truth for the state
/// machine. Every transition out of `Pending` is a conditional update on
/// the stored status; the methods returning `bool` report whether the
/// conditional write took effect (`false` means some other transition
/// won the race).
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId>;

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;

    /// Duplicate-submission guard: an active (pending/confirmed/in
    /// progress) booking for the same customer, sub-service, date and
    /// slot already exists.
    async fn active_duplicate_exists(
        &self,
        customer_id: CustomerId,
        sub_service_id: SubServiceId,
        requested_date: NaiveDate,
        time_slot: TimeSlot,
    ) -> AppResult<bool>;

    /// Attach the auto-cancel deadline at broadcast time. Conditional on
    /// the booking still being pending without a deadline.
    async fn mark_broadcast(
        &self,
        booking_id: BookingId,
        auto_cancel_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// The acceptance compare-and-set: `Pending -> Confirmed`, writing
    /// the technician reference, acceptance timestamp and arrival
    /// deadline in the same conditional update.
    async fn try_confirm(
        &self,
        booking_id: BookingId,
        technician_id: TechnicianId,
        accepted_at: DateTime<Utc>,
        arrival_deadline: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Compensation for a wallet debit that failed after the acceptance
    /// CAS committed: `Confirmed -> Pending`, clearing the technician
    /// reference and timestamps.
    async fn try_revert_confirm(&self, booking_id: BookingId) -> AppResult<bool>;

    /// Generic conditional status transition, used for customer
    /// cancellation and auto-cancellation.
    async fn try_transition(
        &self,
        booking_id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<bool>;

    /// Boot-recovery scan: pending bookings that have been broadcast
    /// (non-null deadline).
    async fn find_pending_with_deadline(&self) -> AppResult<Vec<Booking>>;
}
