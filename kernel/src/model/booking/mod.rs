use crate::model::id::{BookingId, CustomerId, SubServiceId, TechnicianId};
use crate::model::slot::TimeSlot;
use chrono::{DateTime, NaiveDate, Utc};
use strum::{Display, EnumString};

pub mod event;

#[derive(Debug, Clone)]
pub struct Booking {
    pub booking_id: BookingId,
    pub customer_id: CustomerId,
    // Set exactly once, on the transition into Confirmed.
    pub technician_id: Option<TechnicianId>,
    pub sub_service_id: SubServiceId,
    pub requested_date: NaiveDate,
    pub time_slot: TimeSlot,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub auto_cancel_at: Option<DateTime<Utc>>,
    pub arrival_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    AutoCancelled,
    Rejected,
}

impl BookingStatus {
    /// Active bookings block duplicate submissions for the same
    /// customer, sub-service, date and slot.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::InProgress
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Completed
                | BookingStatus::Cancelled
                | BookingStatus::AutoCancelled
                | BookingStatus::Rejected
        )
    }
}
