use chrono::{DateTime, NaiveDate, Utc};
use garde::Validate;
use kernel::model::{
    booking::Booking,
    id::{BookingId, CustomerId, SubServiceId, TechnicianId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[garde(skip)]
    pub customer_id: CustomerId,
    #[garde(skip)]
    pub sub_service_id: SubServiceId,
    #[garde(skip)]
    pub requested_date: NaiveDate,
    // The slot token, e.g. "18:00-19:00"; parsed in the handler.
    #[garde(length(min = 1))]
    pub time_slot: String,
    #[garde(inner(length(max = 500)))]
    pub job_notes: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub booking_id: BookingId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AcceptBookingRequest {
    #[garde(skip)]
    pub technician_id: TechnicianId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingRequest {
    #[garde(skip)]
    pub customer_id: CustomerId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastResponse {
    pub notified_technicians: usize,
    pub auto_cancel_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: BookingId,
    pub customer_id: CustomerId,
    pub technician_id: Option<TechnicianId>,
    pub sub_service_id: SubServiceId,
    pub requested_date: NaiveDate,
    pub time_slot: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub auto_cancel_at: Option<DateTime<Utc>>,
    pub arrival_deadline: Option<DateTime<Utc>>,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            booking_id,
            customer_id,
            technician_id,
            sub_service_id,
            requested_date,
            time_slot,
            status,
            created_at,
            accepted_at,
            auto_cancel_at,
            arrival_deadline,
        } = value;
        Self {
            booking_id,
            customer_id,
            technician_id,
            sub_service_id,
            requested_date,
            time_slot: time_slot.token(),
            status: status.to_string(),
            created_at,
            accepted_at,
            auto_cancel_at,
            arrival_deadline,
        }
    }
}
