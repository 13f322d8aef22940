use crate::model::id::{BookingId, TechnicianId};
use derive_new::new;

pub mod event {
    use super::*;

    #[derive(Debug, new)]
    pub struct CreateServiceRequest {
        pub booking_id: BookingId,
        pub job_notes: Option<String>,
    }
}

/// Dispatch metadata paired 1:1 with a booking. The broadcast set is a
/// snapshot taken at dispatch time; it is never recomputed, even if
/// technician availability changes mid-window.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    pub booking_id: BookingId,
    pub broadcast_technician_ids: Vec<TechnicianId>,
    pub job_notes: Option<String>,
}
