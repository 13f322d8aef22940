use crate::model::{
    id::{BookingId, TechnicianId},
    service_request::{event::CreateServiceRequest, ServiceRequest},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    async fn create(&self, event: CreateServiceRequest) -> AppResult<()>;

    async fn find_by_booking_id(
        &self,
        booking_id: BookingId,
    ) -> AppResult<Option<ServiceRequest>>;

    /// Persist the broadcast snapshot. Written once per pending
    /// lifetime, when dispatch computes eligibility.
    async fn set_broadcast_set(
        &self,
        booking_id: BookingId,
        technician_ids: &[TechnicianId],
    ) -> AppResult<()>;
}
