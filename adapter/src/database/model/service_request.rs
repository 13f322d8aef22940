use uuid::Uuid;

/// Raw `service_requests` row; the broadcast set lives in the separate
/// `service_request_technicians` table and is joined in by the
/// repository.
#[derive(sqlx::FromRow)]
pub struct ServiceRequestRow {
    pub booking_id: Uuid,
    pub job_notes: Option<String>,
}
