use crate::model::{
    geo::GeoPoint,
    id::{CategoryId, TechnicianId},
    technician::Technician,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

/// Read-side directory the matcher consumes. Profile CRUD lives outside
/// the dispatch core; only these lookups cross the boundary.
#[async_trait]
pub trait TechnicianDirectory: Send + Sync {
    /// Technicians registered for the category (many-to-many).
    async fn find_ids_by_category(&self, category_id: CategoryId)
        -> AppResult<Vec<TechnicianId>>;

    /// Approved technicians from `candidates` whose location lies within
    /// `radius_meters` of `center` (great-circle distance).
    async fn find_approved_near(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        candidates: &[TechnicianId],
    ) -> AppResult<Vec<Technician>>;

    /// Technicians from `candidates` with an `available` record for the
    /// calendar date and exact slot token.
    async fn find_available(
        &self,
        candidates: &[TechnicianId],
        date: NaiveDate,
        slot_token: &str,
    ) -> AppResult<Vec<TechnicianId>>;
}
