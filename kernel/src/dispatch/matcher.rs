use crate::model::{geo::GeoPoint, id::CategoryId, slot::TimeSlot, technician::Technician};
use crate::repository::technician::TechnicianDirectory;
use chrono::NaiveDate;
use derive_new::new;
use shared::error::AppResult;
use std::collections::HashSet;
use std::sync::Arc;

/// Geo/availability matcher: category membership, approval + radius,
/// then exact date/slot availability. An empty result is a valid
/// no-match outcome, not an error.
#[derive(new, Clone)]
pub struct EligibilityMatcher {
    technicians: Arc<dyn TechnicianDirectory>,
}

impl EligibilityMatcher {
    pub async fn find_eligible(
        &self,
        center: GeoPoint,
        category_id: CategoryId,
        date: NaiveDate,
        slot: TimeSlot,
        radius_meters: f64,
    ) -> AppResult<Vec<Technician>> {
        let candidates = self.technicians.find_ids_by_category(category_id).await?;
        // Nobody registered for the category: skip the geo and
        // availability queries entirely.
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let nearby = self
            .technicians
            .find_approved_near(center, radius_meters, &candidates)
            .await?;
        if nearby.is_empty() {
            return Ok(Vec::new());
        }

        let nearby_ids: Vec<_> = nearby.iter().map(|t| t.technician_id).collect();
        let available: HashSet<_> = self
            .technicians
            .find_available(&nearby_ids, date, &slot.token())
            .await?
            .into_iter()
            .collect();

        Ok(nearby
            .into_iter()
            .filter(|t| available.contains(&t.technician_id))
            .collect())
    }
}
