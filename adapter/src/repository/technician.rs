use crate::database::{model::technician::TechnicianRow, ConnectionPool};
use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::model::{
    geo::GeoPoint,
    id::{CategoryId, TechnicianId},
    technician::{ApprovalStatus, AvailabilityState, Technician},
};
use kernel::repository::technician::TechnicianDirectory;
use shared::error::{AppError, AppResult};
use uuid::Uuid;

#[derive(new)]
pub struct TechnicianDirectoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl TechnicianDirectory for TechnicianDirectoryImpl {
    async fn find_ids_by_category(
        &self,
        category_id: CategoryId,
    ) -> AppResult<Vec<TechnicianId>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT technician_id
            FROM technician_categories
            WHERE category_id = $1
            ;
            "#,
        )
        .bind(category_id.raw())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(ids.into_iter().map(Into::into).collect())
    }

    async fn find_approved_near(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        candidates: &[TechnicianId],
    ) -> AppResult<Vec<Technician>> {
        let candidate_ids: Vec<Uuid> = candidates.iter().map(|id| id.raw()).collect();
        let rows: Vec<TechnicianRow> = sqlx::query_as(
            r#"
            SELECT technician_id, technician_name, latitude, longitude
            FROM technicians
            WHERE technician_id = ANY($1)
              AND approval_status = $2
            ;
            "#,
        )
        .bind(&candidate_ids)
        .bind(ApprovalStatus::Approved.to_string())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        // Great-circle distance is computed here rather than in SQL; the
        // candidate set has already been narrowed by category.
        Ok(rows
            .into_iter()
            .map(Technician::from)
            .filter(|t| center.distance_meters(&t.location) <= radius_meters)
            .collect())
    }

    async fn find_available(
        &self,
        candidates: &[TechnicianId],
        date: NaiveDate,
        slot_token: &str,
    ) -> AppResult<Vec<TechnicianId>> {
        let candidate_ids: Vec<Uuid> = candidates.iter().map(|id| id.raw()).collect();
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT technician_id
            FROM technician_availabilities
            WHERE technician_id = ANY($1)
              AND available_date = $2
              AND slot_token = $3
              AND state = $4
            ;
            "#,
        )
        .bind(&candidate_ids)
        .bind(date)
        .bind(slot_token)
        .bind(AvailabilityState::Available.to_string())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(ids.into_iter().map(Into::into).collect())
    }
}
