use crate::database::{model::service_request::ServiceRequestRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{BookingId, TechnicianId},
    service_request::{event::CreateServiceRequest, ServiceRequest},
};
use kernel::repository::service_request::ServiceRequestRepository;
use shared::error::{AppError, AppResult};
use uuid::Uuid;

#[derive(new)]
pub struct ServiceRequestRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ServiceRequestRepository for ServiceRequestRepositoryImpl {
    async fn create(&self, event: CreateServiceRequest) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            INSERT INTO service_requests (booking_id, job_notes)
            VALUES ($1, $2)
            ;
            "#,
        )
        .bind(event.booking_id.raw())
        .bind(event.job_notes)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No service request record has been created".into(),
            ));
        }

        Ok(())
    }

    async fn find_by_booking_id(
        &self,
        booking_id: BookingId,
    ) -> AppResult<Option<ServiceRequest>> {
        let row: Option<ServiceRequestRow> = sqlx::query_as(
            r#"
            SELECT booking_id, job_notes
            FROM service_requests
            WHERE booking_id = $1
            ;
            "#,
        )
        .bind(booking_id.raw())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let technician_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT technician_id
            FROM service_request_technicians
            WHERE booking_id = $1
            ;
            "#,
        )
        .bind(booking_id.raw())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(Some(ServiceRequest {
            booking_id: row.booking_id.into(),
            broadcast_technician_ids: technician_ids.into_iter().map(Into::into).collect(),
            job_notes: row.job_notes,
        }))
    }

    async fn set_broadcast_set(
        &self,
        booking_id: BookingId,
        technician_ids: &[TechnicianId],
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // Written once per pending lifetime; the delete keeps a retried
        // broadcast from doubling the snapshot.
        sqlx::query(
            r#"
            DELETE FROM service_request_technicians
            WHERE booking_id = $1
            ;
            "#,
        )
        .bind(booking_id.raw())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        for technician_id in technician_ids {
            sqlx::query(
                r#"
                INSERT INTO service_request_technicians (booking_id, technician_id)
                VALUES ($1, $2)
                ;
                "#,
            )
            .bind(booking_id.raw())
            .bind(technician_id.raw())
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}
