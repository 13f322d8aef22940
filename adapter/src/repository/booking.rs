use crate::database::{model::booking::BookingRow, ConnectionPool};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use derive_new::new;
use kernel::model::{
    booking::{event::CreateBooking, Booking, BookingStatus},
    id::{BookingId, CustomerId, SubServiceId, TechnicianId},
    slot::TimeSlot,
};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
        let booking_id = BookingId::new();
        let res = sqlx::query(
            r#"
            INSERT INTO bookings
            (booking_id, customer_id, sub_service_id, requested_date,
            time_slot, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ;
            "#,
        )
        .bind(booking_id.raw())
        .bind(event.customer_id.raw())
        .bind(event.sub_service_id.raw())
        .bind(event.requested_date)
        .bind(i16::from(event.time_slot.start_hour()))
        .bind(BookingStatus::Pending.to_string())
        .bind(Utc::now())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        Ok(booking_id)
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            SELECT
            booking_id, customer_id, technician_id, sub_service_id,
            requested_date, time_slot, status, created_at,
            accepted_at, auto_cancel_at, arrival_deadline
            FROM bookings
            WHERE booking_id = $1
            ;
            "#,
        )
        .bind(booking_id.raw())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(Booking::try_from).transpose()
    }

    async fn active_duplicate_exists(
        &self,
        customer_id: CustomerId,
        sub_service_id: SubServiceId,
        requested_date: NaiveDate,
        time_slot: TimeSlot,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM bookings
                WHERE customer_id = $1
                  AND sub_service_id = $2
                  AND requested_date = $3
                  AND time_slot = $4
                  AND status = ANY($5)
            )
            ;
            "#,
        )
        .bind(customer_id.raw())
        .bind(sub_service_id.raw())
        .bind(requested_date)
        .bind(i16::from(time_slot.start_hour()))
        .bind(active_status_tokens())
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(exists)
    }

    async fn mark_broadcast(
        &self,
        booking_id: BookingId,
        auto_cancel_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE bookings
            SET auto_cancel_at = $2
            WHERE booking_id = $1
              AND status = $3
              AND auto_cancel_at IS NULL
            ;
            "#,
        )
        .bind(booking_id.raw())
        .bind(auto_cancel_at)
        .bind(BookingStatus::Pending.to_string())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(res.rows_affected() > 0)
    }

    async fn try_confirm(
        &self,
        booking_id: BookingId,
        technician_id: TechnicianId,
        accepted_at: DateTime<Utc>,
        arrival_deadline: DateTime<Utc>,
    ) -> AppResult<bool> {
        // The conditional WHERE clause is the whole acceptance race:
        // exactly one concurrent caller observes rows_affected = 1.
        let res = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $5,
                technician_id = $2,
                accepted_at = $3,
                arrival_deadline = $4
            WHERE booking_id = $1
              AND status = $6
              AND technician_id IS NULL
            ;
            "#,
        )
        .bind(booking_id.raw())
        .bind(technician_id.raw())
        .bind(accepted_at)
        .bind(arrival_deadline)
        .bind(BookingStatus::Confirmed.to_string())
        .bind(BookingStatus::Pending.to_string())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(res.rows_affected() > 0)
    }

    async fn try_revert_confirm(&self, booking_id: BookingId) -> AppResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2,
                technician_id = NULL,
                accepted_at = NULL,
                arrival_deadline = NULL
            WHERE booking_id = $1
              AND status = $3
            ;
            "#,
        )
        .bind(booking_id.raw())
        .bind(BookingStatus::Pending.to_string())
        .bind(BookingStatus::Confirmed.to_string())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(res.rows_affected() > 0)
    }

    async fn try_transition(
        &self,
        booking_id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $3
            WHERE booking_id = $1
              AND status = $2
            ;
            "#,
        )
        .bind(booking_id.raw())
        .bind(from.to_string())
        .bind(to.to_string())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(res.rows_affected() > 0)
    }

    async fn find_pending_with_deadline(&self) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT
            booking_id, customer_id, technician_id, sub_service_id,
            requested_date, time_slot, status, created_at,
            accepted_at, auto_cancel_at, arrival_deadline
            FROM bookings
            WHERE status = $1
              AND auto_cancel_at IS NOT NULL
            ORDER BY auto_cancel_at ASC
            ;
            "#,
        )
        .bind(BookingStatus::Pending.to_string())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}

fn active_status_tokens() -> Vec<String> {
    [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}
