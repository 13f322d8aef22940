use chrono::{DateTime, NaiveDate, Utc};
use kernel::model::{
    booking::{Booking, BookingStatus},
    slot::TimeSlot,
};
use shared::error::AppError;
use uuid::Uuid;

/// Raw `bookings` row. `time_slot` is the stored start hour and `status`
/// the snake_case token; both are validated on the way into the kernel
/// type.
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub technician_id: Option<Uuid>,
    pub sub_service_id: Uuid,
    pub requested_date: NaiveDate,
    pub time_slot: i16,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub auto_cancel_at: Option<DateTime<Utc>>,
    pub arrival_deadline: Option<DateTime<Utc>>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row.status.parse().map_err(|_| {
            AppError::ConversionEntityError(format!("unknown booking status: {}", row.status))
        })?;
        let hour = u8::try_from(row.time_slot).map_err(|_| {
            AppError::ConversionEntityError(format!("invalid slot hour: {}", row.time_slot))
        })?;
        let time_slot = TimeSlot::try_from(hour).map_err(AppError::ConversionEntityError)?;

        Ok(Booking {
            booking_id: row.booking_id.into(),
            customer_id: row.customer_id.into(),
            technician_id: row.technician_id.map(Into::into),
            sub_service_id: row.sub_service_id.into(),
            requested_date: row.requested_date,
            time_slot,
            status,
            created_at: row.created_at,
            accepted_at: row.accepted_at,
            auto_cancel_at: row.auto_cancel_at,
            arrival_deadline: row.arrival_deadline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> BookingRow {
        BookingRow {
            booking_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            technician_id: None,
            sub_service_id: Uuid::new_v4(),
            requested_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            time_slot: 18,
            status: "pending".into(),
            created_at: Utc::now(),
            accepted_at: None,
            auto_cancel_at: None,
            arrival_deadline: None,
        }
    }

    #[test]
    fn converts_a_valid_row() {
        let booking = Booking::try_from(row()).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.time_slot, TimeSlot::H18);
    }

    #[test]
    fn rejects_an_unknown_status_token() {
        let mut bad = row();
        bad.status = "limbo".into();
        assert!(matches!(
            Booking::try_from(bad),
            Err(AppError::ConversionEntityError(_))
        ));
    }

    #[test]
    fn rejects_an_out_of_window_slot_hour() {
        let mut bad = row();
        bad.time_slot = 23;
        assert!(matches!(
            Booking::try_from(bad),
            Err(AppError::ConversionEntityError(_))
        ));
    }
}
