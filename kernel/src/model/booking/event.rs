use crate::model::id::{CustomerId, SubServiceId};
use crate::model::slot::TimeSlot;
use chrono::NaiveDate;
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateBooking {
    pub customer_id: CustomerId,
    pub sub_service_id: SubServiceId,
    pub requested_date: NaiveDate,
    pub time_slot: TimeSlot,
}
