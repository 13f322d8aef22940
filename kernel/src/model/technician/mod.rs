use crate::model::geo::GeoPoint;
use crate::model::id::TechnicianId;
use strum::{Display, EnumString};

#[derive(Debug, Clone)]
pub struct Technician {
    pub technician_id: TechnicianId,
    pub technician_name: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// State of a published availability record for one date and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AvailabilityState {
    Available,
    Booked,
    Unavailable,
}
