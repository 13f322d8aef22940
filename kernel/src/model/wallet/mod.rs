use crate::model::id::TechnicianId;

/// A technician's coin wallet. The balance is never negative: debits
/// that would cross zero are rejected at the store, not clamped.
#[derive(Debug, Clone)]
pub struct Wallet {
    pub technician_id: TechnicianId,
    pub balance: i64,
}
