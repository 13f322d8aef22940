use crate::model::id::TechnicianId;
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Current balance; a technician without a wallet row reads as zero.
    async fn balance(&self, technician_id: TechnicianId) -> AppResult<i64>;

    /// Atomic floor-checked decrement. Fails with
    /// `AppError::InsufficientBalance` (carrying required and current
    /// amounts) without mutating the balance. Safe under concurrent
    /// debits for the same technician.
    async fn debit(&self, technician_id: TechnicianId, amount: i64) -> AppResult<()>;

    /// Atomic increment; creates the wallet at zero if absent.
    async fn credit(&self, technician_id: TechnicianId, amount: i64) -> AppResult<()>;
}
