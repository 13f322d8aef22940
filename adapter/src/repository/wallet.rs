use crate::database::ConnectionPool;
use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::TechnicianId;
use kernel::repository::wallet::WalletRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct WalletRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl WalletRepository for WalletRepositoryImpl {
    async fn balance(&self, technician_id: TechnicianId) -> AppResult<i64> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT balance
            FROM wallets
            WHERE technician_id = $1
            ;
            "#,
        )
        .bind(technician_id.raw())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(balance.unwrap_or(0))
    }

    async fn debit(&self, technician_id: TechnicianId, amount: i64) -> AppResult<()> {
        // The balance floor lives in the WHERE clause, so two debits
        // racing for the same wallet can never drive it negative.
        let res = sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance - $2
            WHERE technician_id = $1
              AND balance >= $2
            ;
            "#,
        )
        .bind(technician_id.raw())
        .bind(amount)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            let current = self.balance(technician_id).await?;
            return Err(AppError::InsufficientBalance {
                required: amount,
                current,
            });
        }

        Ok(())
    }

    async fn credit(&self, technician_id: TechnicianId, amount: i64) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            INSERT INTO wallets (technician_id, balance)
            VALUES ($1, $2)
            ON CONFLICT (technician_id)
            DO UPDATE SET balance = wallets.balance + EXCLUDED.balance
            ;
            "#,
        )
        .bind(technician_id.raw())
        .bind(amount)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No wallet record has been credited".into(),
            ));
        }

        Ok(())
    }
}
