use crate::database::ConnectionPool;
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{geo::GeoPoint, id::CustomerId};
use kernel::repository::customer::CustomerDirectory;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct CustomerDirectoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl CustomerDirectory for CustomerDirectoryImpl {
    async fn find_location(&self, customer_id: CustomerId) -> AppResult<Option<GeoPoint>> {
        let row: Option<(Option<f64>, Option<f64>)> = sqlx::query_as(
            r#"
            SELECT latitude, longitude
            FROM customers
            WHERE customer_id = $1
            ;
            "#,
        )
        .bind(customer_id.raw())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        // A customer who has not completed their address has NULL
        // coordinates; both read the same as an unknown customer here.
        Ok(match row {
            Some((Some(latitude), Some(longitude))) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        })
    }
}
