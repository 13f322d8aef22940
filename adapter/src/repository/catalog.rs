use crate::database::{model::catalog::SubServiceRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{catalog::SubService, id::SubServiceId};
use kernel::repository::catalog::ServiceCatalog;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct ServiceCatalogImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ServiceCatalog for ServiceCatalogImpl {
    async fn find_sub_service(
        &self,
        sub_service_id: SubServiceId,
    ) -> AppResult<Option<SubService>> {
        let row: Option<SubServiceRow> = sqlx::query_as(
            r#"
            SELECT sub_service_id, category_id, coin_cost
            FROM sub_services
            WHERE sub_service_id = $1
            ;
            "#,
        )
        .bind(sub_service_id.raw())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(SubService::from))
    }
}
