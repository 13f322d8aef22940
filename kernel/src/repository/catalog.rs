use crate::model::{catalog::SubService, id::SubServiceId};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn find_sub_service(
        &self,
        sub_service_id: SubServiceId,
    ) -> AppResult<Option<SubService>>;
}
