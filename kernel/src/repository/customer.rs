use crate::model::{geo::GeoPoint, id::CustomerId};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// The customer's stored location, if they have completed their
    /// address. `None` is a caller-side precondition failure for
    /// booking creation and broadcast.
    async fn find_location(&self, customer_id: CustomerId) -> AppResult<Option<GeoPoint>>;
}
