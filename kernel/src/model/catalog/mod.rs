use crate::model::id::{CategoryId, SubServiceId};

/// Catalog entry for a bookable sub-service: the category it dispatches
/// under and the coin cost a technician pays on acceptance.
#[derive(Debug, Clone)]
pub struct SubService {
    pub sub_service_id: SubServiceId,
    pub category_id: CategoryId,
    pub coin_cost: i64,
}
