use kernel::model::catalog::SubService;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub struct SubServiceRow {
    pub sub_service_id: Uuid,
    pub category_id: Uuid,
    pub coin_cost: i64,
}

impl From<SubServiceRow> for SubService {
    fn from(row: SubServiceRow) -> Self {
        SubService {
            sub_service_id: row.sub_service_id.into(),
            category_id: row.category_id.into(),
            coin_cost: row.coin_cost,
        }
    }
}
