use kernel::model::{geo::GeoPoint, technician::Technician};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub struct TechnicianRow {
    pub technician_id: Uuid,
    pub technician_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<TechnicianRow> for Technician {
    fn from(row: TechnicianRow) -> Self {
        Technician {
            technician_id: row.technician_id.into(),
            technician_name: row.technician_name,
            location: GeoPoint::new(row.latitude, row.longitude),
        }
    }
}
