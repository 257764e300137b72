//! Tenant entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Tenant;

/// Database row mapping for the tenants table.
#[derive(Debug, Clone, FromRow)]
pub struct TenantEntity {
    pub id: Uuid,
    pub property_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantEntity> for Tenant {
    fn from(entity: TenantEntity) -> Self {
        Self {
            id: entity.id,
            property_id: entity.property_id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
