//! Property entity (database row mapping).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{Property, Tenant};

/// Database row mapping for the properties table.
#[derive(Debug, Clone, FromRow)]
pub struct PropertyEntity {
    pub id: Uuid,
    pub description: Option<String>,
    pub market_value: Decimal,
    pub rent: Decimal,
    pub costs: Decimal,
    pub house_number: i32,
    pub street: String,
    pub post_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyEntity {
    /// Converts the row into a domain property owning the given tenants.
    pub fn into_domain(self, tenants: Vec<Tenant>) -> Property {
        Property {
            id: self.id,
            description: self.description,
            market_value: self.market_value,
            rent: self.rent,
            costs: self.costs,
            house_number: self.house_number,
            street: self.street,
            post_code: self.post_code,
            country: self.country,
            tenants,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<PropertyEntity> for Property {
    fn from(entity: PropertyEntity) -> Self {
        entity.into_domain(Vec::new())
    }
}
