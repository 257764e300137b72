//! Property domain model and transfer records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use super::patch::Patchable;
use super::tenant::{Tenant, TenantDto, TenantForCreationDto};

/// A rentable property and the tenants living in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: Uuid,
    pub description: Option<String>,
    pub market_value: Decimal,
    pub rent: Decimal,
    pub costs: Decimal,
    pub house_number: i32,
    pub street: String,
    pub post_code: String,
    pub country: String,
    /// Owned tenants, ordered by name when loaded from the store.
    pub tenants: Vec<Tenant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Looks up one of this property's tenants by id.
    pub fn tenant(&self, tenant_id: Uuid) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == tenant_id)
    }
}

/// Property as returned to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDto {
    pub id: Uuid,
    pub description: Option<String>,
    pub market_value: Decimal,
    pub rent: Decimal,
    pub costs: Decimal,
    pub house_number: i32,
    pub street: String,
    pub post_code: String,
    pub country: String,
    pub tenants: Vec<TenantDto>,
}

/// Request payload for creating a property, optionally with its tenants.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PropertyForCreationDto {
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub market_value: Decimal,

    pub rent: Decimal,

    pub costs: Decimal,

    #[validate(range(min = 1, max = 500, message = "House number must be between 1 and 500"))]
    pub house_number: i32,

    #[validate(
        length(max = 2000, message = "Street must be at most 2000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub street: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub post_code: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub country: String,

    #[serde(default)]
    #[validate(nested)]
    pub tenants: Vec<TenantForCreationDto>,
}

/// Patchable view of a property.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PropertyForUpdateDto {
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub market_value: Decimal,

    pub rent: Decimal,

    pub costs: Decimal,

    #[validate(range(min = 1, max = 500, message = "House number must be between 1 and 500"))]
    pub house_number: i32,

    #[validate(
        length(max = 2000, message = "Street must be at most 2000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub street: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub post_code: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub country: String,
}

/// Fields of [`PropertyForUpdateDto`] addressable by patch operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Description,
    MarketValue,
    Rent,
    Costs,
    HouseNumber,
    Street,
    PostCode,
    Country,
}

impl Patchable for PropertyForUpdateDto {
    type Field = PropertyField;

    const FIELDS: &'static [PropertyField] = &[
        PropertyField::Description,
        PropertyField::MarketValue,
        PropertyField::Rent,
        PropertyField::Costs,
        PropertyField::HouseNumber,
        PropertyField::Street,
        PropertyField::PostCode,
        PropertyField::Country,
    ];

    fn field_name(field: PropertyField) -> &'static str {
        match field {
            PropertyField::Description => "description",
            PropertyField::MarketValue => "marketValue",
            PropertyField::Rent => "rent",
            PropertyField::Costs => "costs",
            PropertyField::HouseNumber => "houseNumber",
            PropertyField::Street => "street",
            PropertyField::PostCode => "postCode",
            PropertyField::Country => "country",
        }
    }

    fn get(&self, field: PropertyField) -> Value {
        match field {
            PropertyField::Description => json!(self.description),
            PropertyField::MarketValue => json!(self.market_value),
            PropertyField::Rent => json!(self.rent),
            PropertyField::Costs => json!(self.costs),
            PropertyField::HouseNumber => json!(self.house_number),
            PropertyField::Street => json!(self.street),
            PropertyField::PostCode => json!(self.post_code),
            PropertyField::Country => json!(self.country),
        }
    }

    fn set(&mut self, field: PropertyField, value: Value) -> Result<(), serde_json::Error> {
        match field {
            PropertyField::Description => self.description = serde_json::from_value(value)?,
            PropertyField::MarketValue => self.market_value = serde_json::from_value(value)?,
            PropertyField::Rent => self.rent = serde_json::from_value(value)?,
            PropertyField::Costs => self.costs = serde_json::from_value(value)?,
            PropertyField::HouseNumber => self.house_number = serde_json::from_value(value)?,
            PropertyField::Street => self.street = serde_json::from_value(value)?,
            PropertyField::PostCode => self.post_code = serde_json::from_value(value)?,
            PropertyField::Country => self.country = serde_json::from_value(value)?,
        }
        Ok(())
    }

    fn reset(&mut self, field: PropertyField) {
        match field {
            PropertyField::Description => self.description = None,
            PropertyField::MarketValue => self.market_value = Decimal::ZERO,
            PropertyField::Rent => self.rent = Decimal::ZERO,
            PropertyField::Costs => self.costs = Decimal::ZERO,
            PropertyField::HouseNumber => self.house_number = 0,
            PropertyField::Street => self.street.clear(),
            PropertyField::PostCode => self.post_code.clear(),
            PropertyField::Country => self.country.clear(),
        }
    }
}
