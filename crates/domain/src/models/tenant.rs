//! Tenant domain model and transfer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use super::patch::Patchable;

/// A tenant living in a property.
///
/// Tenants only hold the key of their property, never the property itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Tenant {
    pub id: Uuid,
    pub property_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant as returned to clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenantDto {
    pub id: Uuid,
    pub property_id: Uuid,
    /// First and last name joined together.
    pub name: String,
}

/// Request payload for creating a tenant.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TenantForCreationDto {
    #[validate(
        length(max = 100, message = "First name must be at most 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub first_name: String,

    #[validate(
        length(max = 100, message = "Last name must be at most 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub last_name: String,
}

/// Patchable view of a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TenantForUpdateDto {
    #[validate(
        length(max = 100, message = "First name must be at most 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub first_name: String,

    #[validate(
        length(max = 100, message = "Last name must be at most 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub last_name: String,
}

/// Fields of [`TenantForUpdateDto`] addressable by patch operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantField {
    FirstName,
    LastName,
}

impl Patchable for TenantForUpdateDto {
    type Field = TenantField;

    const FIELDS: &'static [TenantField] = &[TenantField::FirstName, TenantField::LastName];

    fn field_name(field: TenantField) -> &'static str {
        match field {
            TenantField::FirstName => "firstName",
            TenantField::LastName => "lastName",
        }
    }

    fn get(&self, field: TenantField) -> Value {
        match field {
            TenantField::FirstName => json!(self.first_name),
            TenantField::LastName => json!(self.last_name),
        }
    }

    fn set(&mut self, field: TenantField, value: Value) -> Result<(), serde_json::Error> {
        match field {
            TenantField::FirstName => self.first_name = serde_json::from_value(value)?,
            TenantField::LastName => self.last_name = serde_json::from_value(value)?,
        }
        Ok(())
    }

    fn reset(&mut self, field: TenantField) {
        match field {
            TenantField::FirstName => self.first_name.clear(),
            TenantField::LastName => self.last_name.clear(),
        }
    }
}
