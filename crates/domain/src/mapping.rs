//! Mapping between persisted entities and their transfer records.
//!
//! | Source                   | Target                 | Rule                                  |
//! |--------------------------|------------------------|---------------------------------------|
//! | `Property`               | `PropertyDto`          | field for field, tenants included     |
//! | `PropertyForCreationDto` | `Property`             | field for field, id left unassigned   |
//! | `Tenant`                 | `TenantDto`            | first and last name joined to `name`  |
//! | `TenantForCreationDto`   | `Tenant`               | field for field, id left unassigned   |
//! | `Property` <-> `PropertyForUpdateDto` | both directions | field for field                |
//! | `Tenant` <-> `TenantForUpdateDto`     | both directions | field for field                |
//!
//! A [`TransferMapper`] is built once at start-up and shared read-only.

use chrono::Utc;
use uuid::Uuid;

use crate::models::property::{Property, PropertyDto, PropertyForCreationDto, PropertyForUpdateDto};
use crate::models::tenant::{Tenant, TenantDto, TenantForCreationDto, TenantForUpdateDto};

/// Default separator between a tenant's first and last name.
pub const DEFAULT_NAME_SEPARATOR: &str = " ";

/// Immutable mapping configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMapper {
    name_separator: String,
}

impl Default for TransferMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferMapper {
    pub fn new() -> Self {
        Self {
            name_separator: DEFAULT_NAME_SEPARATOR.to_string(),
        }
    }

    /// Uses a custom separator when building tenant display names.
    pub fn with_name_separator(separator: impl Into<String>) -> Self {
        Self {
            name_separator: separator.into(),
        }
    }

    pub fn name_separator(&self) -> &str {
        &self.name_separator
    }

    pub fn to_property_dto(&self, property: &Property) -> PropertyDto {
        PropertyDto {
            id: property.id,
            description: property.description.clone(),
            market_value: property.market_value,
            rent: property.rent,
            costs: property.costs,
            house_number: property.house_number,
            street: property.street.clone(),
            post_code: property.post_code.clone(),
            country: property.country.clone(),
            tenants: self.to_tenant_dtos(&property.tenants),
        }
    }

    pub fn to_property_dtos(&self, properties: &[Property]) -> Vec<PropertyDto> {
        properties.iter().map(|p| self.to_property_dto(p)).collect()
    }

    pub fn to_tenant_dto(&self, tenant: &Tenant) -> TenantDto {
        TenantDto {
            id: tenant.id,
            property_id: tenant.property_id,
            name: format!(
                "{}{}{}",
                tenant.first_name, self.name_separator, tenant.last_name
            ),
        }
    }

    pub fn to_tenant_dtos(&self, tenants: &[Tenant]) -> Vec<TenantDto> {
        tenants.iter().map(|t| self.to_tenant_dto(t)).collect()
    }

    /// Builds a new, not yet persisted property. Ids stay nil until the
    /// repository assigns them.
    pub fn property_from_creation(&self, dto: PropertyForCreationDto) -> Property {
        let now = Utc::now();
        Property {
            id: Uuid::nil(),
            description: dto.description,
            market_value: dto.market_value,
            rent: dto.rent,
            costs: dto.costs,
            house_number: dto.house_number,
            street: dto.street,
            post_code: dto.post_code,
            country: dto.country,
            tenants: dto
                .tenants
                .into_iter()
                .map(|t| self.tenant_from_creation(t))
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds a new, not yet persisted tenant with no property assigned.
    pub fn tenant_from_creation(&self, dto: TenantForCreationDto) -> Tenant {
        let now = Utc::now();
        Tenant {
            id: Uuid::nil(),
            property_id: Uuid::nil(),
            first_name: dto.first_name,
            last_name: dto.last_name,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_property_update(&self, property: &Property) -> PropertyForUpdateDto {
        PropertyForUpdateDto {
            description: property.description.clone(),
            market_value: property.market_value,
            rent: property.rent,
            costs: property.costs,
            house_number: property.house_number,
            street: property.street.clone(),
            post_code: property.post_code.clone(),
            country: property.country.clone(),
        }
    }

    /// Copies every mapped field back onto the entity. Id and tenants are left alone.
    pub fn apply_property_update(&self, update: PropertyForUpdateDto, property: &mut Property) {
        property.description = update.description;
        property.market_value = update.market_value;
        property.rent = update.rent;
        property.costs = update.costs;
        property.house_number = update.house_number;
        property.street = update.street;
        property.post_code = update.post_code;
        property.country = update.country;
    }

    pub fn to_tenant_update(&self, tenant: &Tenant) -> TenantForUpdateDto {
        TenantForUpdateDto {
            first_name: tenant.first_name.clone(),
            last_name: tenant.last_name.clone(),
        }
    }

    /// Copies every mapped field back onto the entity. Id and property key are left alone.
    pub fn apply_tenant_update(&self, update: TenantForUpdateDto, tenant: &mut Tenant) {
        tenant.first_name = update.first_name;
        tenant.last_name = update.last_name;
    }
}
