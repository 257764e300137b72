//! Tenant endpoint handlers, nested under a property.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::tenant::{TenantDto, TenantForCreationDto};
use domain::models::PatchDocument;
use persistence::repositories::PropertyRepository;

use super::properties::{created, property_location, save_failed, Created};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{IdPath, JsonBody};

fn tenant_location(property_id: Uuid, tenant_id: Uuid) -> String {
    format!("{}/tenants/{}", property_location(property_id), tenant_id)
}

fn property_not_found(property_id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Property {}", property_id))
}

fn tenant_not_found(property_id: Uuid, tenant_id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Tenant {} of property {}", tenant_id, property_id))
}

/// Ensure the parent property exists before touching its tenants.
async fn require_property(repo: &PropertyRepository, property_id: Uuid) -> Result<(), ApiError> {
    if repo.property_exists(property_id).await? {
        Ok(())
    } else {
        Err(property_not_found(property_id))
    }
}

/// List the tenants of a property.
///
/// GET /api/properties/:property_id/tenants
pub async fn list_tenants(
    State(state): State<AppState>,
    IdPath(property_id): IdPath<Uuid>,
) -> Result<Json<Vec<TenantDto>>, ApiError> {
    let repo = PropertyRepository::new(state.pool.clone());
    require_property(&repo, property_id).await?;

    let tenants = repo.list_tenants_for_property(property_id).await?;
    Ok(Json(state.mapper.to_tenant_dtos(&tenants)))
}

/// Get one tenant of a property.
///
/// GET /api/properties/:property_id/tenants/:tenant_id
pub async fn get_tenant(
    State(state): State<AppState>,
    IdPath((property_id, tenant_id)): IdPath<(Uuid, Uuid)>,
) -> Result<Json<TenantDto>, ApiError> {
    let repo = PropertyRepository::new(state.pool.clone());
    require_property(&repo, property_id).await?;

    let tenant = repo
        .find_tenant(property_id, tenant_id)
        .await?
        .ok_or_else(|| tenant_not_found(property_id, tenant_id))?;

    Ok(Json(state.mapper.to_tenant_dto(&tenant)))
}

/// Add a tenant to a property.
///
/// POST /api/properties/:property_id/tenants
pub async fn create_tenant(
    State(state): State<AppState>,
    IdPath(property_id): IdPath<Uuid>,
    JsonBody(request): JsonBody<TenantForCreationDto>,
) -> Result<Created<TenantDto>, ApiError> {
    let mut repo = PropertyRepository::new(state.pool.clone());
    require_property(&repo, property_id).await?;
    request.validate()?;

    let mut tenant = state.mapper.tenant_from_creation(request);
    repo.add_tenant_to_property(property_id, &mut tenant).await?;
    if repo.staged().is_empty() {
        // Property removed between the existence check and staging.
        return Err(property_not_found(property_id));
    }
    repo.save()
        .await
        .map_err(|e| save_failed(&format!("Creating a tenant for property {}", property_id), e))?;

    info!(property_id = %property_id, tenant_id = %tenant.id, "Tenant created");

    let stored = repo
        .find_tenant(property_id, tenant.id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Tenant {} missing after save", tenant.id)))?;

    let dto = state.mapper.to_tenant_dto(&stored);
    Ok(created(tenant_location(property_id, dto.id), dto))
}

/// Apply a patch document to a tenant.
///
/// PATCH /api/properties/:property_id/tenants/:tenant_id
pub async fn patch_tenant(
    State(state): State<AppState>,
    IdPath((property_id, tenant_id)): IdPath<(Uuid, Uuid)>,
    JsonBody(document): JsonBody<PatchDocument>,
) -> Result<StatusCode, ApiError> {
    let mut repo = PropertyRepository::new(state.pool.clone());
    require_property(&repo, property_id).await?;

    let mut tenant = repo
        .find_tenant(property_id, tenant_id)
        .await?
        .ok_or_else(|| tenant_not_found(property_id, tenant_id))?;

    let patched = document.apply_to(&state.mapper.to_tenant_update(&tenant))?;
    patched.validate()?;

    state.mapper.apply_tenant_update(patched, &mut tenant);
    repo.update_tenant(&tenant);
    repo.save().await.map_err(|e| {
        save_failed(
            &format!("Patching tenant {} of property {}", tenant_id, property_id),
            e,
        )
    })?;

    info!(
        property_id = %property_id,
        tenant_id = %tenant_id,
        operations = document.len(),
        "Tenant patched"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a tenant from a property.
///
/// DELETE /api/properties/:property_id/tenants/:tenant_id
pub async fn delete_tenant(
    State(state): State<AppState>,
    IdPath((property_id, tenant_id)): IdPath<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let mut repo = PropertyRepository::new(state.pool.clone());
    require_property(&repo, property_id).await?;

    let tenant = repo
        .find_tenant(property_id, tenant_id)
        .await?
        .ok_or_else(|| tenant_not_found(property_id, tenant_id))?;

    repo.delete_tenant(&tenant);
    repo.save().await.map_err(|e| {
        save_failed(
            &format!("Deleting tenant {} of property {}", tenant_id, property_id),
            e,
        )
    })?;

    info!(property_id = %property_id, tenant_id = %tenant_id, "Tenant deleted");

    Ok(StatusCode::NO_CONTENT)
}
