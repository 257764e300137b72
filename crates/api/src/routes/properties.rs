//! Property endpoint handlers.

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::property::{PropertyDto, PropertyForCreationDto};
use domain::models::PatchDocument;
use persistence::repositories::PropertyRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{IdPath, JsonBody};

/// 201 response carrying a `Location` header and the created record.
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

pub(crate) fn created<T>(location: String, body: T) -> Created<T> {
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(body))
}

pub(crate) fn property_location(property_id: Uuid) -> String {
    format!("/api/properties/{}", property_id)
}

pub(crate) fn save_failed(action: &str, err: sqlx::Error) -> ApiError {
    ApiError::Internal(format!("{} failed on save: {}", action, err))
}

/// List all properties with their tenants.
///
/// GET /api/properties
pub async fn list_properties(
    State(state): State<AppState>,
) -> Result<Json<Vec<PropertyDto>>, ApiError> {
    let repo = PropertyRepository::new(state.pool.clone());
    let properties = repo.list_properties().await?;

    Ok(Json(state.mapper.to_property_dtos(&properties)))
}

/// Get a single property with its tenants.
///
/// GET /api/properties/:property_id
pub async fn get_property(
    State(state): State<AppState>,
    IdPath(property_id): IdPath<Uuid>,
) -> Result<Json<PropertyDto>, ApiError> {
    let repo = PropertyRepository::new(state.pool.clone());
    let property = repo
        .get_property(property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Property {}", property_id)))?;

    Ok(Json(state.mapper.to_property_dto(&property)))
}

/// Create a property, optionally with tenants.
///
/// POST /api/properties
pub async fn create_property(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PropertyForCreationDto>,
) -> Result<Created<PropertyDto>, ApiError> {
    request.validate()?;

    let mut property = state.mapper.property_from_creation(request);
    let mut repo = PropertyRepository::new(state.pool.clone());
    repo.add_property(&mut property);
    repo.save()
        .await
        .map_err(|e| save_failed("Creating a property", e))?;

    info!(
        property_id = %property.id,
        tenants = property.tenants.len(),
        "Property created"
    );

    // Answer with the stored row so the body matches a later GET.
    let stored = repo
        .get_property(property.id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Property {} missing after save", property.id)))?;

    let dto = state.mapper.to_property_dto(&stored);
    Ok(created(property_location(dto.id), dto))
}

/// Apply a patch document to a property.
///
/// PATCH /api/properties/:property_id
pub async fn patch_property(
    State(state): State<AppState>,
    IdPath(property_id): IdPath<Uuid>,
    JsonBody(document): JsonBody<PatchDocument>,
) -> Result<StatusCode, ApiError> {
    let mut repo = PropertyRepository::new(state.pool.clone());
    let mut property = repo
        .get_property(property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Property {}", property_id)))?;

    let patched = document.apply_to(&state.mapper.to_property_update(&property))?;
    patched.validate()?;

    state.mapper.apply_property_update(patched, &mut property);
    repo.update_property(&property);
    repo.save()
        .await
        .map_err(|e| save_failed(&format!("Patching property {}", property_id), e))?;

    info!(property_id = %property_id, operations = document.len(), "Property patched");

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a property; its tenants are removed with it.
///
/// DELETE /api/properties/:property_id
pub async fn delete_property(
    State(state): State<AppState>,
    IdPath(property_id): IdPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut repo = PropertyRepository::new(state.pool.clone());
    let property = repo
        .get_property(property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Property {}", property_id)))?;

    repo.delete_property(&property);
    repo.save()
        .await
        .map_err(|e| save_failed(&format!("Deleting property {}", property_id), e))?;

    info!(
        property_id = %property_id,
        tenants = property.tenants.len(),
        "Property deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_property_location() {
        let id = Uuid::nil();
        assert_eq!(
            property_location(id),
            "/api/properties/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_created_sets_status_and_location() {
        let response = created("/api/properties/abc".to_string(), "body").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/properties/abc"
        );
    }

    #[test]
    fn test_save_failed_is_internal() {
        let error = save_failed("Creating a property", sqlx::Error::PoolTimedOut);
        match error {
            ApiError::Internal(msg) => assert!(msg.starts_with("Creating a property failed on save")),
            other => panic!("Expected Internal, got {:?}", other),
        }
    }
}
