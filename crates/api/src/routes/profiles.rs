//! User profile routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::events;
use domain::models::UserProfile;
use domain::models::profile::{CreateProfileRequest, UpdateProfileRequest};
use persistence::repositories::ProfileRepository;
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Create a profile. Public names are globally unique.
///
/// POST /api/profile
pub async fn create_profile(
    State(state): State<AppState>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate()?;

    let repo = ProfileRepository::new(state.pool.clone());
    let public_name = request.public_name.trim();

    if repo.find_by_name(public_name).await?.is_some() {
        return Err(ApiError::Validation("Public name already taken".into()));
    }

    let profile: UserProfile = repo
        .create(
            public_name,
            request.email.as_deref(),
            request.currency.as_deref(),
            request.language.as_deref(),
            request.theme.as_deref(),
            request.notifications,
        )
        .await?
        .into();

    info!(profile_id = %profile.id, public_name = %profile.public_name, "Profile created");

    state
        .broadcaster
        .broadcast(events::PROFILE_CREATED, json!(&profile));

    Ok(Json(profile))
}

/// Fetch a profile by ID.
///
/// GET /api/profile/:id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, ApiError> {
    let repo = ProfileRepository::new(state.pool.clone());

    let profile = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    Ok(Json(profile.into()))
}

/// Partially update a profile.
///
/// PATCH /api/profile/:id
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate()?;

    let repo = ProfileRepository::new(state.pool.clone());

    if let Some(public_name) = request.public_name.as_deref() {
        if let Some(existing) = repo.find_by_name(public_name.trim()).await? {
            if existing.id != id {
                return Err(ApiError::Validation("Public name already taken".into()));
            }
        }
    }

    let profile: UserProfile = repo
        .update(
            id,
            request.public_name.as_deref().map(str::trim),
            request.email.as_deref(),
            request.currency.as_deref(),
            request.language.as_deref(),
            request.theme.as_deref(),
            request.notifications,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?
        .into();

    info!(profile_id = %profile.id, "Profile updated");

    state
        .broadcaster
        .broadcast(events::PROFILE_UPDATED, json!(&profile));

    Ok(Json(profile))
}
