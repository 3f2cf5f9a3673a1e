use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};
use crate::models::Testimonial;
use crate::state::AppState;
use crate::store;
use crate::store::testimonials::TestimonialPatch;
use crate::validation::{double_option, require_str, FieldErrors};

#[derive(Debug, Deserialize)]
pub struct CreateTestimonialRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub feedback: String,
}

impl CreateTestimonialRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "client_name", &self.client_name);
        require_str(&mut errors, "feedback", &self.feedback);
        errors.into_result()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTestimonialRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub client_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub feedback: Option<Option<String>>,
}

impl UpdateTestimonialRequest {
    fn into_patch(self) -> Result<TestimonialPatch, ApiError> {
        let mut errors = FieldErrors::new();
        if let Some(None) = self.client_name {
            errors.add("client_name", "must not be null");
        }
        if let Some(None) = self.feedback {
            errors.add("feedback", "must not be null");
        }
        errors.into_result()?;

        let patch = TestimonialPatch {
            client_name: self.client_name.flatten(),
            feedback: self.feedback.flatten(),
        };
        if patch.is_empty() {
            return Err(ApiError::validation("No updatable fields provided"));
        }
        Ok(patch)
    }
}

/// GET /api/users/:id/testimonials
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    let testimonials = store::testimonials::list_by_owner(&state.pool, user_id).await?;
    Ok(Json(testimonials))
}

/// POST /api/users/:id/testimonials
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<CreateTestimonialRequest>,
) -> Result<(StatusCode, Json<Testimonial>), ApiError> {
    auth_user.require_owner(user_id)?;
    payload.validate()?;

    let testimonial = store::testimonials::create(
        &state.pool,
        user_id,
        payload.client_name.trim().to_string(),
        payload.feedback,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(testimonial)))
}

/// PATCH /api/testimonials/:id
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateTestimonialRequest>,
) -> Result<Json<Testimonial>, ApiError> {
    let existing = store::testimonials::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Testimonial not found"))?;
    auth_user.require_owner(existing.user_id)?;

    let patch = payload.into_patch()?;
    let testimonial = store::testimonials::update(&state.pool, id, patch).await?;
    Ok(Json(testimonial))
}

/// DELETE /api/testimonials/:id
pub async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = store::testimonials::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Testimonial not found"))?;
    auth_user.require_owner(existing.user_id)?;

    store::testimonials::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
