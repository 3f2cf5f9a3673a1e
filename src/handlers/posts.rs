use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};
use crate::models::BlogPost;
use crate::state::AppState;
use crate::store;
use crate::store::posts::BlogPostPatch;
use crate::validation::{double_option, require_str, FieldErrors};

#[derive(Debug, Deserialize)]
pub struct CreateBlogPostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl CreateBlogPostRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "title", &self.title);
        require_str(&mut errors, "content", &self.content);
        errors.into_result()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBlogPostRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub content: Option<Option<String>>,
}

impl UpdateBlogPostRequest {
    fn into_patch(self) -> Result<BlogPostPatch, ApiError> {
        let mut errors = FieldErrors::new();
        if let Some(None) = self.title {
            errors.add("title", "must not be null");
        }
        if let Some(None) = self.content {
            errors.add("content", "must not be null");
        }
        errors.into_result()?;

        let patch = BlogPostPatch {
            title: self.title.flatten(),
            content: self.content.flatten(),
        };
        if patch.is_empty() {
            return Err(ApiError::validation("No updatable fields provided"));
        }
        Ok(patch)
    }
}

/// GET /api/users/:id/blog-posts
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let posts = store::posts::list_by_owner(&state.pool, user_id).await?;
    Ok(Json(posts))
}

/// POST /api/users/:id/blog-posts
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<CreateBlogPostRequest>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    auth_user.require_owner(user_id)?;
    payload.validate()?;

    let post = store::posts::create(
        &state.pool,
        user_id,
        payload.title.trim().to_string(),
        payload.content,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// PATCH /api/blog-posts/:id
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateBlogPostRequest>,
) -> Result<Json<BlogPost>, ApiError> {
    let existing = store::posts::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog post not found"))?;
    auth_user.require_owner(existing.user_id)?;

    let patch = payload.into_patch()?;
    let post = store::posts::update(&state.pool, id, patch).await?;
    Ok(Json(post))
}

/// DELETE /api/blog-posts/:id
pub async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = store::posts::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog post not found"))?;
    auth_user.require_owner(existing.user_id)?;

    store::posts::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
