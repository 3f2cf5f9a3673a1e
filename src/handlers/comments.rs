use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::models::Comment;
use crate::state::AppState;
use crate::store;
use crate::validation::{require_str, FieldErrors};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub visitor_name: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl CreateCommentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "content", &self.content);
        errors.into_result()
    }
}

/// GET /api/projects/:id/comments - public
pub async fn list(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = store::comments::list_for_project(&state.pool, project_id).await?;
    Ok(Json(comments))
}

/// POST /api/projects/:id/comments - public, no ownership restriction
pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    ApiJson(payload): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    payload.validate()?;

    let comment = store::comments::create(
        &state.pool,
        project_id,
        payload.visitor_name,
        payload.content,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
