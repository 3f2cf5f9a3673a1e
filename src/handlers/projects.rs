use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};
use crate::models::Project;
use crate::state::AppState;
use crate::store;
use crate::store::projects::{NewProject, ProjectPatch};
use crate::validation::{double_option, require_str, FieldErrors};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub project_url: Option<String>,
}

impl CreateProjectRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "title", &self.title);
        errors.into_result()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub images: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub project_url: Option<Option<String>>,
}

impl UpdateProjectRequest {
    fn into_patch(self) -> Result<ProjectPatch, ApiError> {
        let mut errors = FieldErrors::new();
        match &self.title {
            Some(None) => errors.add("title", "must not be null"),
            Some(Some(title)) if title.trim().is_empty() => errors.add("title", "required"),
            _ => {}
        }
        if let Some(None) = self.images {
            errors.add("images", "must not be null");
        }
        errors.into_result()?;

        let patch = ProjectPatch {
            title: self.title.flatten(),
            description: self.description,
            images: self.images.flatten(),
            project_url: self.project_url,
        };

        if patch.is_empty() {
            return Err(ApiError::validation("No updatable fields provided"));
        }
        Ok(patch)
    }
}

/// GET /api/users/:id/projects - public project list
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = store::projects::list_by_owner(&state.pool, user_id).await?;
    Ok(Json(projects))
}

/// POST /api/users/:id/projects - create a project under own account
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    auth_user.require_owner(user_id)?;
    payload.validate()?;

    let project = store::projects::create(
        &state.pool,
        user_id,
        NewProject {
            title: payload.title.trim().to_string(),
            description: payload.description,
            images: payload.images,
            project_url: payload.project_url,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id - public project detail. Records a view for the
/// owner's analytics, best-effort.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let project = store::projects::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    let seen_at = chrono::Utc::now().timestamp();
    if let Err(e) =
        store::analytics::record_project_view(&state.pool, project.user_id, project.id, seen_at)
            .await
    {
        tracing::warn!(project_id = %project.id, "project view update failed: {}", e);
    }

    Ok(Json(project))
}

/// PATCH /api/projects/:id - partial update, owner only
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    // Existence first: a missing project is 404 even for a non-owner.
    let existing = store::projects::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    auth_user.require_owner(existing.user_id)?;

    let patch = payload.into_patch()?;
    let project = store::projects::update(&state.pool, id, patch).await?;
    Ok(Json(project))
}

/// DELETE /api/projects/:id - owner only; removes dependent comments
pub async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = store::projects::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    auth_user.require_owner(existing.user_id)?;

    store::projects::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_title() {
        let payload: CreateProjectRequest = serde_json::from_str("{}").unwrap();
        assert!(payload.validate().is_err());

        let payload: CreateProjectRequest =
            serde_json::from_str(r#"{"title": "Site", "images": ["a.png"]}"#).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn patch_keeps_omitted_fields_untouched() {
        let req: UpdateProjectRequest = serde_json::from_str(r#"{"title": "X"}"#).unwrap();
        let patch = req.into_patch().unwrap();

        assert_eq!(patch.title, Some("X".to_string()));
        assert!(patch.description.is_none());
        assert!(patch.images.is_none());
        assert!(patch.project_url.is_none());
    }

    #[test]
    fn patch_writes_explicit_nulls() {
        let req: UpdateProjectRequest =
            serde_json::from_str(r#"{"description": null, "project_url": null}"#).unwrap();
        let patch = req.into_patch().unwrap();

        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.project_url, Some(None));
        assert!(patch.title.is_none());
    }

    #[test]
    fn patch_rejects_null_title() {
        let req: UpdateProjectRequest = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert!(req.into_patch().is_err());
    }

    #[test]
    fn patch_rejects_empty_payload() {
        let req: UpdateProjectRequest = serde_json::from_str("{}").unwrap();
        assert!(req.into_patch().is_err());
    }
}
