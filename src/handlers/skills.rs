use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};
use crate::models::Skill;
use crate::state::AppState;
use crate::store;
use crate::store::skills::SkillPatch;
use crate::validation::{double_option, require_str, FieldErrors};

/// Proficiency is a 0-100 percentage.
const PROFICIENCY_RANGE: std::ops::RangeInclusive<i32> = 0..=100;

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    #[serde(default)]
    pub name: String,
    pub proficiency: Option<i32>,
}

impl CreateSkillRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "name", &self.name);
        match self.proficiency {
            None => errors.add("proficiency", "required"),
            Some(p) if !PROFICIENCY_RANGE.contains(&p) => {
                errors.add("proficiency", "must be between 0 and 100")
            }
            _ => {}
        }
        errors.into_result()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSkillRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub proficiency: Option<Option<i32>>,
}

impl UpdateSkillRequest {
    fn into_patch(self) -> Result<SkillPatch, ApiError> {
        let mut errors = FieldErrors::new();
        match &self.name {
            Some(None) => errors.add("name", "must not be null"),
            Some(Some(name)) if name.trim().is_empty() => errors.add("name", "required"),
            _ => {}
        }
        match self.proficiency {
            Some(None) => errors.add("proficiency", "must not be null"),
            Some(Some(p)) if !PROFICIENCY_RANGE.contains(&p) => {
                errors.add("proficiency", "must be between 0 and 100")
            }
            _ => {}
        }
        errors.into_result()?;

        let patch = SkillPatch {
            name: self.name.flatten(),
            proficiency: self.proficiency.flatten(),
        };
        if patch.is_empty() {
            return Err(ApiError::validation("No updatable fields provided"));
        }
        Ok(patch)
    }
}

/// GET /api/users/:id/skills
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let skills = store::skills::list_by_owner(&state.pool, user_id).await?;
    Ok(Json(skills))
}

/// POST /api/users/:id/skills
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), ApiError> {
    auth_user.require_owner(user_id)?;
    payload.validate()?;

    let skill = store::skills::create(
        &state.pool,
        user_id,
        payload.name.trim().to_string(),
        payload.proficiency.unwrap_or(0),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(skill)))
}

/// PATCH /api/skills/:id
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateSkillRequest>,
) -> Result<Json<Skill>, ApiError> {
    let existing = store::skills::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Skill not found"))?;
    auth_user.require_owner(existing.user_id)?;

    let patch = payload.into_patch()?;
    let skill = store::skills::update(&state.pool, id, patch).await?;
    Ok(Json(skill))
}

/// DELETE /api/skills/:id
pub async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = store::skills::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Skill not found"))?;
    auth_user.require_owner(existing.user_id)?;

    store::skills::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_bounds_proficiency() {
        let ok: CreateSkillRequest =
            serde_json::from_str(r#"{"name": "Rust", "proficiency": 85}"#).unwrap();
        assert!(ok.validate().is_ok());

        let high: CreateSkillRequest =
            serde_json::from_str(r#"{"name": "Rust", "proficiency": 120}"#).unwrap();
        assert!(high.validate().is_err());

        let negative: CreateSkillRequest =
            serde_json::from_str(r#"{"name": "Rust", "proficiency": -1}"#).unwrap();
        assert!(negative.validate().is_err());
    }

    #[test]
    fn create_requires_proficiency() {
        let missing: CreateSkillRequest = serde_json::from_str(r#"{"name": "Rust"}"#).unwrap();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn patch_is_selective() {
        let req: UpdateSkillRequest = serde_json::from_str(r#"{"proficiency": 40}"#).unwrap();
        let patch = req.into_patch().unwrap();
        assert!(patch.name.is_none());
        assert_eq!(patch.proficiency, Some(40));
    }
}
