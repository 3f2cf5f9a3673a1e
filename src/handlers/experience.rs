use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};
use crate::models::TimelineEntry;
use crate::state::AppState;
use crate::store;
use crate::store::timeline::{NewTimelineEntry, TimelineEntryPatch};
use crate::validation::{double_option, parse_date, require_str, FieldErrors};

#[derive(Debug, Deserialize)]
pub struct CreateExperienceRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: String,
    /// Omitted or null means the entry is ongoing.
    pub end_date: Option<String>,
}

impl CreateExperienceRequest {
    fn into_new_entry(self) -> Result<NewTimelineEntry, ApiError> {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "title", &self.title);

        let start_date = if self.start_date.trim().is_empty() {
            errors.add("start_date", "required");
            None
        } else {
            parse_date(&mut errors, "start_date", &self.start_date)
        };

        let end_date = match &self.end_date {
            Some(raw) => parse_date(&mut errors, "end_date", raw),
            None => None,
        };

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.add("end_date", "must not precede start_date");
            }
        }
        errors.into_result()?;

        let start_date =
            start_date.ok_or_else(|| ApiError::validation("start_date is required"))?;

        Ok(NewTimelineEntry {
            title: self.title.trim().to_string(),
            description: self.description,
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateExperienceRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<String>>,
}

impl UpdateExperienceRequest {
    /// The start/end ordering rule is only applied when the payload carries
    /// both dates; a one-sided patch is not cross-checked against the stored
    /// row (known gap, consistent with last-write-wins updates).
    fn into_patch(self) -> Result<TimelineEntryPatch, ApiError> {
        let mut errors = FieldErrors::new();

        match &self.title {
            Some(None) => errors.add("title", "must not be null"),
            Some(Some(title)) if title.trim().is_empty() => errors.add("title", "required"),
            _ => {}
        }

        let start_date = match &self.start_date {
            Some(None) => {
                errors.add("start_date", "must not be null");
                None
            }
            Some(Some(raw)) => parse_date(&mut errors, "start_date", raw),
            None => None,
        };

        let end_date = match &self.end_date {
            Some(None) => Some(None),
            Some(Some(raw)) => parse_date(&mut errors, "end_date", raw).map(Some),
            None => None,
        };

        if let (Some(start), Some(Some(end))) = (start_date, end_date) {
            if end < start {
                errors.add("end_date", "must not precede start_date");
            }
        }
        errors.into_result()?;

        let patch = TimelineEntryPatch {
            title: self.title.flatten(),
            description: self.description,
            start_date,
            end_date,
        };
        if patch.is_empty() {
            return Err(ApiError::validation("No updatable fields provided"));
        }
        Ok(patch)
    }
}

/// GET /api/users/:id/experience
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEntry>>, ApiError> {
    let entries = store::timeline::list_by_owner(&state.pool, user_id).await?;
    Ok(Json(entries))
}

/// POST /api/users/:id/experience
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<CreateExperienceRequest>,
) -> Result<(StatusCode, Json<TimelineEntry>), ApiError> {
    auth_user.require_owner(user_id)?;
    let new_entry = payload.into_new_entry()?;

    let entry = store::timeline::create(&state.pool, user_id, new_entry).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PATCH /api/experience/:id
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateExperienceRequest>,
) -> Result<Json<TimelineEntry>, ApiError> {
    let existing = store::timeline::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Timeline entry not found"))?;
    auth_user.require_owner(existing.user_id)?;

    let patch = payload.into_patch()?;
    let entry = store::timeline::update(&state.pool, id, patch).await?;
    Ok(Json(entry))
}

/// DELETE /api/experience/:id
pub async fn remove(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = store::timeline::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Timeline entry not found"))?;
    auth_user.require_owner(existing.user_id)?;

    store::timeline::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn create_coerces_dates() {
        let req: CreateExperienceRequest = serde_json::from_str(
            r#"{"title": "Dev", "start_date": "2020-01-15", "end_date": "2021-06-01"}"#,
        )
        .unwrap();
        let entry = req.into_new_entry().unwrap();
        assert_eq!(entry.start_date, NaiveDate::from_ymd_opt(2020, 1, 15).unwrap());
        assert_eq!(entry.end_date, NaiveDate::from_ymd_opt(2021, 6, 1));
    }

    #[test]
    fn create_allows_ongoing_entries() {
        let req: CreateExperienceRequest =
            serde_json::from_str(r#"{"title": "Dev", "start_date": "2020-01-15"}"#).unwrap();
        let entry = req.into_new_entry().unwrap();
        assert!(entry.end_date.is_none());
    }

    #[test]
    fn create_rejects_end_before_start() {
        let req: CreateExperienceRequest = serde_json::from_str(
            r#"{"title": "Dev", "start_date": "2021-06-01", "end_date": "2020-01-15"}"#,
        )
        .unwrap();
        assert!(req.into_new_entry().is_err());
    }

    #[test]
    fn create_rejects_unparseable_dates() {
        let req: CreateExperienceRequest =
            serde_json::from_str(r#"{"title": "Dev", "start_date": "15/01/2020"}"#).unwrap();
        assert!(req.into_new_entry().is_err());
    }

    #[test]
    fn patch_clears_end_date_with_null() {
        let req: UpdateExperienceRequest =
            serde_json::from_str(r#"{"end_date": null}"#).unwrap();
        let patch = req.into_patch().unwrap();
        assert_eq!(patch.end_date, Some(None));
        assert!(patch.start_date.is_none());
    }

    #[test]
    fn patch_cross_checks_only_when_both_present() {
        let one_sided: UpdateExperienceRequest =
            serde_json::from_str(r#"{"end_date": "1999-01-01"}"#).unwrap();
        assert!(one_sided.into_patch().is_ok());

        let both: UpdateExperienceRequest = serde_json::from_str(
            r#"{"start_date": "2021-06-01", "end_date": "1999-01-01"}"#,
        )
        .unwrap();
        assert!(both.into_patch().is_err());
    }
}
