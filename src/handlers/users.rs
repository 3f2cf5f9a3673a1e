use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};
use crate::models::{Portfolio, Profile, Settings, SocialLinks};
use crate::state::AppState;
use crate::store;
use crate::store::users::{ProfilePatch, SettingsPatch};
use crate::validation::{double_option, is_valid_email, FieldErrors};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub profile_picture: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_photo: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub social_links: Option<Option<SocialLinks>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
}

impl UpdateProfileRequest {
    fn into_patch(self) -> Result<ProfilePatch, ApiError> {
        let mut errors = FieldErrors::new();

        if let Some(Some(email)) = &self.contact_email {
            if !email.trim().is_empty() && !is_valid_email(email.trim()) {
                errors.add("contact_email", "not a valid email");
            }
        }
        if let Some(None) = self.social_links {
            errors.add("social_links", "must not be null");
        }
        errors.into_result()?;

        let patch = ProfilePatch {
            profile_picture: self.profile_picture,
            cover_photo: self.cover_photo,
            bio: self.bio,
            contact_email: self.contact_email,
            phone: self.phone,
            social_links: self.social_links.flatten(),
        };

        if patch.is_empty() {
            return Err(ApiError::validation("No updatable fields provided"));
        }
        Ok(patch)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub color_scheme: Option<Option<std::collections::HashMap<String, String>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub template_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub font: Option<Option<String>>,
}

impl UpdateSettingsRequest {
    fn into_patch(self) -> Result<SettingsPatch, ApiError> {
        let mut errors = FieldErrors::new();
        if let Some(None) = self.color_scheme {
            errors.add("color_scheme", "must not be null");
        }
        errors.into_result()?;

        let patch = SettingsPatch {
            color_scheme: self.color_scheme.flatten(),
            template_id: self.template_id,
            font: self.font,
        };

        if patch.is_empty() {
            return Err(ApiError::validation("No updatable fields provided"));
        }
        Ok(patch)
    }
}

/// GET /api/users/:id - public portfolio aggregate. Counts one visit,
/// best-effort: the read never fails because the counter did.
pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Portfolio>, ApiError> {
    let user = store::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let profile = store::users::get_profile(&state.pool, id).await?;
    let settings = store::users::get_settings(&state.pool, id).await?;
    let projects = store::projects::list_by_owner(&state.pool, id).await?;
    let skills = store::skills::list_by_owner(&state.pool, id).await?;
    let timeline = store::timeline::list_by_owner(&state.pool, id).await?;
    let testimonials = store::testimonials::list_by_owner(&state.pool, id).await?;
    let blog_posts = store::posts::list_by_owner(&state.pool, id).await?;

    if let Err(e) = store::analytics::record_visit(&state.pool, id).await {
        tracing::warn!(user_id = %id, "visit counter update failed: {}", e);
    }

    Ok(Json(Portfolio {
        user,
        profile,
        settings,
        projects,
        skills,
        timeline,
        testimonials,
        blog_posts,
    }))
}

/// PATCH /api/users/:id - update own profile fields
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    auth_user.require_owner(id)?;
    let patch = payload.into_patch()?;

    let profile = store::users::update_profile(&state.pool, id, patch).await?;
    Ok(Json(profile))
}

/// PATCH /api/users/:id/settings - upsert own settings
pub async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateSettingsRequest>,
) -> Result<Json<Settings>, ApiError> {
    auth_user.require_owner(id)?;
    let patch = payload.into_patch()?;

    let settings = store::users::upsert_settings(&state.pool, id, patch).await?;
    Ok(Json(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_patch_distinguishes_null_from_omitted() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"bio": null, "phone": "123"}"#).unwrap();
        let patch = req.into_patch().unwrap();

        assert_eq!(patch.bio, Some(None));
        assert_eq!(patch.phone, Some(Some("123".to_string())));
        assert_eq!(patch.profile_picture, None);
    }

    #[test]
    fn profile_patch_rejects_bad_contact_email() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"contact_email": "nope"}"#).unwrap();
        assert!(req.into_patch().is_err());
    }

    #[test]
    fn profile_patch_rejects_empty_payload() {
        let req: UpdateProfileRequest = serde_json::from_str("{}").unwrap();
        assert!(req.into_patch().is_err());
    }

    #[test]
    fn settings_patch_allows_clearing_template() {
        let req: UpdateSettingsRequest =
            serde_json::from_str(r#"{"template_id": null}"#).unwrap();
        let patch = req.into_patch().unwrap();
        assert_eq!(patch.template_id, Some(None));
    }

    #[test]
    fn settings_patch_rejects_null_color_scheme() {
        let req: UpdateSettingsRequest =
            serde_json::from_str(r#"{"color_scheme": null}"#).unwrap();
        assert!(req.into_patch().is_err());
    }
}
