use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::state::AppState;
use crate::store;
use crate::validation::{is_valid_email, require_str, FieldErrors};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    /// The credential field keeps its historical wire name; the value is the
    /// plaintext password and is hashed before it reaches the store.
    #[serde(default)]
    pub password_hash: String,
    #[serde(default)]
    pub name: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "email", &self.email);
        if !self.email.trim().is_empty() && !is_valid_email(self.email.trim()) {
            errors.add("email", "not a valid email");
        }
        require_str(&mut errors, "password_hash", &self.password_hash);
        require_str(&mut errors, "name", &self.name);
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password_hash: String,
}

impl LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "email", &self.email);
        require_str(&mut errors, "password_hash", &self.password_hash);
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: String,
}

/// POST /api/auth/register - create user + empty profile, return both with a token
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let hashed = auth::hash_password(&payload.password_hash)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))?;

    let (user, profile) = store::users::create_with_profile(
        &state.pool,
        payload.email.trim(),
        &hashed,
        payload.name.trim(),
    )
    .await?;

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id, "registered new user");

    Ok(Json(json!({ "user": user, "profile": profile, "token": token })))
}

/// POST /api/auth/login - verify credentials, return user + token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let user = store::users::find_by_email(&state.pool, payload.email.trim())
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let matches = auth::verify_password(&payload.password_hash, &user.password_hash)
        .map_err(|e| ApiError::internal(format!("password verification failed: {}", e)))?;
    if !matches {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(&state, &user)?;

    Ok(Json(json!({ "user": user, "token": token })))
}

/// POST /api/auth/password-reset - acknowledgment stub; delivery is an
/// external collaborator. The response never reveals whether the account exists.
pub async fn password_reset(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PasswordResetRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut errors = FieldErrors::new();
    require_str(&mut errors, "email", &payload.email);
    if !payload.email.trim().is_empty() && !is_valid_email(payload.email.trim()) {
        errors.add("email", "not a valid email");
    }
    errors.into_result()?;

    if let Some(user) = store::users::find_by_email(&state.pool, payload.email.trim()).await? {
        tracing::info!(user_id = %user.id, "password reset requested");
    }

    Ok(Json(json!({
        "message": "If that account exists, password reset instructions have been issued"
    })))
}

fn issue_token(state: &AppState, user: &crate::models::User) -> Result<String, ApiError> {
    let claims = Claims::new(
        user.id,
        user.email.clone(),
        state.config.security.jwt_expiry_hours,
    );
    auth::generate_token(&claims, &state.config.security.jwt_secret)
        .map_err(|e| ApiError::internal(format!("token generation failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_all_fields() {
        let payload: RegisterRequest = serde_json::from_str("{}").unwrap();
        let err = payload.validate().unwrap_err();
        match err {
            ApiError::Validation {
                field_errors: Some(fields),
                ..
            } => {
                assert!(fields.contains_key("email"));
                assert!(fields.contains_key("password_hash"));
                assert!(fields.contains_key("name"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn register_rejects_malformed_email() {
        let payload: RegisterRequest = serde_json::from_str(
            r#"{"email": "not-an-email", "password_hash": "secret", "name": "A"}"#,
        )
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn register_accepts_minimal_valid_payload() {
        let payload: RegisterRequest =
            serde_json::from_str(r#"{"email": "a@x.com", "password_hash": "secret", "name": "A"}"#)
                .unwrap();
        assert!(payload.validate().is_ok());
    }
}
