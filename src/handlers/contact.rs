use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::models::VisitorMessage;
use crate::state::AppState;
use crate::store;
use crate::validation::{is_valid_email, require_str, FieldErrors};

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub visitor_email: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl ContactRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "message", &self.message);
        if let Some(email) = &self.visitor_email {
            if !email.trim().is_empty() && !is_valid_email(email.trim()) {
                errors.add("visitor_email", "not a valid email");
            }
        }
        errors.into_result()
    }
}

/// POST /api/contact/:id - public visitor message to a portfolio owner.
/// Also bumps the owner's `contact` interaction counter, best-effort.
pub async fn send_message(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<ContactRequest>,
) -> Result<(StatusCode, Json<VisitorMessage>), ApiError> {
    payload.validate()?;

    let message = store::comments::create_visitor_message(
        &state.pool,
        user_id,
        payload.visitor_email,
        payload.message,
    )
    .await?;

    if let Err(e) = store::analytics::record_interaction(&state.pool, user_id, "contact").await {
        tracing::warn!(user_id = %user_id, "contact counter update failed: {}", e);
    }

    Ok((StatusCode::CREATED, Json(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_required() {
        let payload: ContactRequest = serde_json::from_str("{}").unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn visitor_email_is_optional_but_checked() {
        let anonymous: ContactRequest =
            serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(anonymous.validate().is_ok());

        let bad: ContactRequest =
            serde_json::from_str(r#"{"visitor_email": "nope", "message": "hi"}"#).unwrap();
        assert!(bad.validate().is_err());
    }
}
