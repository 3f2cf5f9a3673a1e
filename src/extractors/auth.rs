use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store;

/// Authenticated principal resolved from the `Authorization: Bearer <token>`
/// header. Add this as a handler parameter to require authentication.
///
/// The token subject is re-checked against the users table on every request,
/// so possession of a token for a deleted account is not enough.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl AuthUser {
    /// Returns `Ok(())` if the principal owns the target resource,
    /// `Err(Forbidden)` otherwise.
    pub fn require_owner(&self, owner_id: Uuid) -> Result<(), ApiError> {
        if self.id == owner_id {
            Ok(())
        } else {
            Err(ApiError::forbidden("You do not own this resource"))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let auth_header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| ApiError::credential_missing("Missing Authorization header"))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::credential_invalid("Invalid Authorization header format"))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                ApiError::credential_invalid("Authorization header must use Bearer token format")
            })?
            .trim();

        if token.is_empty() {
            return Err(ApiError::credential_missing("Empty bearer token"));
        }

        let claims = auth::verify_token(token, &state.config.security.jwt_secret)
            .map_err(|_| ApiError::credential_invalid("Token is invalid or expired"))?;

        let user = store::users::find_by_id(&state.pool, claims.sub)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::credential_invalid("Token subject no longer exists"))?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        })
    }
}
