use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::models::Analytics;
use crate::state::AppState;
use crate::store;

/// GET /api/analytics/:id - the owner's analytics snapshot. The row is
/// created with zeroed counters on first read.
pub async fn get(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Analytics>, ApiError> {
    auth_user.require_owner(user_id)?;

    let analytics = store::analytics::snapshot(&state.pool, user_id).await?;
    Ok(Json(analytics))
}
