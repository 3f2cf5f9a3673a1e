use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::models::Template;
use crate::state::AppState;
use crate::store;

/// GET /api/templates - public catalog of layout templates
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Template>>, ApiError> {
    let templates = store::templates::list(&state.pool).await?;
    Ok(Json(templates))
}
