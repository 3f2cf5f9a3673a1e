use std::path::PathBuf;
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;

/// Shared per-process dependencies, injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub upload_root: PathBuf,
}
