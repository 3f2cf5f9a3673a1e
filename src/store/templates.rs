use sqlx::PgPool;

use crate::models::Template;
use crate::store::StoreError;

/// Immutable catalog of layout templates selectable in settings.
pub async fn list(pool: &PgPool) -> Result<Vec<Template>, StoreError> {
    let templates = sqlx::query_as::<_, Template>("SELECT * FROM templates ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(templates)
}
