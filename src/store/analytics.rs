use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Analytics;
use crate::store::StoreError;

/// Insert the zeroed row if absent. The unique constraint on user_id makes
/// this exactly-once under concurrent first reads; the loser of the race
/// falls through to the read.
async fn ensure_row(pool: &PgPool, user_id: Uuid) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO analytics (id, user_id, visit_count, popular_projects, interactions) \
         VALUES ($1, $2, 0, '{}'::jsonb, '{}'::jsonb) \
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Lazily-created snapshot: creates the zeroed row on first read.
pub async fn snapshot(pool: &PgPool, user_id: Uuid) -> Result<Analytics, StoreError> {
    ensure_row(pool, user_id).await?;

    let analytics = sqlx::query_as::<_, Analytics>("SELECT * FROM analytics WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("Analytics"))?;
    Ok(analytics)
}

/// Count one portfolio visit. Single statement: the increment and the lazy
/// creation cannot interleave with a concurrent visit.
pub async fn record_visit(pool: &PgPool, user_id: Uuid) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO analytics (id, user_id, visit_count, popular_projects, interactions) \
         VALUES ($1, $2, 1, '{}'::jsonb, '{}'::jsonb) \
         ON CONFLICT (user_id) DO UPDATE SET visit_count = analytics.visit_count + 1",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Append a view timestamp to the project's entry in popular_projects.
/// The read-modify-write happens inside one UPDATE expression.
pub async fn record_project_view(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Uuid,
    seen_at: i64,
) -> Result<(), StoreError> {
    ensure_row(pool, user_id).await?;

    sqlx::query(
        "UPDATE analytics SET popular_projects = jsonb_set(popular_projects, ARRAY[$1], \
         COALESCE(popular_projects -> $1, '[]'::jsonb) || to_jsonb($2::bigint)) \
         WHERE user_id = $3",
    )
    .bind(project_id.to_string())
    .bind(seen_at)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Increment a named interaction counter atomically.
pub async fn record_interaction(
    pool: &PgPool,
    user_id: Uuid,
    key: &str,
) -> Result<(), StoreError> {
    ensure_row(pool, user_id).await?;

    sqlx::query(
        "UPDATE analytics SET interactions = jsonb_set(interactions, ARRAY[$1], \
         to_jsonb(COALESCE((interactions ->> $1)::bigint, 0) + 1)) \
         WHERE user_id = $2",
    )
    .bind(key)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}
