use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Comment, VisitorMessage};
use crate::store::{is_foreign_key_violation, StoreError};

pub async fn list_for_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Comment>, StoreError> {
    let comments = sqlx::query_as::<_, Comment>(
        "SELECT * FROM comments WHERE project_id = $1 ORDER BY created_at DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(comments)
}

/// Visitor-writable by design: no ownership restriction applies.
pub async fn create(
    pool: &PgPool,
    project_id: Uuid,
    visitor_name: Option<String>,
    content: String,
) -> Result<Comment, StoreError> {
    let comment = sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (id, project_id, visitor_name, content, created_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(project_id)
    .bind(visitor_name)
    .bind(content)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            StoreError::NotFound("Project")
        } else {
            e.into()
        }
    })?;
    Ok(comment)
}

pub async fn create_visitor_message(
    pool: &PgPool,
    user_id: Uuid,
    visitor_email: Option<String>,
    message: String,
) -> Result<VisitorMessage, StoreError> {
    let visitor_message = sqlx::query_as::<_, VisitorMessage>(
        "INSERT INTO visitor_messages (id, user_id, visitor_email, message, sent_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(visitor_email)
    .bind(message)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            StoreError::NotFound("User")
        } else {
            e.into()
        }
    })?;
    Ok(visitor_message)
}
