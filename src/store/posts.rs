use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::BlogPost;
use crate::store::{BindValue, StoreError, UpdateBuilder};

#[derive(Debug, Default)]
pub struct BlogPostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl BlogPostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

pub async fn list_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<BlogPost>, StoreError> {
    let posts = sqlx::query_as::<_, BlogPost>(
        "SELECT * FROM blog_posts WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(posts)
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    title: String,
    content: String,
) -> Result<BlogPost, StoreError> {
    let post = sqlx::query_as::<_, BlogPost>(
        "INSERT INTO blog_posts (id, user_id, title, content, created_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(title)
    .bind(content)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;
    Ok(post)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<BlogPost>, StoreError> {
    let post = sqlx::query_as::<_, BlogPost>("SELECT * FROM blog_posts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

pub async fn update(pool: &PgPool, id: Uuid, patch: BlogPostPatch) -> Result<BlogPost, StoreError> {
    let mut builder = UpdateBuilder::<BlogPost>::new("blog_posts");
    if let Some(v) = patch.title {
        builder = builder.set("title", BindValue::text(v));
    }
    if let Some(v) = patch.content {
        builder = builder.set("content", BindValue::text(v));
    }

    builder
        .fetch_optional(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Blog post"))
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("Blog post"));
    }
    Ok(())
}
