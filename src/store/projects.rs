use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Project;
use crate::store::{BindValue, StoreError, UpdateBuilder};

#[derive(Debug)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub project_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub project_url: Option<Option<String>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.images.is_none()
            && self.project_url.is_none()
    }
}

pub async fn list_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<Project>, StoreError> {
    let projects =
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE user_id = $1 ORDER BY title")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(projects)
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    new: NewProject,
) -> Result<Project, StoreError> {
    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (id, user_id, title, description, images, project_url) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(new.title)
    .bind(new.description)
    .bind(serde_json::json!(new.images))
    .bind(new.project_url)
    .fetch_one(pool)
    .await?;
    Ok(project)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Project>, StoreError> {
    let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(project)
}

pub async fn update(pool: &PgPool, id: Uuid, patch: ProjectPatch) -> Result<Project, StoreError> {
    let mut builder = UpdateBuilder::<Project>::new("projects");
    if let Some(v) = patch.title {
        builder = builder.set("title", BindValue::text(v));
    }
    if let Some(v) = patch.description {
        builder = builder.set("description", BindValue::Text(v));
    }
    if let Some(v) = patch.images {
        builder = builder.set("images", BindValue::json(&v));
    }
    if let Some(v) = patch.project_url {
        builder = builder.set("project_url", BindValue::Text(v));
    }

    builder
        .fetch_optional(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Project"))
}

/// Delete a project and its dependent comments as one unit. The comment
/// cascade is enforced here rather than assumed from the schema.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM comments WHERE project_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("Project"));
    }

    tx.commit().await?;
    Ok(())
}
