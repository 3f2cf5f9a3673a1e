use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Skill;
use crate::store::{BindValue, StoreError, UpdateBuilder};

#[derive(Debug, Default)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub proficiency: Option<i32>,
}

impl SkillPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.proficiency.is_none()
    }
}

pub async fn list_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<Skill>, StoreError> {
    let skills =
        sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE user_id = $1 ORDER BY name")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(skills)
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    name: String,
    proficiency: i32,
) -> Result<Skill, StoreError> {
    let skill = sqlx::query_as::<_, Skill>(
        "INSERT INTO skills (id, user_id, name, proficiency) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(name)
    .bind(proficiency)
    .fetch_one(pool)
    .await?;
    Ok(skill)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Skill>, StoreError> {
    let skill = sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(skill)
}

pub async fn update(pool: &PgPool, id: Uuid, patch: SkillPatch) -> Result<Skill, StoreError> {
    let mut builder = UpdateBuilder::<Skill>::new("skills");
    if let Some(v) = patch.name {
        builder = builder.set("name", BindValue::text(v));
    }
    if let Some(v) = patch.proficiency {
        builder = builder.set("proficiency", BindValue::int(v));
    }

    builder
        .fetch_optional(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Skill"))
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM skills WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("Skill"));
    }
    Ok(())
}
