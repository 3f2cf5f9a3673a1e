use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Testimonial;
use crate::store::{BindValue, StoreError, UpdateBuilder};

#[derive(Debug, Default)]
pub struct TestimonialPatch {
    pub client_name: Option<String>,
    pub feedback: Option<String>,
}

impl TestimonialPatch {
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none() && self.feedback.is_none()
    }
}

pub async fn list_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<Testimonial>, StoreError> {
    let testimonials = sqlx::query_as::<_, Testimonial>(
        "SELECT * FROM testimonials WHERE user_id = $1 ORDER BY client_name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(testimonials)
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    client_name: String,
    feedback: String,
) -> Result<Testimonial, StoreError> {
    let testimonial = sqlx::query_as::<_, Testimonial>(
        "INSERT INTO testimonials (id, user_id, client_name, feedback) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(client_name)
    .bind(feedback)
    .fetch_one(pool)
    .await?;
    Ok(testimonial)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Testimonial>, StoreError> {
    let testimonial = sqlx::query_as::<_, Testimonial>("SELECT * FROM testimonials WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(testimonial)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: TestimonialPatch,
) -> Result<Testimonial, StoreError> {
    let mut builder = UpdateBuilder::<Testimonial>::new("testimonials");
    if let Some(v) = patch.client_name {
        builder = builder.set("client_name", BindValue::text(v));
    }
    if let Some(v) = patch.feedback {
        builder = builder.set("feedback", BindValue::text(v));
    }

    builder
        .fetch_optional(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Testimonial"))
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("Testimonial"));
    }
    Ok(())
}
