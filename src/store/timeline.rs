use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::TimelineEntry;
use crate::store::{BindValue, StoreError, UpdateBuilder};

#[derive(Debug)]
pub struct NewTimelineEntry {
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct TimelineEntryPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
}

impl TimelineEntryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

pub async fn list_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<TimelineEntry>, StoreError> {
    let entries = sqlx::query_as::<_, TimelineEntry>(
        "SELECT * FROM timeline_entries WHERE user_id = $1 ORDER BY start_date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    new: NewTimelineEntry,
) -> Result<TimelineEntry, StoreError> {
    let entry = sqlx::query_as::<_, TimelineEntry>(
        "INSERT INTO timeline_entries (id, user_id, title, description, start_date, end_date) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(new.title)
    .bind(new.description)
    .bind(new.start_date)
    .bind(new.end_date)
    .fetch_one(pool)
    .await?;
    Ok(entry)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<TimelineEntry>, StoreError> {
    let entry = sqlx::query_as::<_, TimelineEntry>("SELECT * FROM timeline_entries WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(entry)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: TimelineEntryPatch,
) -> Result<TimelineEntry, StoreError> {
    let mut builder = UpdateBuilder::<TimelineEntry>::new("timeline_entries");
    if let Some(v) = patch.title {
        builder = builder.set("title", BindValue::text(v));
    }
    if let Some(v) = patch.description {
        builder = builder.set("description", BindValue::Text(v));
    }
    if let Some(v) = patch.start_date {
        builder = builder.set("start_date", BindValue::date(v));
    }
    if let Some(v) = patch.end_date {
        builder = builder.set("end_date", BindValue::Date(v));
    }

    builder
        .fetch_optional(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Timeline entry"))
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM timeline_entries WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("Timeline entry"));
    }
    Ok(())
}
