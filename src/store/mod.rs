use chrono::NaiveDate;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::DatabaseConfig;

pub mod analytics;
pub mod comments;
pub mod posts;
pub mod projects;
pub mod skills;
pub mod templates;
pub mod testimonials;
pub mod timeline;
pub mod users;

/// Errors from the persistence gateway
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the process-wide connection pool. Lazy: the process can start
/// before the store is reachable, and requests surface connect errors.
pub fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_lazy(&config.url)
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23503")
        .unwrap_or(false)
}

/// A typed value bound into a dynamically built statement.
#[derive(Debug, Clone)]
pub enum BindValue {
    Text(Option<String>),
    Int(Option<i32>),
    Date(Option<NaiveDate>),
    Uuid(Option<Uuid>),
    Json(Value),
}

impl BindValue {
    pub fn text(value: impl Into<String>) -> Self {
        BindValue::Text(Some(value.into()))
    }

    pub fn int(value: i32) -> Self {
        BindValue::Int(Some(value))
    }

    pub fn date(value: NaiveDate) -> Self {
        BindValue::Date(Some(value))
    }

    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        BindValue::Json(serde_json::to_value(value).unwrap_or(Value::Null))
    }

    fn bind_to<'q, O>(
        self,
        q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    ) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        match self {
            BindValue::Text(v) => q.bind(v),
            BindValue::Int(v) => q.bind(v),
            BindValue::Date(v) => q.bind(v),
            BindValue::Uuid(v) => q.bind(v),
            BindValue::Json(v) => q.bind(v),
        }
    }
}

/// Dynamic partial-update builder. The assignment list is built from exactly
/// the fields the caller sets; column names come from the per-entity
/// allow-lists in the store modules, never from request keys.
pub struct UpdateBuilder<T> {
    table: &'static str,
    key_column: &'static str,
    assignments: Vec<(&'static str, BindValue)>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> UpdateBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            key_column: "id",
            assignments: Vec::new(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Override the identifying column (e.g. `user_id` for one-per-user rows).
    pub fn key(mut self, column: &'static str) -> Self {
        self.key_column = column;
        self
    }

    pub fn set(mut self, column: &'static str, value: BindValue) -> Self {
        self.assignments.push((column, value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    fn sql(&self) -> String {
        if self.assignments.is_empty() {
            return format!(
                "SELECT * FROM {} WHERE {} = $1",
                self.table, self.key_column
            );
        }

        let assigns: Vec<String> = self
            .assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ${}", column, i + 1))
            .collect();

        format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
            self.table,
            assigns.join(", "),
            self.key_column,
            self.assignments.len() + 1
        )
    }

    /// Apply the update, returning the row when the key matched.
    pub async fn fetch_optional<'e, E>(self, executor: E, key: Uuid) -> Result<Option<T>, StoreError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let sql = self.sql();
        let mut q = sqlx::query_as::<_, T>(&sql);
        for (_, value) in self.assignments {
            q = value.bind_to(q);
        }
        q = q.bind(key);

        Ok(q.fetch_optional(executor).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Project;

    #[test]
    fn builds_assignments_from_exactly_the_set_fields() {
        let builder = UpdateBuilder::<Project>::new("projects")
            .set("title", BindValue::text("X"))
            .set("description", BindValue::Text(None));

        assert_eq!(
            builder.sql(),
            "UPDATE projects SET title = $1, description = $2 WHERE id = $3 RETURNING *"
        );
    }

    #[test]
    fn empty_update_degrades_to_a_read() {
        let builder = UpdateBuilder::<Project>::new("projects");
        assert!(builder.is_empty());
        assert_eq!(builder.sql(), "SELECT * FROM projects WHERE id = $1");
    }

    #[test]
    fn key_column_is_overridable() {
        let builder = UpdateBuilder::<crate::models::Profile>::new("profiles")
            .key("user_id")
            .set("bio", BindValue::text("hello"));

        assert_eq!(
            builder.sql(),
            "UPDATE profiles SET bio = $1 WHERE user_id = $2 RETURNING *"
        );
    }
}
