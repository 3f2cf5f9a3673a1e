use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ColorScheme, Profile, Settings, SocialLinks, User};
use crate::store::{is_unique_violation, BindValue, StoreError, UpdateBuilder};

/// Profile columns that may be rewritten by a partial update.
/// Outer None = leave untouched, inner None = write null.
#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub profile_picture: Option<Option<String>>,
    pub cover_photo: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub contact_email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub social_links: Option<SocialLinks>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.profile_picture.is_none()
            && self.cover_photo.is_none()
            && self.bio.is_none()
            && self.contact_email.is_none()
            && self.phone.is_none()
            && self.social_links.is_none()
    }
}

#[derive(Debug, Default)]
pub struct SettingsPatch {
    pub color_scheme: Option<ColorScheme>,
    pub template_id: Option<Option<Uuid>>,
    pub font: Option<Option<String>>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.color_scheme.is_none() && self.template_id.is_none() && self.font.is_none()
    }
}

/// Create the user and its empty profile as a single unit.
pub async fn create_with_profile(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    name: &str,
) -> Result<(User, Profile), StoreError> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password_hash, name, created_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            StoreError::Conflict("Email")
        } else {
            e.into()
        }
    })?;

    let profile = sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (user_id, social_links) VALUES ($1, $2) RETURNING *",
    )
    .bind(user.id)
    .bind(serde_json::json!({}))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((user, profile))
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Email lookup is case-insensitive, matching the uniqueness rule.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    patch: ProfilePatch,
) -> Result<Profile, StoreError> {
    let mut builder = UpdateBuilder::<Profile>::new("profiles").key("user_id");
    if let Some(v) = patch.profile_picture {
        builder = builder.set("profile_picture", BindValue::Text(v));
    }
    if let Some(v) = patch.cover_photo {
        builder = builder.set("cover_photo", BindValue::Text(v));
    }
    if let Some(v) = patch.bio {
        builder = builder.set("bio", BindValue::Text(v));
    }
    if let Some(v) = patch.contact_email {
        builder = builder.set("contact_email", BindValue::Text(v));
    }
    if let Some(v) = patch.phone {
        builder = builder.set("phone", BindValue::Text(v));
    }
    if let Some(v) = patch.social_links {
        builder = builder.set("social_links", BindValue::json(&v));
    }

    builder
        .fetch_optional(pool, user_id)
        .await?
        .ok_or(StoreError::NotFound("Profile"))
}

pub async fn get_settings(pool: &PgPool, user_id: Uuid) -> Result<Option<Settings>, StoreError> {
    let settings = sqlx::query_as::<_, Settings>("SELECT * FROM settings WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(settings)
}

/// First write creates the row, later writes patch only the supplied fields.
pub async fn upsert_settings(
    pool: &PgPool,
    user_id: Uuid,
    patch: SettingsPatch,
) -> Result<Settings, StoreError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO settings (user_id, color_scheme) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(serde_json::json!({}))
    .execute(&mut *tx)
    .await?;

    let mut builder = UpdateBuilder::<Settings>::new("settings").key("user_id");
    if let Some(v) = patch.color_scheme {
        builder = builder.set("color_scheme", BindValue::json(&v));
    }
    if let Some(v) = patch.template_id {
        builder = builder.set("template_id", BindValue::Uuid(v));
    }
    if let Some(v) = patch.font {
        builder = builder.set("font", BindValue::Text(v));
    }

    let settings = builder
        .fetch_optional(&mut *tx, user_id)
        .await?
        .ok_or(StoreError::NotFound("Settings"))?;

    tx.commit().await?;
    Ok(settings)
}
