use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::types::Json;
use std::collections::HashMap;
use uuid::Uuid;

/// Map of social network name to link, stored as JSONB.
pub type SocialLinks = HashMap<String, String>;

/// Map of palette slot to color value, stored as JSONB.
pub type ColorScheme = HashMap<String, String>;

/// Map of project id to the list of recorded view timestamps (epoch seconds).
pub type ProjectViews = HashMap<String, Vec<i64>>;

/// Freeform interaction counters and markers.
pub type Interactions = HashMap<String, Value>;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub profile_picture: Option<String>,
    pub cover_photo: Option<String>,
    pub bio: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub social_links: Json<SocialLinks>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Settings {
    pub user_id: Uuid,
    pub color_scheme: Json<ColorScheme>,
    pub template_id: Option<Uuid>,
    pub font: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub layout: Json<Value>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub images: Json<Vec<String>>,
    pub project_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub proficiency: i32,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TimelineEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    /// None means the entry is ongoing.
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Testimonial {
    pub id: Uuid,
    pub user_id: Uuid,
    pub client_name: String,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BlogPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub project_id: Uuid,
    pub visitor_name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VisitorMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub visitor_email: Option<String>,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Analytics {
    pub id: Uuid,
    pub user_id: Uuid,
    pub visit_count: i64,
    pub popular_projects: Json<ProjectViews>,
    pub interactions: Json<Interactions>,
}

/// Aggregate returned by the public portfolio read.
#[derive(Debug, Serialize)]
pub struct Portfolio {
    pub user: User,
    pub profile: Option<Profile>,
    pub settings: Option<Settings>,
    pub projects: Vec<Project>,
    pub skills: Vec<Skill>,
    pub timeline: Vec<TimelineEntry>,
    pub testimonials: Vec<Testimonial>,
    pub blog_posts: Vec<BlogPost>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serialization_hides_credential() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            name: "A".to_string(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["email"], "a@x.com");
        assert!(value.get("password_hash").is_none());
    }
}
