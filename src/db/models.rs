//! Entity records exposed by the store, plus the raw row shapes they are
//! persisted as. Rows keep storage primitives (0/1 integers for flags, JSON
//! text for string lists); the `From<Row>` impls perform the coercion back
//! to typed records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Parse a JSON-text list column. Null or unparsable content collapses to an
/// empty list rather than an error.
pub(crate) fn parse_string_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

pub(crate) fn encode_string_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

// ============================================================================
// Project
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub category: String,
    pub tools: Vec<String>,
    pub image_url: Option<String>,
    pub case_study_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured: bool,
    pub challenge: Option<String>,
    pub solution: Option<String>,
    pub process: Option<String>,
    pub results: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated creation input. Defaults for `tools` and `featured` are applied
/// by the store when the fields are absent.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub category: String,
    pub tools: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub case_study_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured: Option<bool>,
    pub challenge: Option<String>,
    pub solution: Option<String>,
    pub process: Option<String>,
    pub results: Option<String>,
}

/// Partial update: absent fields leave the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub category: Option<String>,
    pub tools: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub case_study_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured: Option<bool>,
    pub challenge: Option<String>,
    pub solution: Option<String>,
    pub process: Option<String>,
    pub results: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub category: String,
    pub tools: Option<String>,
    pub image_url: Option<String>,
    pub case_study_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured: i64,
    pub challenge: Option<String>,
    pub solution: Option<String>,
    pub process: Option<String>,
    pub results: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            long_description: row.long_description,
            category: row.category,
            tools: parse_string_list(row.tools.as_deref()),
            image_url: row.image_url,
            case_study_url: row.case_study_url,
            demo_url: row.demo_url,
            featured: row.featured != 0,
            challenge: row.challenge,
            solution: row.solution,
            process: row.process,
            results: row.results,
            created_at: row.created_at,
        }
    }
}

// ============================================================================
// Blog post
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
    pub read_time: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewBlogPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
    pub read_time: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogPost {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub read_time: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, FromRow)]
pub struct BlogPostRow {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
    pub read_time: Option<String>,
    pub published: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BlogPostRow> for BlogPost {
    fn from(row: BlogPostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            excerpt: row.excerpt,
            content: row.content,
            category: row.category,
            image_url: row.image_url,
            read_time: row.read_time,
            published: row.published != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ============================================================================
// Testimonial
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub role: String,
    pub company: String,
    pub content: String,
    pub avatar_url: Option<String>,
    pub rating: String,
    pub featured: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewTestimonial {
    pub name: String,
    pub role: String,
    pub company: String,
    pub content: String,
    pub avatar_url: Option<String>,
    pub rating: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestimonial {
    pub name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub content: Option<String>,
    pub avatar_url: Option<String>,
    pub rating: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, FromRow)]
pub struct TestimonialRow {
    pub id: String,
    pub name: String,
    pub role: String,
    pub company: String,
    pub content: String,
    pub avatar_url: Option<String>,
    pub rating: String,
    pub featured: i64,
}

impl From<TestimonialRow> for Testimonial {
    fn from(row: TestimonialRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            role: row.role,
            company: row.company,
            content: row.content,
            avatar_url: row.avatar_url,
            rating: row.rating,
            featured: row.featured != 0,
        }
    }
}

// ============================================================================
// Contact submission
// ============================================================================

/// Immutable after creation; there is no update payload for this entity.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub message: String,
}

// ============================================================================
// Resume
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub file_url: String,
    pub parsed_content: Option<String>,
    pub is_active: bool,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewResume {
    pub filename: String,
    pub original_name: String,
    pub file_url: String,
    pub parsed_content: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResume {
    pub filename: Option<String>,
    pub original_name: Option<String>,
    pub file_url: Option<String>,
    pub parsed_content: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, FromRow)]
pub struct ResumeRow {
    pub id: String,
    pub filename: String,
    pub original_name: String,
    pub file_url: String,
    pub parsed_content: Option<String>,
    pub is_active: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ResumeRow> for Resume {
    fn from(row: ResumeRow) -> Self {
        Self {
            id: row.id,
            filename: row.filename,
            original_name: row.original_name,
            file_url: row.file_url,
            parsed_content: row.parsed_content,
            is_active: row.is_active != 0,
            uploaded_at: row.uploaded_at,
        }
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub token_version: i64,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Empty `password_hash` is reserved for federated accounts, which have no
/// local password login path.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// The subset of a user that is safe to return to clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}
