//! CRUD operations over the content entities. Records are translated to and
//! from their row shapes here; nothing outside this module speaks SQL.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{
    encode_string_list, BlogPost, BlogPostRow, ContactSubmission, NewBlogPost,
    NewContactSubmission, NewProject, NewResume, NewTestimonial, NewUser, Project, ProjectRow,
    Resume, ResumeRow, Testimonial, TestimonialRow, UpdateBlogPost, UpdateProject, UpdateResume,
    UpdateTestimonial, User,
};

/// True when a write failed on a UNIQUE constraint (duplicate username/email).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed"))
}

const PROJECT_COLUMNS: &str = "id, title, description, long_description, category, tools, \
     image_url, case_study_url, demo_url, featured, challenge, solution, process, results, \
     created_at";

const BLOG_POST_COLUMNS: &str =
    "id, title, excerpt, content, category, image_url, read_time, published, created_at, \
     updated_at";

const TESTIMONIAL_COLUMNS: &str =
    "id, name, role, company, content, avatar_url, rating, featured";

const CONTACT_COLUMNS: &str =
    "id, first_name, last_name, email, company, project_type, message, created_at";

const RESUME_COLUMNS: &str =
    "id, filename, original_name, file_url, parsed_content, is_active, uploaded_at";

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, token_version, created_at, last_login_at";

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Projects
    // ========================================================================

    pub async fn create_project(&self, input: NewProject) -> Result<Project, sqlx::Error> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            long_description: input.long_description,
            category: input.category,
            tools: input.tools.unwrap_or_default(),
            image_url: input.image_url,
            case_study_url: input.case_study_url,
            demo_url: input.demo_url,
            featured: input.featured.unwrap_or(false),
            challenge: input.challenge,
            solution: input.solution,
            process: input.process,
            results: input.results,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO projects (id, title, description, long_description, category, tools, \
             image_url, case_study_url, demo_url, featured, challenge, solution, process, \
             results, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.long_description)
        .bind(&project.category)
        .bind(encode_string_list(&project.tools))
        .bind(&project.image_url)
        .bind(&project.case_study_url)
        .bind(&project.demo_url)
        .bind(project.featured as i64)
        .bind(&project.challenge)
        .bind(&project.solution)
        .bind(&project.process)
        .bind(&project.results)
        .bind(project.created_at)
        .execute(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn get_project_by_id(&self, id: &str) -> Result<Option<Project>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Project::from))
    }

    pub async fn get_all_projects(&self) -> Result<Vec<Project>, sqlx::Error> {
        self.get_projects_filtered(None, None).await
    }

    /// Newest first. `category` is an exact (case-insensitive) match,
    /// `featured` an exact flag match; `None` leaves a filter off.
    pub async fn get_projects_filtered(
        &self,
        category: Option<&str>,
        featured: Option<bool>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects \
             WHERE (?1 IS NULL OR lower(category) = lower(?1)) \
               AND (?2 IS NULL OR featured = ?2) \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(category)
        .bind(featured.map(i64::from))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    pub async fn update_project(
        &self,
        id: &str,
        update: UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let Some(existing) = self.get_project_by_id(id).await? else {
            return Ok(None);
        };

        let merged = Project {
            id: existing.id,
            title: update.title.unwrap_or(existing.title),
            description: update.description.unwrap_or(existing.description),
            long_description: update.long_description.or(existing.long_description),
            category: update.category.unwrap_or(existing.category),
            tools: update.tools.unwrap_or(existing.tools),
            image_url: update.image_url.or(existing.image_url),
            case_study_url: update.case_study_url.or(existing.case_study_url),
            demo_url: update.demo_url.or(existing.demo_url),
            featured: update.featured.unwrap_or(existing.featured),
            challenge: update.challenge.or(existing.challenge),
            solution: update.solution.or(existing.solution),
            process: update.process.or(existing.process),
            results: update.results.or(existing.results),
            created_at: existing.created_at,
        };

        sqlx::query(
            "UPDATE projects SET title = ?, description = ?, long_description = ?, \
             category = ?, tools = ?, image_url = ?, case_study_url = ?, demo_url = ?, \
             featured = ?, challenge = ?, solution = ?, process = ?, results = ? \
             WHERE id = ?",
        )
        .bind(&merged.title)
        .bind(&merged.description)
        .bind(&merged.long_description)
        .bind(&merged.category)
        .bind(encode_string_list(&merged.tools))
        .bind(&merged.image_url)
        .bind(&merged.case_study_url)
        .bind(&merged.demo_url)
        .bind(merged.featured as i64)
        .bind(&merged.challenge)
        .bind(&merged.solution)
        .bind(&merged.process)
        .bind(&merged.results)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(merged))
    }

    pub async fn delete_project(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Blog posts
    // ========================================================================

    pub async fn create_blog_post(&self, input: NewBlogPost) -> Result<BlogPost, sqlx::Error> {
        let now = Utc::now();
        let post = BlogPost {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            excerpt: input.excerpt,
            content: input.content,
            category: input.category,
            image_url: input.image_url,
            read_time: input.read_time,
            published: input.published.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO blog_posts (id, title, excerpt, content, category, image_url, \
             read_time, published, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.category)
        .bind(&post.image_url)
        .bind(&post.read_time)
        .bind(post.published as i64)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    pub async fn get_blog_post_by_id(&self, id: &str) -> Result<Option<BlogPost>, sqlx::Error> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {BLOG_POST_COLUMNS} FROM blog_posts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BlogPost::from))
    }

    pub async fn get_all_blog_posts(&self) -> Result<Vec<BlogPost>, sqlx::Error> {
        self.get_blog_posts_filtered(None, None).await
    }

    /// Newest first. `search` is a case-insensitive substring match over
    /// title, content, and excerpt; `category` an exact match.
    pub async fn get_blog_posts_filtered(
        &self,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<BlogPost>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {BLOG_POST_COLUMNS} FROM blog_posts \
             WHERE (?1 IS NULL \
                    OR instr(lower(title), lower(?1)) > 0 \
                    OR instr(lower(content), lower(?1)) > 0 \
                    OR instr(lower(excerpt), lower(?1)) > 0) \
               AND (?2 IS NULL OR lower(category) = lower(?2)) \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(search)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    pub async fn get_published_blog_posts(&self) -> Result<Vec<BlogPost>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {BLOG_POST_COLUMNS} FROM blog_posts WHERE published = 1 \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    /// Every successful mutation refreshes `updated_at`.
    pub async fn update_blog_post(
        &self,
        id: &str,
        update: UpdateBlogPost,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let Some(existing) = self.get_blog_post_by_id(id).await? else {
            return Ok(None);
        };

        let merged = BlogPost {
            id: existing.id,
            title: update.title.unwrap_or(existing.title),
            excerpt: update.excerpt.unwrap_or(existing.excerpt),
            content: update.content.unwrap_or(existing.content),
            category: update.category.unwrap_or(existing.category),
            image_url: update.image_url.or(existing.image_url),
            read_time: update.read_time.or(existing.read_time),
            published: update.published.unwrap_or(existing.published),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        sqlx::query(
            "UPDATE blog_posts SET title = ?, excerpt = ?, content = ?, category = ?, \
             image_url = ?, read_time = ?, published = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&merged.title)
        .bind(&merged.excerpt)
        .bind(&merged.content)
        .bind(&merged.category)
        .bind(&merged.image_url)
        .bind(&merged.read_time)
        .bind(merged.published as i64)
        .bind(merged.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(merged))
    }

    pub async fn delete_blog_post(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Testimonials
    // ========================================================================

    pub async fn create_testimonial(
        &self,
        input: NewTestimonial,
    ) -> Result<Testimonial, sqlx::Error> {
        let testimonial = Testimonial {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            role: input.role,
            company: input.company,
            content: input.content,
            avatar_url: input.avatar_url,
            rating: input.rating.unwrap_or_else(|| "5".to_string()),
            featured: input.featured.unwrap_or(false),
        };

        sqlx::query(
            "INSERT INTO testimonials (id, name, role, company, content, avatar_url, rating, \
             featured) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&testimonial.id)
        .bind(&testimonial.name)
        .bind(&testimonial.role)
        .bind(&testimonial.company)
        .bind(&testimonial.content)
        .bind(&testimonial.avatar_url)
        .bind(&testimonial.rating)
        .bind(testimonial.featured as i64)
        .execute(&self.pool)
        .await?;

        Ok(testimonial)
    }

    pub async fn get_testimonial_by_id(
        &self,
        id: &str,
    ) -> Result<Option<Testimonial>, sqlx::Error> {
        let row = sqlx::query_as::<_, TestimonialRow>(&format!(
            "SELECT {TESTIMONIAL_COLUMNS} FROM testimonials WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Testimonial::from))
    }

    /// Testimonials carry no timestamp; rowid order is insertion order.
    pub async fn get_all_testimonials(&self) -> Result<Vec<Testimonial>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TestimonialRow>(&format!(
            "SELECT {TESTIMONIAL_COLUMNS} FROM testimonials ORDER BY rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Testimonial::from).collect())
    }

    pub async fn update_testimonial(
        &self,
        id: &str,
        update: UpdateTestimonial,
    ) -> Result<Option<Testimonial>, sqlx::Error> {
        let Some(existing) = self.get_testimonial_by_id(id).await? else {
            return Ok(None);
        };

        let merged = Testimonial {
            id: existing.id,
            name: update.name.unwrap_or(existing.name),
            role: update.role.unwrap_or(existing.role),
            company: update.company.unwrap_or(existing.company),
            content: update.content.unwrap_or(existing.content),
            avatar_url: update.avatar_url.or(existing.avatar_url),
            rating: update.rating.unwrap_or(existing.rating),
            featured: update.featured.unwrap_or(existing.featured),
        };

        sqlx::query(
            "UPDATE testimonials SET name = ?, role = ?, company = ?, content = ?, \
             avatar_url = ?, rating = ?, featured = ? WHERE id = ?",
        )
        .bind(&merged.name)
        .bind(&merged.role)
        .bind(&merged.company)
        .bind(&merged.content)
        .bind(&merged.avatar_url)
        .bind(&merged.rating)
        .bind(merged.featured as i64)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(merged))
    }

    pub async fn delete_testimonial(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Contact submissions (create / read / delete only)
    // ========================================================================

    pub async fn create_contact_submission(
        &self,
        input: NewContactSubmission,
    ) -> Result<ContactSubmission, sqlx::Error> {
        let submission = ContactSubmission {
            id: Uuid::new_v4().to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            company: input.company,
            project_type: input.project_type,
            message: input.message,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO contact_submissions (id, first_name, last_name, email, company, \
             project_type, message, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&submission.id)
        .bind(&submission.first_name)
        .bind(&submission.last_name)
        .bind(&submission.email)
        .bind(&submission.company)
        .bind(&submission.project_type)
        .bind(&submission.message)
        .bind(submission.created_at)
        .execute(&self.pool)
        .await?;

        Ok(submission)
    }

    pub async fn get_contact_submission_by_id(
        &self,
        id: &str,
    ) -> Result<Option<ContactSubmission>, sqlx::Error> {
        sqlx::query_as::<_, ContactSubmission>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_submissions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_all_contact_submissions(
        &self,
    ) -> Result<Vec<ContactSubmission>, sqlx::Error> {
        sqlx::query_as::<_, ContactSubmission>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_submissions \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn delete_contact_submission(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Resumes
    // ========================================================================

    pub async fn create_resume(&self, input: NewResume) -> Result<Resume, sqlx::Error> {
        let resume = Resume {
            id: Uuid::new_v4().to_string(),
            filename: input.filename,
            original_name: input.original_name,
            file_url: input.file_url,
            parsed_content: input.parsed_content,
            is_active: input.is_active,
            uploaded_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO resumes (id, filename, original_name, file_url, parsed_content, \
             is_active, uploaded_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&resume.id)
        .bind(&resume.filename)
        .bind(&resume.original_name)
        .bind(&resume.file_url)
        .bind(&resume.parsed_content)
        .bind(resume.is_active as i64)
        .bind(resume.uploaded_at)
        .execute(&self.pool)
        .await?;

        Ok(resume)
    }

    pub async fn get_resume_by_id(&self, id: &str) -> Result<Option<Resume>, sqlx::Error> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Resume::from))
    }

    pub async fn get_all_resumes(&self) -> Result<Vec<Resume>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes ORDER BY uploaded_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Resume::from).collect())
    }

    pub async fn update_resume(
        &self,
        id: &str,
        update: UpdateResume,
    ) -> Result<Option<Resume>, sqlx::Error> {
        let Some(existing) = self.get_resume_by_id(id).await? else {
            return Ok(None);
        };

        let merged = Resume {
            id: existing.id,
            filename: update.filename.unwrap_or(existing.filename),
            original_name: update.original_name.unwrap_or(existing.original_name),
            file_url: update.file_url.unwrap_or(existing.file_url),
            parsed_content: update.parsed_content.or(existing.parsed_content),
            is_active: update.is_active.unwrap_or(existing.is_active),
            uploaded_at: existing.uploaded_at,
        };

        sqlx::query(
            "UPDATE resumes SET filename = ?, original_name = ?, file_url = ?, \
             parsed_content = ?, is_active = ? WHERE id = ?",
        )
        .bind(&merged.filename)
        .bind(&merged.original_name)
        .bind(&merged.file_url)
        .bind(&merged.parsed_content)
        .bind(merged.is_active as i64)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(merged))
    }

    pub async fn delete_resume(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Makes `id` the single active resume, atomically.
    ///
    /// The target is activated before the rest are cleared so that an
    /// unknown id rolls back without having touched any row; the invariant
    /// that at most one resume is active must hold at every commit point.
    pub async fn set_active_resume(&self, id: &str) -> Result<Option<Resume>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let activated = sqlx::query("UPDATE resumes SET is_active = 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if activated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("UPDATE resumes SET is_active = 0 WHERE id != ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_resume_by_id(id).await
    }

    pub async fn get_active_resume(&self) -> Result<Option<Resume>, sqlx::Error> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE is_active = 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Resume::from))
    }

    // ========================================================================
    // Users (no generic update/delete)
    // ========================================================================

    pub async fn create_user(&self, input: NewUser) -> Result<User, sqlx::Error> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: input.username,
            email: input.email,
            password_hash: input.password_hash,
            role: input.role,
            token_version: 0,
            created_at: Utc::now(),
            last_login_at: None,
        };

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role, token_version, \
             created_at, last_login_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.token_version)
        .bind(user.created_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower(?)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn update_user_last_login(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Invalidates every outstanding token for the user: tokens embed the
    /// version they were issued under, and the auth layer rejects stale ones.
    pub async fn bump_user_token_version(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET token_version = token_version + 1 WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use std::str::FromStr;
    use std::time::Duration;

    async fn test_store() -> Store {
        Store::new(test_pool().await)
    }

    fn sample_project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: "A case study".to_string(),
            category: "elearning".to_string(),
            ..Default::default()
        }
    }

    fn sample_post(title: &str, category: &str, content: &str) -> NewBlogPost {
        NewBlogPost {
            title: title.to_string(),
            excerpt: format!("{title} excerpt"),
            content: content.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    fn sample_resume(name: &str) -> NewResume {
        NewResume {
            filename: format!("{name}.pdf"),
            original_name: format!("{name} CV.pdf"),
            file_url: format!("/uploads/resumes/{name}.pdf"),
            parsed_content: None,
            is_active: false,
        }
    }

    #[tokio::test]
    async fn test_project_create_then_get_round_trips() {
        let store = test_store().await;

        let input = NewProject {
            tools: Some(vec!["Articulate".to_string(), "Figma".to_string()]),
            featured: Some(true),
            ..sample_project("Onboarding course")
        };
        let created = store.create_project(input).await.unwrap();

        assert!(!created.id.is_empty());
        assert!(created.featured);

        let fetched = store.get_project_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_project_defaults_applied_on_create() {
        let store = test_store().await;
        let created = store.create_project(sample_project("Bare")).await.unwrap();
        assert_eq!(created.tools, Vec::<String>::new());
        assert!(!created.featured);
    }

    #[tokio::test]
    async fn test_project_list_empty_then_newest_first() {
        let store = test_store().await;
        assert!(store.get_all_projects().await.unwrap().is_empty());

        store.create_project(sample_project("Project 1")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.create_project(sample_project("Project 2")).await.unwrap();

        let titles: Vec<String> = store
            .get_all_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Project 2", "Project 1"]);
    }

    #[tokio::test]
    async fn test_project_filters() {
        let store = test_store().await;
        store
            .create_project(NewProject {
                featured: Some(true),
                ..sample_project("Featured one")
            })
            .await
            .unwrap();
        store
            .create_project(NewProject {
                category: "branding".to_string(),
                ..sample_project("Other category")
            })
            .await
            .unwrap();

        let featured = store.get_projects_filtered(None, Some(true)).await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].title, "Featured one");

        // Category match is case-insensitive and exact
        let branding = store
            .get_projects_filtered(Some("BRANDING"), None)
            .await
            .unwrap();
        assert_eq!(branding.len(), 1);
        assert_eq!(branding[0].title, "Other category");

        let none = store
            .get_projects_filtered(Some("brand"), None)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_project_partial_update_touches_only_supplied_fields() {
        let store = test_store().await;
        let created = store
            .create_project(NewProject {
                tools: Some(vec!["Rise".to_string()]),
                ..sample_project("Before")
            })
            .await
            .unwrap();

        let updated = store
            .update_project(
                &created.id,
                UpdateProject {
                    title: Some("After".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "After");
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.tools, created.tools);
        assert_eq!(updated.featured, created.featured);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_project_reports_absent() {
        let store = test_store().await;
        let result = store
            .update_project("no-such-id", UpdateProject::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_project_observability() {
        let store = test_store().await;
        let created = store.create_project(sample_project("Doomed")).await.unwrap();

        assert!(store.delete_project(&created.id).await.unwrap());
        assert!(store.get_project_by_id(&created.id).await.unwrap().is_none());
        assert!(!store.delete_project(&created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_blog_post_update_refreshes_updated_at() {
        let store = test_store().await;
        let created = store
            .create_blog_post(sample_post("Post", "dev", "body"))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = store
            .update_blog_post(
                &created.id,
                UpdateBlogPost {
                    excerpt: Some("new excerpt".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, created.title);
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.excerpt, "new excerpt");
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_blog_post_search_and_category_filter() {
        let store = test_store().await;
        store
            .create_blog_post(sample_post("Scenario design", "elearning", "branching stories"))
            .await
            .unwrap();
        store
            .create_blog_post(sample_post("Rust on the backend", "dev", "axum and sqlx"))
            .await
            .unwrap();

        // Substring over title, case-insensitive
        let hits = store
            .get_blog_posts_filtered(Some("SCENARIO"), None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Scenario design");

        // Substring over content
        let hits = store
            .get_blog_posts_filtered(Some("sqlx"), None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Rust on the backend");

        // Category is exact, not substring
        let hits = store
            .get_blog_posts_filtered(None, Some("elearn"))
            .await
            .unwrap();
        assert!(hits.is_empty());

        let hits = store
            .get_blog_posts_filtered(None, Some("Elearning"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        // Search and category combine
        let hits = store
            .get_blog_posts_filtered(Some("stories"), Some("dev"))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_testimonial_rating_defaults_to_five() {
        let store = test_store().await;
        let created = store
            .create_testimonial(NewTestimonial {
                name: "Ada".to_string(),
                role: "CTO".to_string(),
                company: "Acme".to_string(),
                content: "Great work".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.rating, "5");
        assert!(!created.featured);

        let fetched = store
            .get_testimonial_by_id(&created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_contact_submission_lifecycle() {
        let store = test_store().await;
        let created = store
            .create_contact_submission(NewContactSubmission {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jane@example.com".to_string(),
                message: "Hello".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let all = store.get_all_contact_submissions().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], created);

        assert!(store.delete_contact_submission(&created.id).await.unwrap());
        assert!(store
            .get_contact_submission_by_id(&created.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_set_active_resume_keeps_exactly_one_active() {
        let store = test_store().await;
        let a = store.create_resume(sample_resume("a")).await.unwrap();
        let b = store.create_resume(sample_resume("b")).await.unwrap();
        let _c = store.create_resume(sample_resume("c")).await.unwrap();

        let activated = store.set_active_resume(&a.id).await.unwrap().unwrap();
        assert!(activated.is_active);

        let activated = store.set_active_resume(&b.id).await.unwrap().unwrap();
        assert!(activated.is_active);

        let all = store.get_all_resumes().await.unwrap();
        let active: Vec<_> = all.iter().filter(|r| r.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);
    }

    #[tokio::test]
    async fn test_set_active_resume_unknown_id_changes_nothing() {
        let store = test_store().await;
        let a = store.create_resume(sample_resume("a")).await.unwrap();
        store.set_active_resume(&a.id).await.unwrap();

        let missing = store.set_active_resume("no-such-id").await.unwrap();
        assert!(missing.is_none());

        let active = store.get_active_resume().await.unwrap().unwrap();
        assert_eq!(active.id, a.id);
    }

    #[tokio::test]
    async fn test_get_active_resume_none_when_nothing_active() {
        let store = test_store().await;
        store.create_resume(sample_resume("a")).await.unwrap();
        assert!(store.get_active_resume().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_active_resume_survives_concurrent_calls() {
        // File-backed pool so multiple connections contend for real.
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("race.db").display());
        let options = sqlx::sqlite::SqliteConnectOptions::from_str(&url)
            .unwrap()
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .unwrap();
        crate::db::run_migrations(&pool).await.unwrap();
        let store = Store::new(pool);

        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d"] {
            ids.push(store.create_resume(sample_resume(name)).await.unwrap().id);
        }

        let mut handles = Vec::new();
        for id in &ids {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store.set_active_resume(&id).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let active: Vec<_> = store
            .get_all_resumes()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.is_active)
            .collect();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_user_uniqueness_and_lookups() {
        let store = test_store().await;
        let user = store
            .create_user(NewUser {
                username: "kaz".to_string(),
                email: "kaz@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: "admin".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.token_version, 0);

        let duplicate = store
            .create_user(NewUser {
                username: "kaz".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: "user".to_string(),
            })
            .await;
        assert!(matches!(&duplicate, Err(e) if is_unique_violation(e)));

        let by_email = store
            .get_user_by_email("KAZ@EXAMPLE.COM")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        store.update_user_last_login(&user.id).await.unwrap();
        let reloaded = store.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert!(reloaded.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_bump_token_version() {
        let store = test_store().await;
        let user = store
            .create_user(NewUser {
                username: "v".to_string(),
                email: "v@example.com".to_string(),
                password_hash: String::new(),
                role: "admin".to_string(),
            })
            .await
            .unwrap();

        assert!(store.bump_user_token_version(&user.id).await.unwrap());
        let reloaded = store.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.token_version, 1);

        assert!(!store.bump_user_token_version("missing").await.unwrap());
    }
}
