use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Course {
    id: Uuid,
    owner_id: Uuid,
    subject_id: Uuid,
    title: String,
    slug: String,
    overview: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CourseCreate {
    pub subject_id: Uuid,
    pub title: String,
    pub slug: String,
    pub overview: String,
}

impl ResourceTyped for Course {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Course
    }
}

impl Course {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn overview(&self) -> &str {
        &self.overview
    }

    /// Owner is stamped from the actor, never taken from the payload.
    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO courses (id, owner_id, subject_id, title, slug, overview, created_at) \
             VALUES ($1,$2,$3,$4,$5,$6,$7) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(data.subject_id)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.overview)
        .bind(created_at)
        .fetch_one(mm.executor())
        .await?;

        let id = result.try_get("id")?;
        Ok(Course {
            id,
            owner_id: actor.user_id(),
            subject_id: data.subject_id,
            title: data.title,
            slug: data.slug,
            overview: data.overview,
            created_at,
        })
    }

    pub async fn update(
        mut self,
        mm: &ModelManager,
        data: CourseCreate,
    ) -> DatabaseResult<Self> {
        sqlx::query(
            "UPDATE courses SET subject_id = $1, title = $2, slug = $3, overview = $4 WHERE id = $5",
        )
        .bind(data.subject_id)
        .bind(&data.title)
        .bind(&data.slug)
        .bind(&data.overview)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.subject_id = data.subject_id;
        self.title = data.title;
        self.slug = data.slug;
        self.overview = data.overview;
        Ok(self)
    }

    pub async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }

    /// Ownership filter: a course owned by somebody else is indistinguishable
    /// from a missing one.
    pub async fn find_owned(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM courses WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(actor.user_id())
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }

    pub async fn all_owned(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM courses WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Idempotent: enrolling twice leaves exactly one membership row.
    pub async fn enroll(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<()> {
        sqlx::query(
            "INSERT INTO enrollments (student_id, course_id) VALUES ($1,$2) ON CONFLICT DO NOTHING",
        )
        .bind(actor.user_id())
        .bind(course_id)
        .execute(mm.executor())
        .await?;
        Ok(())
    }
}

// Utils

/// Catalog row: one course plus how many modules it contains.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseWithModuleCountRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub slug: String,
    pub overview: String,
    pub created_at: DateTime<Utc>,
    pub total_modules: i64,
}

impl CourseWithModuleCountRow {
    /// Whole catalog, or one subject's slice of it.
    pub async fn fetch_all(
        mm: &ModelManager,
        subject_id: Option<Uuid>,
    ) -> DatabaseResult<Vec<Self>> {
        let sql = r#"
            SELECT
                c.id,
                c.owner_id,
                c.subject_id,
                c.title,
                c.slug,
                c.overview,
                c.created_at,
                COUNT(m.id) AS total_modules
            FROM courses c
            LEFT JOIN modules m ON m.course_id = c.id
            WHERE ($1::uuid IS NULL OR c.subject_id = $1)
            GROUP BY c.id
            ORDER BY c.created_at DESC;
        "#;

        let rows: Vec<CourseWithModuleCountRow> = sqlx::query_as(sql)
            .bind(subject_id)
            .fetch_all(mm.executor())
            .await?;

        Ok(rows)
    }
}
