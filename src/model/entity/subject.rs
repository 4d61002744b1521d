use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Subject {
    id: Uuid,
    title: String,
    slug: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubjectCreate {
    pub title: String,
    pub slug: String,
}

impl ResourceTyped for Subject {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Subject
    }
}

impl Subject {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub async fn create(mm: &ModelManager, data: SubjectCreate) -> DatabaseResult<Self> {
        let result = sqlx::query("INSERT INTO subjects (id, title, slug) VALUES ($1,$2,$3) RETURNING id")
            .bind(Uuid::new_v4())
            .bind(&data.title)
            .bind(&data.slug)
            .fetch_one(mm.executor())
            .await?;

        let id = result.try_get("id")?;
        Ok(Subject {
            id,
            title: data.title,
            slug: data.slug,
        })
    }

    pub async fn find_by_slug(mm: &ModelManager, slug: &str) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM subjects WHERE slug = $1")
            .bind(slug)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }
}

// Utils

/// Catalog row: one subject plus how many courses it groups.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubjectWithCourseCountRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub total_courses: i64,
}

impl SubjectWithCourseCountRow {
    pub async fn fetch_all(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<SubjectWithCourseCountRow> = sqlx::query_as(
            r#"
            SELECT
                s.id,
                s.title,
                s.slug,
                COUNT(c.id) AS total_courses
            FROM subjects s
            LEFT JOIN courses c ON c.subject_id = s.id
            GROUP BY s.id
            ORDER BY s.title;
            "#,
        )
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
