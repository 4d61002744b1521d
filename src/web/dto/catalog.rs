use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{CourseWithModuleCountRow, SubjectWithCourseCountRow};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubjectSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub total_courses: i64,
}

impl From<SubjectWithCourseCountRow> for SubjectSummary {
    fn from(row: SubjectWithCourseCountRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            total_courses: row.total_courses,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseSummary {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub slug: String,
    pub overview: String,
    pub created_at: DateTime<Utc>,
    pub total_modules: i64,
}

impl From<CourseWithModuleCountRow> for CourseSummary {
    fn from(row: CourseWithModuleCountRow) -> Self {
        Self {
            id: row.id,
            subject_id: row.subject_id,
            title: row.title,
            slug: row.slug,
            overview: row.overview,
            created_at: row.created_at,
            total_modules: row.total_modules,
        }
    }
}

/// Body of `GET /api/v1/courses/`: every subject with its course count,
/// the optional slug-selected subject, and the (possibly filtered) courses
/// with their module counts.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CatalogResponse {
    pub subjects: Vec<SubjectSummary>,
    pub subject: Option<SubjectSummary>,
    pub courses: Vec<CourseSummary>,
}
