use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

use crate::model::ordering::{Ordered, next_position};
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Module {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    position: i32,
}

/// One row of the module set editor: update an existing module, create a
/// new one (no id), or drop one flagged for deletion.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModuleUpsert {
    pub id: Option<Uuid>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub delete: bool,
}

impl Ordered for Module {
    const TABLE: &'static str = "modules";
    const SCOPE_COLUMN: &'static str = "course_id";
}

impl ResourceTyped for Module {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Module
    }
}

impl Module {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub async fn create(
        mm: &ModelManager,
        course_id: Uuid,
        title: String,
        description: String,
    ) -> DatabaseResult<Self> {
        let position = next_position::<Module, _>(mm.executor(), course_id).await?;
        let result = sqlx::query(
            "INSERT INTO modules (id, course_id, title, description, position) \
             VALUES ($1,$2,$3,$4,$5) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(course_id)
        .bind(&title)
        .bind(&description)
        .bind(position)
        .fetch_one(mm.executor())
        .await?;

        let id = result.try_get("id")?;
        Ok(Module {
            id,
            course_id,
            title,
            description,
            position,
        })
    }

    pub async fn all_for_course(mm: &ModelManager, course_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM modules WHERE course_id = $1 ORDER BY position",
        )
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Ownership-joined fetch: foreign modules come back as missing.
    pub async fn find_owned(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT m.* FROM modules m \
             JOIN courses c ON c.id = m.course_id \
             WHERE m.id = $1 AND c.owner_id = $2",
        )
        .bind(id)
        .bind(actor.user_id())
        .fetch_one(mm.executor())
        .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(result?))
    }

    /// Applies one batch-reorder pair. Pairs that miss the ownership join
    /// update nothing and raise nothing.
    pub async fn reorder_owned(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: Uuid,
        position: i32,
    ) -> DatabaseResult<()> {
        sqlx::query(
            "UPDATE modules m SET position = $1 \
             FROM courses c \
             WHERE m.id = $2 AND m.course_id = c.id AND c.owner_id = $3",
        )
        .bind(position)
        .bind(id)
        .bind(actor.user_id())
        .execute(mm.executor())
        .await?;
        Ok(())
    }

    /// Applies the edited module set of one course as a unit. The caller has
    /// already resolved the course through the ownership filter and validated
    /// every row; here it is all-or-nothing against the store.
    pub async fn apply_set(
        mm: &ModelManager,
        course_id: Uuid,
        rows: Vec<ModuleUpsert>,
    ) -> DatabaseResult<()> {
        let mut tx = mm.executor().begin().await?;

        for row in rows {
            match (row.id, row.delete) {
                (Some(id), true) => {
                    sqlx::query("DELETE FROM modules WHERE id = $1 AND course_id = $2")
                        .bind(id)
                        .bind(course_id)
                        .execute(&mut *tx)
                        .await?;
                }
                (Some(id), false) => {
                    sqlx::query(
                        "UPDATE modules SET title = $1, description = $2 \
                         WHERE id = $3 AND course_id = $4",
                    )
                    .bind(&row.title)
                    .bind(&row.description)
                    .bind(id)
                    .bind(course_id)
                    .execute(&mut *tx)
                    .await?;
                }
                (None, true) => {} // nothing persisted, nothing to drop
                (None, false) => {
                    let position = next_position::<Module, _>(&mut *tx, course_id).await?;
                    sqlx::query(
                        "INSERT INTO modules (id, course_id, title, description, position) \
                         VALUES ($1,$2,$3,$4,$5)",
                    )
                    .bind(Uuid::new_v4())
                    .bind(course_id)
                    .bind(&row.title)
                    .bind(&row.description)
                    .bind(position)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
