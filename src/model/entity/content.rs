use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::prelude::Row;
use uuid::Uuid;

use crate::model::ordering::{Ordered, next_position};
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;

/// Content wrapper: ties one item into the ordered list of a module. The
/// wrapper owns its item's lifecycle; deleting the wrapper deletes the item.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Content {
    id: Uuid,
    module_id: Uuid,
    item_id: Uuid,
    position: i32,
}

impl Ordered for Content {
    const TABLE: &'static str = "contents";
    const SCOPE_COLUMN: &'static str = "module_id";
}

impl ResourceTyped for Content {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Content
    }
}

impl Content {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn item_id(&self) -> Uuid {
        self.item_id
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub async fn create(
        mm: &ModelManager,
        module_id: Uuid,
        item_id: Uuid,
    ) -> DatabaseResult<Self> {
        let position = next_position::<Content, _>(mm.executor(), module_id).await?;
        let result = sqlx::query(
            "INSERT INTO contents (id, module_id, item_id, position) \
             VALUES ($1,$2,$3,$4) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(module_id)
        .bind(item_id)
        .bind(position)
        .fetch_one(mm.executor())
        .await?;

        let id = result.try_get("id")?;
        Ok(Content {
            id,
            module_id,
            item_id,
            position,
        })
    }

    /// Ownership join through module and course; foreign rows are missing
    /// rows.
    pub async fn find_owned(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT ct.* FROM contents ct \
             JOIN modules m ON m.id = ct.module_id \
             JOIN courses c ON c.id = m.course_id \
             WHERE ct.id = $1 AND c.owner_id = $2",
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

    /// Deletes only the wrapper row. Item deletion is sequenced by the
    /// caller before this; a failure between the two is terminal for the
    /// request.
    pub async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM contents WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    pub async fn reorder_owned(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: Uuid,
        position: i32,
    ) -> DatabaseResult<()> {
        sqlx::query(
            "UPDATE contents ct SET position = $1 \
             FROM modules m, courses c \
             WHERE ct.id = $2 AND ct.module_id = m.id \
               AND m.course_id = c.id AND c.owner_id = $3",
        )
        .bind(position)
        .bind(id)
        .bind(actor.user_id())
        .execute(mm.executor())
        .await?;
        Ok(())
    }
}

// Utils

/// One content row with its item inlined, for the module content listing.
#[derive(Debug, FromRow)]
pub struct ContentWithItemRow {
    pub id: Uuid,
    pub module_id: Uuid,
    pub position: i32,
    pub item: serde_json::Value,
}

impl ContentWithItemRow {
    pub async fn fetch_for_module(
        mm: &ModelManager,
        module_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<ContentWithItemRow> = sqlx::query_as(
            r#"
            SELECT
                ct.id,
                ct.module_id,
                ct.position,
                json_build_object(
                    'id', i.id,
                    'title', i.title,
                    'kind', i.kind,
                    'payload', i.payload
                ) AS item
            FROM contents ct
            JOIN items i ON i.id = ct.item_id
            WHERE ct.module_id = $1
            ORDER BY ct.position;
            "#,
        )
        .bind(module_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
