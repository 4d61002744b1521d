use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;

/// The closed set of content kinds. Anything else is rejected at the route
/// boundary before any query runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Text,
    File,
    Image,
    Video,
}

impl ItemKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "text" => Some(Self::Text),
            "file" => Some(Self::File),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::File => "file",
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind-specific payload, stored as one jsonb column.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemPayload {
    Text { body: String },
    File { path: String },
    Image { path: String },
    Video { url: String },
}

impl ItemPayload {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Text { .. } => ItemKind::Text,
            Self::File { .. } => ItemKind::File,
            Self::Image { .. } => ItemKind::Image,
            Self::Video { .. } => ItemKind::Video,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Item {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    payload: ItemPayload,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = serde_json::Error;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            payload: serde_json::from_value(row.payload)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Item {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn payload(&self) -> &ItemPayload {
        &self.payload
    }

    pub fn kind(&self) -> ItemKind {
        self.payload.kind()
    }

    /// Owner and timestamps are stamped here; the caller supplies only what
    /// the form accepts.
    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        title: String,
        payload: ItemPayload,
    ) -> DatabaseResult<Self> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO items (id, owner_id, title, kind, payload, created_at, updated_at) \
             VALUES ($1,$2,$3,$4,$5,$6,$7)",
        )
        .bind(id)
        .bind(actor.user_id())
        .bind(&title)
        .bind(payload.kind().as_str())
        .bind(serde_json::to_value(&payload)?)
        .bind(now)
        .bind(now)
        .execute(mm.executor())
        .await?;

        Ok(Item {
            id,
            owner_id: actor.user_id(),
            title,
            payload,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn update(
        mut self,
        mm: &ModelManager,
        title: String,
        payload: ItemPayload,
    ) -> DatabaseResult<Self> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE items SET title = $1, kind = $2, payload = $3, updated_at = $4 WHERE id = $5",
        )
        .bind(&title)
        .bind(payload.kind().as_str())
        .bind(serde_json::to_value(&payload)?)
        .bind(now)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.title = title;
        self.payload = payload;
        self.updated_at = now;
        Ok(self)
    }

    pub async fn delete(self, mm: &ModelManager) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result: Result<ItemRow, _> = sqlx::query_as("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_one(mm.executor())
            .await;
        if let Err(sqlx::Error::RowNotFound) = result {
            return Ok(None);
        }

        Ok(Some(Item::try_from(result?)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kind_labels_closed_set() {
        assert_eq!(ItemKind::from_label("text"), Some(ItemKind::Text));
        assert_eq!(ItemKind::from_label("file"), Some(ItemKind::File));
        assert_eq!(ItemKind::from_label("image"), Some(ItemKind::Image));
        assert_eq!(ItemKind::from_label("video"), Some(ItemKind::Video));
        assert_eq!(ItemKind::from_label("audio"), None);
        assert_eq!(ItemKind::from_label(""), None);
    }

    #[test]
    fn payload_roundtrip_keeps_kind() {
        let payload = ItemPayload::Video {
            url: "https://example.org/intro.mp4".into(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["kind"], "video");

        let back: ItemPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back.kind(), ItemKind::Video);
    }
}
