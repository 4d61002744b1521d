use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{ContentWithItemRow, ItemKind, ItemPayload, Module};

/// What the content form accepts. Owner, position and timestamps are
/// stamped server-side and deliberately absent here.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ItemForm {
    pub title: String,
    pub payload: ItemPayload,
}

impl ItemForm {
    pub fn validate(&self, kind: ItemKind) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title: this field is required".to_string());
        }
        if self.payload.kind() != kind {
            errors.push(format!(
                "payload: expected a {kind} payload, got {}",
                self.payload.kind()
            ));
        }
        let body = match &self.payload {
            ItemPayload::Text { body } => body,
            ItemPayload::File { path } => path,
            ItemPayload::Image { path } => path,
            ItemPayload::Video { url } => url,
        };
        if body.trim().is_empty() {
            errors.push("payload: this field is required".to_string());
        }
        errors
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ItemSummary {
    pub id: Uuid,
    pub title: String,
    pub kind: ItemKind,
    pub payload: ItemPayload,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ContentResponse {
    pub id: Uuid,
    pub module_id: Uuid,
    pub position: i32,
    pub item: ItemSummary,
}

impl TryFrom<ContentWithItemRow> for ContentResponse {
    type Error = serde_json::Error;

    fn try_from(row: ContentWithItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            module_id: row.module_id,
            position: row.position,
            item: serde_json::from_value(row.item)?,
        })
    }
}

impl ContentResponse {
    pub fn from_rows(rows: Vec<ContentWithItemRow>) -> Result<Vec<Self>, serde_json::Error> {
        rows.into_iter().map(ContentResponse::try_from).collect()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ModuleContentsResponse {
    pub module: Module,
    pub contents: Vec<ContentResponse>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn form_rejects_mismatched_kind() {
        let form = ItemForm {
            title: "Intro".into(),
            payload: ItemPayload::Text {
                body: "hello".into(),
            },
        };
        assert!(form.validate(ItemKind::Text).is_empty());

        let errors = form.validate(ItemKind::Video);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("expected a video payload"));
    }

    #[test]
    fn form_requires_title_and_body() {
        let form = ItemForm {
            title: "  ".into(),
            payload: ItemPayload::File { path: "".into() },
        };
        let errors = form.validate(ItemKind::File);
        assert_eq!(errors.len(), 2);
    }
}
