use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    model::{
        ResourceTyped,
        entity::{Content, Item},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::contents::ItemForm,
        error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/{id}",
            get(content_get_handler)
                .put(content_update_handler)
                .delete(content_delete_handler),
        )
        .route("/order", post(contents_reorder_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/contents/{content_id}",
    description = "Fetch one owned content row with its wrapped item, e.g. to populate the edit form",
    params(("content_id" = Uuid, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Content found", body = Item),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "contents",
    security(("cookie" = []))
)]
async fn content_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let content = Content::find_owned(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    let Some(content) = content else {
        return Err(WebError::resource_not_found(Content::get_resource_type()));
    };

    let item = Item::find_by_id(state.pool(), content.item_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    let Some(item) = item else {
        return Err(WebError::resource_not_found(Content::get_resource_type()));
    };

    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/v1/contents/{content_id}",
    description = "Update the wrapped item of an owned content row. The kind is fixed at creation; the wrapper's position is untouched.",
    params(("content_id" = Uuid, Path, description = "Content ID")),
    request_body = ItemForm,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "contents",
    security(("cookie" = []))
)]
async fn content_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemForm>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let content = Content::find_owned(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    let Some(content) = content else {
        return Err(WebError::resource_not_found(Content::get_resource_type()));
    };

    let item = Item::find_by_id(state.pool(), content.item_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    let Some(item) = item else {
        return Err(WebError::resource_not_found(Content::get_resource_type()));
    };

    let errors = payload.validate(item.kind());
    if !errors.is_empty() {
        return Err(WebError::resource_validation(
            Content::get_resource_type(),
            errors,
        ));
    }

    let updated = item
        .update(state.pool(), payload.title, payload.payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/contents/{content_id}",
    description = "Delete an owned content row and its wrapped item. The wrapper goes first so the item's foreign key is released; a failure between the two deletes is terminal for the request.",
    params(("content_id" = Uuid, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Content and item deleted"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "contents",
    security(("cookie" = []))
)]
async fn content_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let content = Content::find_owned(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    let Some(content) = content else {
        return Err(WebError::resource_not_found(Content::get_resource_type()));
    };

    let item = Item::find_by_id(state.pool(), content.item_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    // the wrapper references the item, so it has to go first
    content
        .delete(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    if let Some(item) = item {
        item.delete(state.pool())
            .await
            .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/contents/order",
    description = "Batch reorder: a map of content id to new position. Foreign and unknown ids are skipped silently; the response is OK either way.",
    request_body = HashMap<Uuid, i32>,
    responses(
        (status = 200, description = "Positions saved"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "contents",
    security(("cookie" = []))
)]
async fn contents_reorder_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<HashMap<Uuid, i32>>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    for (content_id, position) in payload {
        Content::reorder_owned(state.pool(), user, content_id, position)
            .await
            .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;
    }

    Ok((StatusCode::OK, Json(json!({"saved": "OK"}))))
}
