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
        entity::{Content, ContentWithItemRow, Item, ItemKind, Module},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::contents::{ContentResponse, ItemForm, ModuleContentsResponse},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}/contents", get(module_contents_handler))
        .route("/{id}/contents/{kind}", post(content_create_handler))
        .route("/order", post(modules_reorder_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/modules/{module_id}/contents",
    description = "Ordered contents of an owned module, items inlined",
    params(("module_id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Contents collected", body = ModuleContentsResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "modules",
    security(("cookie" = []))
)]
async fn module_contents_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let module = Module::find_owned(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    let Some(module) = module else {
        return Err(WebError::resource_not_found(Module::get_resource_type()));
    };

    let rows = ContentWithItemRow::fetch_for_module(state.pool(), module.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    let contents = ContentResponse::from_rows(rows)
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e.into()))?;

    Ok((
        StatusCode::OK,
        Json(ModuleContentsResponse { module, contents }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{module_id}/contents/{kind}",
    description = "Create a content item of the given kind under an owned module. Unknown kind labels are 404. The new wrapper row takes the next free position in the module.",
    params(
        ("module_id" = Uuid, Path, description = "Module ID"),
        ("kind" = String, Path, description = "One of text, file, image, video"),
    ),
    request_body = ItemForm,
    responses(
        (status = 200, description = "Content created", body = Content),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Module or kind not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "modules",
    security(("cookie" = []))
)]
async fn content_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path((module_id, kind)): Path<(Uuid, String)>,
    Json(payload): Json<ItemForm>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    // resolve the kind label before touching the store
    let Some(kind) = ItemKind::from_label(&kind) else {
        return Err(WebError::resource_not_found(Content::get_resource_type()));
    };

    let module = Module::find_owned(state.pool(), user, module_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    let Some(module) = module else {
        return Err(WebError::resource_not_found(Module::get_resource_type()));
    };

    let errors = payload.validate(kind);
    if !errors.is_empty() {
        return Err(WebError::resource_validation(
            Content::get_resource_type(),
            errors,
        ));
    }

    let item = Item::create(state.pool(), user, payload.title, payload.payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    let content = Content::create(state.pool(), module.id(), item.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Content::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(content)))
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/order",
    description = "Batch reorder: a map of module id to new position. Foreign and unknown ids are skipped silently; the response is OK either way.",
    request_body = HashMap<Uuid, i32>,
    responses(
        (status = 200, description = "Positions saved"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "modules",
    security(("cookie" = []))
)]
async fn modules_reorder_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<HashMap<Uuid, i32>>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    for (module_id, position) in payload {
        Module::reorder_owned(state.pool(), user, module_id, position)
            .await
            .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;
    }

    Ok((StatusCode::OK, Json(json!({"saved": "OK"}))))
}
