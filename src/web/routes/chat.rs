use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    model::{DatabaseError, ResourceTyped, ensure_enrolled, entity::Course},
    web::{AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares},
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/room/{course_id}", get(chat_room_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Handle the real-time transport needs to join a course room. The
/// transport itself lives outside this service.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChatRoomResponse {
    pub course_id: Uuid,
    pub course_title: String,
    pub channel: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/chat/room/{course_id}",
    description = "Room handle for a course chat. Only enrolled students get in; everybody else is forbidden.",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Room handle", body = ChatRoomResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not enrolled in this course", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "chat",
    security(("cookie" = []))
)]
async fn chat_room_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    ensure_enrolled(state.pool(), user, course_id)
        .await
        .map_err(|e| {
            if let DatabaseError::Forbidden = e {
                WebError::resource_forbidden(Course::get_resource_type())
            } else {
                WebError::resource_fetch_error(Course::get_resource_type(), e)
            }
        })?;

    let course = Course::find_by_id(state.pool(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let Some(course) = course else {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    };

    let body = ChatRoomResponse {
        course_id: course.id(),
        course_title: course.title().to_string(),
        channel: format!("course.{}", course.id()),
    };

    Ok((StatusCode::OK, Json(body)))
}
