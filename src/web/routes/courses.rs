use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    model::{
        ResourceTyped,
        entity::{
            Course, CourseCreate, CourseWithModuleCountRow, Module, Subject,
            SubjectWithCourseCountRow,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::{
            catalog::{CatalogResponse, CourseSummary, SubjectSummary},
            modules::{CourseModulesResponse, ModuleSetForm},
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(catalog_handler).post(course_create_handler))
        .route("/mine", get(course_manage_list_handler))
        .route(
            "/{id}",
            get(course_detail_handler)
                .put(course_update_handler)
                .delete(course_delete_handler),
        )
        .route("/{id}/enroll", post(course_enroll_handler))
        .route(
            "/{id}/modules",
            get(course_modules_handler).put(course_modules_update_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

/// Permission check for the management routes. Kept as an explicit call at
/// the top of each handler rather than a middleware so the sequence
/// (permission, then ownership filter, then operation) stays readable.
fn require_instructor(user: &AuthenticatedUser) -> WebResult<()> {
    match user.user_role() {
        UserRole::Admin | UserRole::Instructor => Ok(()),
        UserRole::Student => Err(WebError::resource_forbidden(Course::get_resource_type())),
    }
}

fn validate_course_form(form: &CourseCreate) -> Vec<String> {
    let mut errors = Vec::new();
    if form.title.trim().is_empty() {
        errors.push("title: this field is required".to_string());
    }
    if form.slug.trim().is_empty() {
        errors.push("slug: this field is required".to_string());
    }
    errors
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CatalogQuery {
    /// Restrict the course listing to one subject by its slug.
    subject: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/",
    description = "Course catalog: subjects with course counts, courses with module counts, optionally filtered by subject slug",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Catalog collected", body = CatalogResponse),
        (status = 404, description = "Unknown subject slug", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn catalog_handler(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> WebResult<impl IntoResponse> {
    let subject = match query.subject.as_deref() {
        Some(slug) => {
            let found = Subject::find_by_slug(state.pool(), slug)
                .await
                .map_err(|e| WebError::resource_fetch_error(Subject::get_resource_type(), e))?;
            match found {
                Some(subject) => Some(subject),
                None => return Err(WebError::resource_not_found(Subject::get_resource_type())),
            }
        }
        None => None,
    };

    let subjects = SubjectWithCourseCountRow::fetch_all(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Subject::get_resource_type(), e))?;

    let subject_id = subject.as_ref().map(|s| s.id());
    let courses = CourseWithModuleCountRow::fetch_all(state.pool(), subject_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let selected = subject.and_then(|s| {
        subjects
            .iter()
            .find(|row| row.id == s.id())
            .map(|row| SubjectSummary {
                id: row.id,
                title: row.title.clone(),
                slug: row.slug.clone(),
                total_courses: row.total_courses,
            })
    });

    let body = CatalogResponse {
        subjects: subjects.into_iter().map(SubjectSummary::from).collect(),
        subject: selected,
        courses: courses.into_iter().map(CourseSummary::from).collect(),
    };

    Ok((StatusCode::OK, Json(body)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    description = "Public course detail",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses"
)]
async fn course_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let course = Course::find_by_id(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    match course {
        Some(course) => Ok((StatusCode::OK, Json(course))),
        None => Err(WebError::resource_not_found(Course::get_resource_type())),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/mine",
    description = "Courses owned by the acting instructor",
    responses(
        (status = 200, description = "Owned courses", body = Vec<Course>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Instructor role required", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
async fn course_manage_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    require_instructor(user)?;

    let courses = Course::all_owned(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/",
    description = "Create a course owned by the acting instructor",
    request_body = CourseCreate,
    responses(
        (status = 200, description = "Course created", body = Course),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Instructor role required", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
async fn course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    require_instructor(user)?;

    let errors = validate_course_form(&payload);
    if !errors.is_empty() {
        return Err(WebError::resource_validation(
            Course::get_resource_type(),
            errors,
        ));
    }

    let created = Course::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    description = "Update an owned course. Foreign courses answer 404.",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CourseCreate,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Instructor role required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
async fn course_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    require_instructor(user)?;

    let found = Course::find_owned(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let Some(found) = found else {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    };

    let errors = validate_course_form(&payload);
    if !errors.is_empty() {
        return Err(WebError::resource_validation(
            Course::get_resource_type(),
            errors,
        ));
    }

    let updated = found
        .update(state.pool(), payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    description = "Delete an owned course and, by cascade, its modules and contents",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Instructor role required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
async fn course_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    require_instructor(user)?;

    let found = Course::find_owned(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let Some(found) = found else {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    };

    found
        .delete(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/enroll",
    description = "Enroll the acting user into a course. Enrolling twice is accepted and leaves one membership row.",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Enrolled"),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
async fn course_enroll_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = Course::find_by_id(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    if found.is_none() {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    Course::enroll(state.pool(), user, id)
        .await
        .map_err(|e| {
            WebError::resource_fetch_error(crate::model::ResourceType::Enrollment, e)
        })?;

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/modules",
    description = "The editable module set of an owned course",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Modules collected", body = CourseModulesResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Instructor role required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
async fn course_modules_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    require_instructor(user)?;

    let course = Course::find_owned(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let Some(course) = course else {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    };

    let modules = Module::all_for_course(state.pool(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(CourseModulesResponse { course, modules })))
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}/modules",
    description = "Replace-in-place the module set of an owned course: update, insert (position auto-assigned) and delete rows as one unit. An invalid submission changes nothing.",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = ModuleSetForm,
    responses(
        (status = 200, description = "Module set applied", body = CourseModulesResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Instructor role required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(("cookie" = []))
)]
async fn course_modules_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModuleSetForm>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    require_instructor(user)?;

    let course = Course::find_owned(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let Some(course) = course else {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    };

    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(WebError::resource_validation(
            Module::get_resource_type(),
            errors,
        ));
    }

    Module::apply_set(state.pool(), course.id(), payload.modules)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    let modules = Module::all_for_course(state.pool(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(CourseModulesResponse { course, modules })))
}
