use uuid::Uuid;

use crate::{
    model::{
        ModelManager,
        error::{DatabaseError, DatabaseResult},
    },
    web::{AuthenticatedUser, UserRole},
};

/// Gate for the course chat room: only enrolled students (and admins) get
/// in. This is the one place a foreign resource answers Forbidden rather
/// than NotFound; everywhere else ownership is folded into the queries.
pub async fn ensure_enrolled(
    mm: &ModelManager,
    ctx: &AuthenticatedUser,
    course_id: Uuid,
) -> DatabaseResult<()> {
    // admin can enter any room
    if ctx.user_role() == UserRole::Admin {
        return Ok(());
    }

    let enrolled: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
    )
    .bind(ctx.user_id())
    .bind(course_id)
    .fetch_one(mm.executor())
    .await?;

    if enrolled {
        Ok(())
    } else {
        Err(DatabaseError::Forbidden)
    }
}
