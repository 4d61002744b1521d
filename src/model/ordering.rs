//! Sequence positions for ordered siblings.
//!
//! A module sits at a position among the modules of its course, a content
//! row among the contents of its module. The position is assigned once, at
//! insert, when the caller does not supply one; after that only the explicit
//! reorder endpoints touch it. Nothing enforces uniqueness, so two
//! concurrent inserts under the same scope can end up with the same
//! position. Accepted limitation.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::model::DatabaseResult;

/// An entity whose rows carry a `position` column scoped to a parent row.
pub trait Ordered {
    const TABLE: &'static str;
    const SCOPE_COLUMN: &'static str;
}

/// Next free position under `scope_id`: max sibling position plus one,
/// or 0 when there are no siblings yet.
pub async fn next_position<'e, T, E>(executor: E, scope_id: Uuid) -> DatabaseResult<i32>
where
    T: Ordered,
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM {} WHERE {} = $1",
        T::TABLE,
        T::SCOPE_COLUMN
    );
    let position: i32 = sqlx::query_scalar(&sql)
        .bind(scope_id)
        .fetch_one(executor)
        .await?;

    Ok(position)
}
