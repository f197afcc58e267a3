//! Resource storage.
//!
//! Every function takes the request's connection explicitly. The generic
//! operations here cover what Items and Todos share (list, get, delete,
//! predicate delete, count); creation, updates and stats live in the
//! per-resource modules because they name concrete columns.

pub mod items;
pub mod todos;

use log::debug;
use sqlx::sqlite::SqliteRow;
use sqlx::{Connection, FromRow, QueryBuilder, Sqlite, SqliteConnection, Transaction};

use crate::db::DbError;
use crate::models::Page;

pub use items::ItemFilter;
pub use todos::TodoFilter;

/// One condition in a conjunctive filter.
pub trait Predicate {
    /// Push a single boolean SQL expression, binding any values.
    fn push_condition(&self, builder: &mut QueryBuilder<'_, Sqlite>);
}

/// A record kind persisted in its own table.
pub trait Resource: Sized {
    /// Human-facing name used in not-found messages.
    const NAME: &'static str;
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    /// Storage shape, decoded straight from a row.
    type Row: for<'r> FromRow<'r, SqliteRow> + Send + Unpin;
    type Filter: Predicate;

    /// Map the storage shape onto the response shape.
    fn from_row(row: Self::Row) -> Result<Self, DbError>;
}

fn push_where<P: Predicate>(builder: &mut QueryBuilder<'_, Sqlite>, filters: &[P]) {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        filter.push_condition(builder);
    }
}

/// Escape LIKE wildcards in user input and wrap it for a substring match.
/// Pair with `ESCAPE '\'`.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Start a read-modify-write transaction.
///
/// `BEGIN IMMEDIATE` takes the write lock up front, so a second writer waits
/// on the busy timeout instead of failing when its read lock cannot be
/// upgraded.
pub(crate) async fn begin_write(
    conn: &mut SqliteConnection,
) -> Result<Transaction<'_, Sqlite>, DbError> {
    Ok(conn.begin_with("BEGIN IMMEDIATE").await?)
}

/// Records matching every filter, in id order, windowed by `page`.
pub async fn list<R: Resource>(
    conn: &mut SqliteConnection,
    filters: &[R::Filter],
    page: Page,
) -> Result<Vec<R>, DbError> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM {}", R::COLUMNS, R::TABLE));
    push_where(&mut builder, filters);
    builder
        .push(" ORDER BY id LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(i64::from(page.skip));

    let rows = builder.build_query_as::<R::Row>().fetch_all(&mut *conn).await?;
    debug!("listed {} {} rows", rows.len(), R::TABLE);
    rows.into_iter().map(R::from_row).collect()
}

pub async fn get<R: Resource>(conn: &mut SqliteConnection, id: i64) -> Result<R, DbError> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?", R::COLUMNS, R::TABLE);
    let row = sqlx::query_as::<_, R::Row>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(DbError::NotFound {
            resource: R::NAME,
            id,
        })?;
    R::from_row(row)
}

/// Remove one record; a missing id is an error, not a no-op.
pub async fn delete<R: Resource>(conn: &mut SqliteConnection, id: i64) -> Result<(), DbError> {
    let sql = format!("DELETE FROM {} WHERE id = ?", R::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound {
            resource: R::NAME,
            id,
        });
    }
    Ok(())
}

/// Remove every record matching the filters in a single statement.
pub async fn delete_where<R: Resource>(
    conn: &mut SqliteConnection,
    filters: &[R::Filter],
) -> Result<u64, DbError> {
    let mut builder = QueryBuilder::new(format!("DELETE FROM {}", R::TABLE));
    push_where(&mut builder, filters);
    let result = builder.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

pub async fn count_where<R: Resource>(
    conn: &mut SqliteConnection,
    filters: &[R::Filter],
) -> Result<i64, DbError> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", R::TABLE));
    push_where(&mut builder, filters);
    let count = builder
        .build_query_scalar::<i64>()
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
