use chrono::{DateTime, Utc};
use log::info;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use super::{begin_write, contains_pattern, delete_where, get, Predicate, Resource};
use crate::db::DbError;
use crate::models::{NewTodo, Priority, PriorityBreakdown, Todo, TodoChanges, TodoStats};

const COLUMNS: &str = "id, title, description, completed, priority, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct TodoRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TodoFilter {
    Completed(bool),
    Priority(Priority),
    /// Case-insensitive substring of `title`.
    TitleContains(String),
}

impl Predicate for TodoFilter {
    fn push_condition(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            TodoFilter::Completed(completed) => {
                builder.push("completed = ").push_bind(*completed);
            }
            TodoFilter::Priority(priority) => {
                builder.push("priority = ").push_bind(i64::from(*priority));
            }
            TodoFilter::TitleContains(needle) => {
                builder
                    .push("title LIKE ")
                    .push_bind(contains_pattern(needle))
                    .push(" ESCAPE '\\'");
            }
        }
    }
}

impl Resource for Todo {
    const NAME: &'static str = "Todo";
    const TABLE: &'static str = "todos";
    const COLUMNS: &'static str = COLUMNS;

    type Row = TodoRow;
    type Filter = TodoFilter;

    fn from_row(row: TodoRow) -> Result<Self, DbError> {
        let priority = Priority::try_from(row.priority).map_err(|e| DbError::Corrupt {
            resource: Self::NAME,
            id: row.id,
            reason: e.to_string(),
        })?;
        Ok(Todo {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            priority,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn create(conn: &mut SqliteConnection, input: NewTodo) -> Result<Todo, DbError> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO todos (title, description, completed, priority, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, TodoRow>(&sql)
        .bind(input.title)
        .bind(input.description)
        .bind(input.completed)
        .bind(i64::from(input.priority))
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

    let todo = Todo::from_row(row)?;
    info!("created todo {}", todo.id);
    Ok(todo)
}

async fn write_back(conn: &mut SqliteConnection, todo: &Todo) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE todos SET title = ?, description = ?, completed = ?, priority = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&todo.title)
    .bind(&todo.description)
    .bind(todo.completed)
    .bind(i64::from(todo.priority))
    .bind(todo.updated_at)
    .bind(todo.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    patch: TodoChanges,
) -> Result<Todo, DbError> {
    let mut tx = begin_write(conn).await?;
    let current = get::<Todo>(&mut tx, id).await?;
    let todo = current.apply(patch, Utc::now());
    write_back(&mut tx, &todo).await?;
    tx.commit().await?;

    info!("updated todo {}", todo.id);
    Ok(todo)
}

pub async fn toggle(conn: &mut SqliteConnection, id: i64) -> Result<Todo, DbError> {
    let mut tx = begin_write(conn).await?;
    let current = get::<Todo>(&mut tx, id).await?;
    let todo = current.toggled(Utc::now());
    write_back(&mut tx, &todo).await?;
    tx.commit().await?;

    info!("toggled todo {} to completed={}", todo.id, todo.completed);
    Ok(todo)
}

pub async fn delete_completed(conn: &mut SqliteConnection) -> Result<u64, DbError> {
    let deleted = delete_where::<Todo>(conn, &[TodoFilter::Completed(true)]).await?;
    info!("deleted {} completed todos", deleted);
    Ok(deleted)
}

pub async fn stats(conn: &mut SqliteConnection) -> Result<TodoStats, DbError> {
    let (total, completed, high, medium, low): (i64, i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN completed THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN priority = 3 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN priority = 2 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN priority = 1 THEN 1 ELSE 0 END), 0)
        FROM todos
        "#,
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(TodoStats::from_counts(
        total,
        completed,
        PriorityBreakdown { high, medium, low },
    ))
}
