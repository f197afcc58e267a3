//! Item persistence. Prices are stored as decimal TEXT. Range filters
//! compare them through `CAST(... AS REAL)`, so bounds are matched at
//! floating-point precision: prices that differ only past about 15
//! significant digits compare equal.

use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use super::{begin_write, contains_pattern, get, Predicate, Resource};
use crate::db::DbError;
use crate::models::{CreateItem, Item, ItemStats, UpdateItem};

const COLUMNS: &str = "id, name, description, price, quantity, is_available, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct ItemRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub quantity: i64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemFilter {
    /// Case-insensitive substring of `name`.
    NameContains(String),
    MinPrice(Decimal),
    MaxPrice(Decimal),
    Available(bool),
}

impl Predicate for ItemFilter {
    fn push_condition(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            ItemFilter::NameContains(needle) => {
                builder
                    .push("name LIKE ")
                    .push_bind(contains_pattern(needle))
                    .push(" ESCAPE '\\'");
            }
            ItemFilter::MinPrice(min) => {
                builder
                    .push("CAST(price AS REAL) >= CAST(")
                    .push_bind(min.to_string())
                    .push(" AS REAL)");
            }
            ItemFilter::MaxPrice(max) => {
                builder
                    .push("CAST(price AS REAL) <= CAST(")
                    .push_bind(max.to_string())
                    .push(" AS REAL)");
            }
            ItemFilter::Available(available) => {
                builder.push("is_available = ").push_bind(*available);
            }
        }
    }
}

impl Resource for Item {
    const NAME: &'static str = "Item";
    const TABLE: &'static str = "items";
    const COLUMNS: &'static str = COLUMNS;

    type Row = ItemRow;
    type Filter = ItemFilter;

    fn from_row(row: ItemRow) -> Result<Self, DbError> {
        let price = row.price.parse::<Decimal>().map_err(|e| DbError::Corrupt {
            resource: Self::NAME,
            id: row.id,
            reason: format!("price '{}': {}", row.price, e),
        })?;
        Ok(Item {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
            quantity: row.quantity,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn create(conn: &mut SqliteConnection, input: CreateItem) -> Result<Item, DbError> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO items (name, description, price, quantity, is_available, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {}",
        COLUMNS
    );
    let row = sqlx::query_as::<_, ItemRow>(&sql)
        .bind(input.name)
        .bind(input.description)
        .bind(input.price.to_string())
        .bind(input.quantity)
        .bind(input.is_available)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

    let item = Item::from_row(row)?;
    info!("created item {}", item.id);
    Ok(item)
}

/// Read-modify-write in one transaction so the stored row and the returned
/// record agree.
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    patch: UpdateItem,
) -> Result<Item, DbError> {
    let mut tx = begin_write(conn).await?;

    let current = get::<Item>(&mut tx, id).await?;
    let item = current.apply(patch, Utc::now());

    sqlx::query(
        "UPDATE items SET name = ?, description = ?, price = ?, quantity = ?, is_available = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price.to_string())
    .bind(item.quantity)
    .bind(item.is_available)
    .bind(item.updated_at)
    .bind(item.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("updated item {}", item.id);
    Ok(item)
}

pub async fn stats(conn: &mut SqliteConnection) -> Result<ItemStats, DbError> {
    let (total, available): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_available THEN 1 ELSE 0 END), 0) FROM items",
    )
    .fetch_one(&mut *conn)
    .await?;
    Ok(ItemStats::from_counts(total, available))
}
