use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};

use crate::error::StoreError;
use crate::results::ResultStore;
use crate::types::NodeResult;

/// SQLite-backed result store.
///
/// Keeps one row per node id so cached results survive across editor and CLI
/// sessions.
pub struct SqliteResultStore {
  pool: SqlitePool,
}

#[derive(FromRow)]
struct NodeResultRow {
  node_id: String,
  success: bool,
  data: Json<serde_json::Value>,
  error: Option<String>,
  updated_at: DateTime<Utc>,
}

impl From<NodeResultRow> for NodeResult {
  fn from(row: NodeResultRow) -> Self {
    Self {
      node_id: row.node_id,
      success: row.success,
      data: row.data.0,
      error: row.error,
      updated_at: row.updated_at,
    }
  }
}

impl SqliteResultStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if needed) a database file and run migrations.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
      .max_connections(4)
      .connect_with(options)
      .await?;

    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    Ok(())
  }
}

#[async_trait]
impl ResultStore for SqliteResultStore {
  async fn get(&self, node_id: &str) -> Result<Option<NodeResult>, StoreError> {
    let row: Option<NodeResultRow> = sqlx::query_as(
      r#"
      SELECT node_id, success, data, error, updated_at
      FROM node_results
      WHERE node_id = ?
      "#,
    )
    .bind(node_id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(NodeResult::from))
  }

  async fn set(&self, result: NodeResult) -> Result<(), StoreError> {
    sqlx::query(
      r#"
      INSERT INTO node_results (node_id, success, data, error, updated_at)
      VALUES (?, ?, ?, ?, ?)
      ON CONFLICT(node_id) DO UPDATE SET
        success = excluded.success,
        data = excluded.data,
        error = excluded.error,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(&result.node_id)
    .bind(result.success)
    .bind(Json(&result.data))
    .bind(&result.error)
    .bind(result.updated_at)
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  async fn remove(&self, node_id: &str) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM node_results WHERE node_id = ?")
      .bind(node_id)
      .execute(&self.pool)
      .await?;

    Ok(())
  }

  async fn list(&self) -> Result<Vec<NodeResult>, StoreError> {
    let rows: Vec<NodeResultRow> = sqlx::query_as(
      r#"
      SELECT node_id, success, data, error, updated_at
      FROM node_results
      ORDER BY node_id
      "#,
    )
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(NodeResult::from).collect())
  }

  async fn clear(&self) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM node_results")
      .execute(&self.pool)
      .await?;

    Ok(())
  }
}
