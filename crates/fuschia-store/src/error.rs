/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  /// Schema migration failed.
  #[error("migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),
}
