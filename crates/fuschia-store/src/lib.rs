//! Fuschia Store
//!
//! This crate provides the two shared, mutable structures of the test
//! orchestrator:
//!
//! - [`ResultStore`]: last-known result per node id. A result is "cached" as
//!   long as it is present; there is no expiry.
//! - [`SessionRegistry`]: in-flight test sessions, at most one per node id and
//!   at most one workflow-scope session.
//!
//! Both are injected into the orchestrator as trait objects. In-memory
//! implementations are provided for each; results can also be persisted to
//! SQLite with [`SqliteResultStore`].

mod error;
mod results;
mod sessions;
mod sqlite;
mod types;

pub use error::StoreError;
pub use results::{InMemoryResultStore, ResultStore};
pub use sessions::{InMemorySessionRegistry, SessionRegistry};
pub use sqlite::SqliteResultStore;
pub use types::{NodeResult, Session, SessionKey, SessionScope, SessionStatus};
