use async_trait::async_trait;

use crate::interceptors::AppError;
use crate::models::{Category, QueueEntry};

/// Durable record store for queue entries.
///
/// The queue engine consumes exactly these four primitives; any backend able
/// to persist the entry schema (id, name, category code, arrival time,
/// position, served flag) can stand in for the sqlite implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Persist a new waiting entry. The store assigns the id and arrival
    /// time; position starts at the 0 placeholder and served at false.
    async fn insert(&self, name: &str, category: Category) -> Result<QueueEntry, AppError>;

    /// Batch write of position/served for the given entries, atomic with
    /// respect to concurrent readers.
    async fn update_many(&self, entries: &[QueueEntry]) -> Result<(), AppError>;

    /// Hard-delete by id. Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;

    /// Active (unserved) entries, optionally filtered by category, ordered by
    /// arrival time with insertion order as the tie-breaker.
    async fn query_active(&self, category: Option<Category>)
        -> Result<Vec<QueueEntry>, AppError>;
}
