use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::interceptors::AppError;
use crate::models::{Category, QueueEntry};

use super::EntryStore;

/// Sqlite-backed entry store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

impl SqliteEntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn insert(&self, name: &str, category: Category) -> Result<QueueEntry, AppError> {
        let entry = QueueEntry::new(name.to_string(), category);

        sqlx::query(
            "INSERT INTO queue_entries (id, name, category, arrival_time, position, served)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.name)
        .bind(entry.category)
        .bind(entry.arrival_time)
        .bind(entry.position)
        .bind(entry.served)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn update_many(&self, entries: &[QueueEntry]) -> Result<(), AppError> {
        // Single transaction so readers never observe a half-renumbered queue.
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query("UPDATE queue_entries SET position = ?, served = ? WHERE id = ?")
                .bind(entry.position)
                .bind(entry.served)
                .bind(&entry.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query_active(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<QueueEntry>, AppError> {
        // rowid breaks arrival-time ties in insertion order.
        let entries = match category {
            Some(category) => {
                sqlx::query_as::<_, QueueEntry>(
                    "SELECT id, name, category, arrival_time, position, served
                     FROM queue_entries
                     WHERE served = FALSE AND category = ?
                     ORDER BY arrival_time, rowid",
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, QueueEntry>(
                    "SELECT id, name, category, arrival_time, position, served
                     FROM queue_entries
                     WHERE served = FALSE
                     ORDER BY arrival_time, rowid",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(entries)
    }
}
