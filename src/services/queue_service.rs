use std::sync::Arc;

use tokio::sync::Mutex;

use crate::dto::{EnqueueRequest, EntryResponse, MessageResponse};
use crate::interceptors::AppError;
use crate::models::{Category, QueueEntry};
use crate::store::EntryStore;
use crate::utils::validate_request;

/// Queue engine: the renumbering pass plus the operations that drive it.
///
/// Mutating operations hold the shared mutation lock across the whole
/// read-modify-renumber-write sequence; list/get read without it and see
/// either the pre- or post-mutation queue, never a half-renumbered one.
#[derive(Clone)]
pub struct QueueService {
    store: Arc<dyn EntryStore>,
    mutation_lock: Arc<Mutex<()>>,
}

impl QueueService {
    pub fn new(store: Arc<dyn EntryStore>, mutation_lock: Arc<Mutex<()>>) -> Self {
        Self {
            store,
            mutation_lock,
        }
    }

    /// Recompute positions for every active entry: the priority band first,
    /// then the normal band, FIFO within each, contiguous from 1.
    ///
    /// Runs unconditionally after every mutation and is idempotent. Always a
    /// full rescan, never incremental; any replacement must produce the exact
    /// same assignment.
    async fn renumber(&self) -> Result<Vec<QueueEntry>, AppError> {
        let mut entries = self.store.query_active(Some(Category::Priority)).await?;
        entries.extend(self.store.query_active(Some(Category::Normal)).await?);

        for (index, entry) in entries.iter_mut().enumerate() {
            entry.position = index as i64 + 1;
        }

        self.store.update_many(&entries).await?;
        Ok(entries)
    }

    /// Add a new entry to the queue and return it with its assigned position.
    pub async fn enqueue(&self, request: EnqueueRequest) -> Result<EntryResponse, AppError> {
        validate_request(&request)?;

        let name = request.name.trim().to_string();
        let category = Category::parse(&request.category).ok_or_else(|| {
            AppError::ValidationError("category: Category must be P (priority) or N (normal)".to_string())
        })?;

        let _guard = self.mutation_lock.lock().await;

        let entry = self.store.insert(&name, category).await?;
        let renumbered = self.renumber().await?;

        let placed = renumbered
            .into_iter()
            .find(|candidate| candidate.id == entry.id)
            .ok_or_else(|| {
                AppError::InternalError("Enqueued entry missing after renumbering".to_string())
            })?;

        tracing::info!(
            name = %placed.name,
            category = placed.category.code(),
            position = placed.position,
            "entry enqueued"
        );

        Ok(placed.to_response())
    }

    /// Call the entry at position 1 for service. The record is retired, not
    /// deleted: served stays true with position 0 as queue history.
    pub async fn call_next(&self) -> Result<MessageResponse, AppError> {
        let _guard = self.mutation_lock.lock().await;

        let active = self.store.query_active(None).await?;
        let mut next = active
            .into_iter()
            .find(|entry| entry.position == 1)
            .ok_or_else(|| {
                AppError::EmptyQueue("No one is waiting to be called".to_string())
            })?;

        next.served = true;
        next.position = 0;
        self.store.update_many(std::slice::from_ref(&next)).await?;
        self.renumber().await?;

        tracing::info!(name = %next.name, "entry called for service");

        Ok(MessageResponse {
            message: format!("{} called for service. Queue updated.", next.name),
        })
    }

    /// Erase the entry at the given position and close the gap.
    pub async fn remove_by_position(&self, position: i64) -> Result<MessageResponse, AppError> {
        let _guard = self.mutation_lock.lock().await;

        let entry = self
            .find_active(position)
            .await?
            .ok_or_else(|| AppError::NotFound(not_found_message(position)))?;

        if !self.store.delete(&entry.id).await? {
            return Err(AppError::InternalError(format!(
                "Entry at position {position} vanished during removal"
            )));
        }
        self.renumber().await?;

        tracing::info!(name = %entry.name, position, "entry removed");

        Ok(MessageResponse {
            message: format!("{} removed from position {}. Queue updated.", entry.name, position),
        })
    }

    /// All waiting entries, ascending by position.
    pub async fn list(&self) -> Result<Vec<EntryResponse>, AppError> {
        let mut entries = self.store.query_active(None).await?;
        entries.retain(|entry| entry.position >= 1);
        entries.sort_by_key(|entry| entry.position);

        Ok(entries.iter().map(QueueEntry::to_response).collect())
    }

    /// The waiting entry at the given position.
    pub async fn get_by_position(&self, position: i64) -> Result<EntryResponse, AppError> {
        self.find_active(position)
            .await?
            .map(|entry| entry.to_response())
            .ok_or_else(|| AppError::NotFound(not_found_message(position)))
    }

    async fn find_active(&self, position: i64) -> Result<Option<QueueEntry>, AppError> {
        if position < 1 {
            return Ok(None);
        }

        let active = self.store.query_active(None).await?;
        Ok(active.into_iter().find(|entry| entry.position == position))
    }
}

fn not_found_message(position: i64) -> String {
    format!("No one found at queue position {position}")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use crate::store::MockEntryStore;

    use super::*;

    /// Vec-backed store with deterministic, strictly increasing arrival
    /// times so FIFO assertions never depend on wall-clock resolution.
    struct InMemoryStore {
        entries: StdMutex<Vec<QueueEntry>>,
        seq: AtomicI64,
    }

    impl InMemoryStore {
        fn new() -> Self {
            Self {
                entries: StdMutex::new(Vec::new()),
                seq: AtomicI64::new(0),
            }
        }

        fn snapshot(&self) -> Vec<QueueEntry> {
            self.entries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EntryStore for InMemoryStore {
        async fn insert(&self, name: &str, category: Category) -> Result<QueueEntry, AppError> {
            let seq = self.seq.fetch_add(1, Ordering::SeqCst);
            let entry = QueueEntry {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                category,
                arrival_time: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
                    + Duration::seconds(seq),
                position: 0,
                served: false,
            };
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        }

        async fn update_many(&self, updates: &[QueueEntry]) -> Result<(), AppError> {
            let mut entries = self.entries.lock().unwrap();
            for update in updates {
                if let Some(entry) = entries.iter_mut().find(|e| e.id == update.id) {
                    entry.position = update.position;
                    entry.served = update.served;
                }
            }
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<bool, AppError> {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|entry| entry.id != id);
            Ok(entries.len() < before)
        }

        async fn query_active(
            &self,
            category: Option<Category>,
        ) -> Result<Vec<QueueEntry>, AppError> {
            let mut active: Vec<QueueEntry> = self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|entry| entry.is_active())
                .filter(|entry| category.map_or(true, |c| entry.category == c))
                .cloned()
                .collect();
            // Stable sort keeps insertion order on arrival-time ties.
            active.sort_by_key(|entry| entry.arrival_time);
            Ok(active)
        }
    }

    fn service() -> (QueueService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let service = QueueService::new(store.clone(), Arc::new(Mutex::new(())));
        (service, store)
    }

    fn request(name: &str, category: &str) -> EnqueueRequest {
        EnqueueRequest {
            name: name.to_string(),
            category: category.to_string(),
        }
    }

    async fn listed(service: &QueueService) -> Vec<(i64, String)> {
        service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|entry| (entry.position, entry.name))
            .collect()
    }

    fn assert_queue_invariants(entries: &[QueueEntry]) {
        let mut active: Vec<&QueueEntry> = entries.iter().filter(|e| e.is_active()).collect();
        active.sort_by_key(|e| e.position);

        for (index, entry) in active.iter().enumerate() {
            assert_eq!(entry.position, index as i64 + 1, "positions must be 1..=n");
        }
        for pair in active.windows(2) {
            assert!(
                !(pair[0].category == Category::Normal && pair[1].category == Category::Priority),
                "a normal entry may never precede a priority entry"
            );
            if pair[0].category == pair[1].category {
                assert!(
                    pair[0].arrival_time <= pair[1].arrival_time,
                    "arrival order must match position order within a band"
                );
            }
        }
        for entry in entries.iter().filter(|e| e.served) {
            assert_eq!(entry.position, 0, "served entries leave the active range");
        }
    }

    #[tokio::test]
    async fn normal_entries_queue_in_arrival_order() {
        let (service, store) = service();

        for name in ["Ana", "Carlos", "Maria"] {
            service.enqueue(request(name, "N")).await.unwrap();
        }

        assert_eq!(
            listed(&service).await,
            vec![
                (1, "Ana".to_string()),
                (2, "Carlos".to_string()),
                (3, "Maria".to_string()),
            ]
        );
        assert_queue_invariants(&store.snapshot());
    }

    #[tokio::test]
    async fn priority_entry_jumps_ahead_of_normal_band() {
        let (service, store) = service();

        for name in ["Ana", "Carlos", "Maria"] {
            service.enqueue(request(name, "N")).await.unwrap();
        }
        let joao = service.enqueue(request("Joao", "P")).await.unwrap();

        assert_eq!(joao.position, 1);
        assert_eq!(
            listed(&service).await,
            vec![
                (1, "Joao".to_string()),
                (2, "Ana".to_string()),
                (3, "Carlos".to_string()),
                (4, "Maria".to_string()),
            ]
        );
        assert_queue_invariants(&store.snapshot());
    }

    #[tokio::test]
    async fn priority_entries_are_fifo_among_themselves() {
        let (service, _store) = service();

        service.enqueue(request("Ana", "N")).await.unwrap();
        service.enqueue(request("Joao", "P")).await.unwrap();
        service.enqueue(request("Pedro", "P")).await.unwrap();

        assert_eq!(
            listed(&service).await,
            vec![
                (1, "Joao".to_string()),
                (2, "Pedro".to_string()),
                (3, "Ana".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn call_next_serves_position_one_and_closes_the_gap() {
        let (service, store) = service();

        for name in ["Ana", "Carlos", "Maria"] {
            service.enqueue(request(name, "N")).await.unwrap();
        }
        service.enqueue(request("Joao", "P")).await.unwrap();

        let confirmation = service.call_next().await.unwrap();
        assert!(confirmation.message.contains("Joao"));

        assert_eq!(
            listed(&service).await,
            vec![
                (1, "Ana".to_string()),
                (2, "Carlos".to_string()),
                (3, "Maria".to_string()),
            ]
        );

        // Retired, not deleted: the record stays behind as history.
        let snapshot = store.snapshot();
        let joao = snapshot.iter().find(|e| e.name == "Joao").unwrap();
        assert!(joao.served);
        assert_eq!(joao.position, 0);
        assert_queue_invariants(&snapshot);
    }

    #[tokio::test]
    async fn removal_renumbers_so_positions_are_reused() {
        let (service, store) = service();

        for name in ["Ana", "Carlos", "Maria"] {
            service.enqueue(request(name, "N")).await.unwrap();
        }

        let first = service.remove_by_position(2).await.unwrap();
        assert!(first.message.contains("Carlos"));
        assert_eq!(
            listed(&service).await,
            vec![(1, "Ana".to_string()), (2, "Maria".to_string())]
        );

        // Position 2 now belongs to Maria.
        let second = service.remove_by_position(2).await.unwrap();
        assert!(second.message.contains("Maria"));
        assert_eq!(listed(&service).await, vec![(1, "Ana".to_string())]);

        // Hard delete: removed records are gone for good.
        let snapshot = store.snapshot();
        assert!(snapshot.iter().all(|e| e.name != "Carlos" && e.name != "Maria"));
        assert_queue_invariants(&snapshot);
    }

    #[tokio::test]
    async fn call_next_on_empty_queue_fails_without_state_change() {
        let (service, store) = service();

        let error = service.call_next().await.unwrap_err();
        assert!(matches!(error, AppError::EmptyQueue(_)));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn invalid_enqueue_persists_nothing() {
        let (service, store) = service();

        let too_long = "a".repeat(21);
        for (name, category) in [("", "N"), ("   ", "N"), (too_long.as_str(), "N"), ("Maria", "X")] {
            let error = service.enqueue(request(name, category)).await.unwrap_err();
            assert!(matches!(error, AppError::ValidationError(_)), "{name:?}/{category:?}");
        }

        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn enqueue_trims_name_and_normalizes_category() {
        let (service, _store) = service();

        let entry = service.enqueue(request("  Maria  ", "priority")).await.unwrap();
        assert_eq!(entry.name, "Maria");
        assert_eq!(entry.category, Category::Priority);
        assert_eq!(entry.position, 1);
    }

    #[tokio::test]
    async fn get_by_position_outside_active_range_is_not_found() {
        let (service, _store) = service();
        service.enqueue(request("Ana", "N")).await.unwrap();

        assert_eq!(service.get_by_position(1).await.unwrap().name, "Ana");
        for position in [0, 2, 99, -1] {
            let error = service.get_by_position(position).await.unwrap_err();
            assert!(matches!(error, AppError::NotFound(_)), "position {position}");
        }
    }

    #[tokio::test]
    async fn remove_at_unknown_position_leaves_queue_unchanged() {
        let (service, _store) = service();
        service.enqueue(request("Ana", "N")).await.unwrap();

        let error = service.remove_by_position(5).await.unwrap_err();
        assert!(matches!(error, AppError::NotFound(_)));
        assert_eq!(listed(&service).await, vec![(1, "Ana".to_string())]);
    }

    #[tokio::test]
    async fn renumbering_is_idempotent() {
        let (service, _store) = service();

        service.enqueue(request("Ana", "N")).await.unwrap();
        service.enqueue(request("Joao", "P")).await.unwrap();
        service.enqueue(request("Maria", "N")).await.unwrap();

        let first = service.renumber().await.unwrap();
        let second = service.renumber().await.unwrap();

        let positions =
            |entries: &[QueueEntry]| entries.iter().map(|e| (e.id.clone(), e.position)).collect::<Vec<_>>();
        assert_eq!(positions(&first), positions(&second));
    }

    #[tokio::test]
    async fn invariants_hold_across_mixed_operations() {
        let (service, store) = service();

        service.enqueue(request("Ana", "N")).await.unwrap();
        service.enqueue(request("Joao", "P")).await.unwrap();
        service.enqueue(request("Carlos", "N")).await.unwrap();
        assert_queue_invariants(&store.snapshot());

        service.call_next().await.unwrap();
        assert_queue_invariants(&store.snapshot());

        service.enqueue(request("Pedro", "P")).await.unwrap();
        service.enqueue(request("Maria", "N")).await.unwrap();
        assert_queue_invariants(&store.snapshot());

        service.remove_by_position(2).await.unwrap();
        assert_queue_invariants(&store.snapshot());

        service.call_next().await.unwrap();
        assert_queue_invariants(&store.snapshot());
    }

    #[tokio::test]
    async fn store_failures_surface_as_database_errors() {
        let mut mock = MockEntryStore::new();
        mock.expect_query_active()
            .returning(|_| Err(AppError::DatabaseError(sqlx::Error::PoolClosed)));

        let service = QueueService::new(Arc::new(mock), Arc::new(Mutex::new(())));

        let error = service.list().await.unwrap_err();
        assert!(matches!(error, AppError::DatabaseError(_)));
    }
}
