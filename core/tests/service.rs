//! `TodoService` behaviour against in-memory and purpose-built storages.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use rstest::rstest;
use todo_core::{
    MemoryStorage, NewRow, Storage, StorageError, StoredRow, Task, TodoError, TodoService,
};
use tokio::sync::Barrier;

fn service() -> TodoService {
    TodoService::new(Arc::new(MemoryStorage::new()))
}

async fn seeded(names: &[&str]) -> TodoService {
    let service = service();
    for name in names {
        let added = service.add_todo(*name).await.unwrap();
        assert_eq!(added.name, *name);
        assert!(!added.done);
    }
    service
}

fn names(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.name.as_str()).collect()
}

/// Storage whose every call fails with the configured error.
struct FailingStorage(StorageError);

#[async_trait]
impl Storage for FailingStorage {
    async fn fetch_all(&self) -> Result<Vec<StoredRow>, StorageError> {
        Err(self.0.clone())
    }

    async fn insert(&self, _row: NewRow) -> Result<StoredRow, StorageError> {
        Err(self.0.clone())
    }

    async fn delete(&self, _id: i64) -> Result<(), StorageError> {
        Err(self.0.clone())
    }

    async fn update(&self, _id: i64, _row: NewRow) -> Result<Option<StoredRow>, StorageError> {
        Err(self.0.clone())
    }
}

/// Storage that accepts reads but refuses writes; counts insert attempts.
#[derive(Default)]
struct ReadOnlyStorage {
    inner: MemoryStorage,
    inserts: AtomicUsize,
}

#[async_trait]
impl Storage for ReadOnlyStorage {
    async fn fetch_all(&self) -> Result<Vec<StoredRow>, StorageError> {
        self.inner.fetch_all().await
    }

    async fn insert(&self, _row: NewRow) -> Result<StoredRow, StorageError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::OperationFailed("read only".to_string()))
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        self.inner.delete(id).await
    }

    async fn update(&self, id: i64, row: NewRow) -> Result<Option<StoredRow>, StorageError> {
        self.inner.update(id, row).await
    }
}

/// Holds the first `parties` reads at a barrier so concurrent callers all
/// observe the same snapshot before any of them writes.
struct BarrierStorage {
    inner: MemoryStorage,
    barrier: Barrier,
    parties: usize,
    reads: AtomicUsize,
}

impl BarrierStorage {
    fn new(parties: usize) -> Self {
        Self {
            inner: MemoryStorage::new(),
            barrier: Barrier::new(parties),
            parties,
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Storage for BarrierStorage {
    async fn fetch_all(&self) -> Result<Vec<StoredRow>, StorageError> {
        let rows = self.inner.fetch_all().await?;
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.parties {
            self.barrier.wait().await;
        }
        Ok(rows)
    }

    async fn insert(&self, row: NewRow) -> Result<StoredRow, StorageError> {
        self.inner.insert(row).await
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        self.inner.delete(id).await
    }

    async fn update(&self, id: i64, row: NewRow) -> Result<Option<StoredRow>, StorageError> {
        self.inner.update(id, row).await
    }
}

// --- get ---

#[tokio::test]
async fn get_todos_on_empty_storage_is_empty_vec() {
    let todos = service().get_todos().await.unwrap();
    assert!(todos.is_empty());
}

#[tokio::test]
async fn get_todos_returns_insertion_order_with_ids() {
    let service = seeded(&["go shopping", "laundry", "wash dishes"]).await;
    let todos = service.get_todos().await.unwrap();
    assert_eq!(names(&todos), ["go shopping", "laundry", "wash dishes"]);
    assert_eq!(todos.iter().map(|t| t.id).collect::<Vec<_>>(), [1, 2, 3]);
    assert!(todos.iter().all(|t| !t.done));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn added_names_come_back_in_order(
        added in proptest::collection::hash_set("[a-z]{1,8}", 0..12)
    ) {
        let added: Vec<String> = added.into_iter().collect();
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let fetched = runtime.block_on(async {
            let service = service();
            for name in &added {
                service.add_todo(name.clone()).await.unwrap();
            }
            service.get_todos().await.unwrap()
        });
        let fetched: Vec<String> = fetched.into_iter().map(|t| t.name).collect();
        prop_assert_eq!(fetched, added);
    }
}

// --- add ---

#[tokio::test]
async fn add_rejects_name_of_active_task() {
    let service = seeded(&["laundry"]).await;
    let err = service.add_todo("laundry").await.unwrap_err();
    assert_eq!(err, TodoError::DuplicateTask("laundry".to_string()));
    assert_eq!(service.get_todos().await.unwrap().len(), 1);
}

#[tokio::test]
async fn add_accepts_name_of_done_task() {
    let service = seeded(&["laundry"]).await;
    let mut done = service.get_todos().await.unwrap().remove(0);
    done.done = true;
    service.update_todo(done.id, done).await.unwrap();

    let again = service.add_todo("laundry").await.unwrap();
    assert_eq!(again.id, 2);
    assert!(!again.done);

    let todos = service.get_todos().await.unwrap();
    assert_eq!(names(&todos), ["laundry", "laundry"]);
    assert_eq!(todos.iter().filter(|t| !t.done).count(), 1);
}

#[tokio::test]
async fn add_duplicate_check_is_case_sensitive_and_exact() {
    let service = seeded(&["laundry"]).await;
    service.add_todo("Laundry").await.unwrap();
    service.add_todo("laundry ").await.unwrap();
    assert_eq!(service.get_todos().await.unwrap().len(), 3);
}

#[tokio::test]
async fn add_does_not_insert_when_duplicate() {
    let storage = Arc::new(ReadOnlyStorage::default());
    storage.inner.insert(NewRow::active("laundry")).await.unwrap();
    let service = TodoService::new(storage.clone());

    let err = service.add_todo("laundry").await.unwrap_err();
    assert!(matches!(err, TodoError::DuplicateTask(_)));
    assert_eq!(storage.inserts.load(Ordering::SeqCst), 0);

    let err = service.add_todo("ironing").await.unwrap_err();
    assert!(matches!(err, TodoError::Storage(StorageError::OperationFailed(_))));
    assert_eq!(storage.inserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_adds_with_same_name_can_both_succeed() {
    let storage = Arc::new(BarrierStorage::new(2));
    let service = TodoService::new(storage);

    let (first, second) = tokio::join!(service.add_todo("laundry"), service.add_todo("laundry"));
    let first = first.unwrap();
    let second = second.unwrap();
    assert_ne!(first.id, second.id);

    let todos = service.get_todos().await.unwrap();
    assert_eq!(names(&todos), ["laundry", "laundry"]);
    assert!(todos.iter().all(|t| !t.done));
}

// --- filter ---

#[rstest]
#[case::no_todos(&[], "foo", &[])]
#[case::substring(&["go shopping", "laundry", "wash dishes"], "shop", &["go shopping"])]
#[case::mixed_case(&["go shopping", "laundry", "wash dishes"], "ShOp", &["go shopping"])]
#[case::fuzzy(&["go shopping", "laundry", "wash dishes"], "dsh", &["wash dishes"])]
#[case::reversed(&["go shopping", "laundry", "wash dishes"], "hsd", &[])]
#[case::several(&["go shopping", "laundry", "wash dishes"], "n", &["go shopping", "laundry"])]
#[tokio::test]
async fn filter_todos(#[case] seed: &[&str], #[case] query: &str, #[case] expected: &[&str]) {
    let service = seeded(seed).await;
    let found = service.filter_todos(query).await.unwrap();
    assert_eq!(names(&found), expected);
}

#[tokio::test]
async fn filter_with_empty_query_returns_everything_in_order() {
    let service = seeded(&["wash dishes", "go shopping", "laundry"]).await;
    let all = service.get_todos().await.unwrap();
    let found = service.filter_todos("").await.unwrap();
    assert_eq!(found, all);
}

#[tokio::test]
async fn filter_includes_done_tasks() {
    let service = seeded(&["laundry"]).await;
    let mut task = service.get_todos().await.unwrap().remove(0);
    task.done = true;
    service.update_todo(task.id, task.clone()).await.unwrap();
    assert_eq!(service.filter_todos("lndry").await.unwrap(), vec![task]);
}

// --- delete ---

#[tokio::test]
async fn delete_removes_only_the_given_id() {
    let service = seeded(&["a", "b", "c"]).await;
    service.delete_todo(2).await.unwrap();
    assert_eq!(names(&service.get_todos().await.unwrap()), ["a", "c"]);
}

#[tokio::test]
async fn delete_missing_id_succeeds() {
    let service = seeded(&["a"]).await;
    service.delete_todo(99).await.unwrap();
    service.delete_todo(1).await.unwrap();
    service.delete_todo(1).await.unwrap();
    assert!(service.get_todos().await.unwrap().is_empty());
}

// --- update ---

#[tokio::test]
async fn update_echoes_supplied_fields_with_path_id() {
    let service = seeded(&["laundry"]).await;
    let replacement = Task {
        id: 500,
        name: "fold laundry".to_string(),
        done: true,
    };
    let updated = service.update_todo(1, replacement).await.unwrap();
    assert_eq!(
        updated,
        Task {
            id: 1,
            name: "fold laundry".to_string(),
            done: true,
        }
    );
    assert_eq!(service.get_todos().await.unwrap(), vec![updated]);
}

#[tokio::test]
async fn update_skips_duplicate_check() {
    let service = seeded(&["laundry", "ironing"]).await;
    let replacement = Task {
        id: 2,
        name: "laundry".to_string(),
        done: false,
    };
    service.update_todo(2, replacement).await.unwrap();
    let todos = service.get_todos().await.unwrap();
    assert_eq!(names(&todos), ["laundry", "laundry"]);
}

#[tokio::test]
async fn update_missing_id_still_echoes() {
    let service = service();
    let replacement = Task {
        id: 4,
        name: "ghost".to_string(),
        done: false,
    };
    let echoed = service.update_todo(4, replacement.clone()).await.unwrap();
    assert_eq!(echoed, replacement);
    assert!(service.get_todos().await.unwrap().is_empty());
}

// --- storage failures ---

#[rstest]
#[case(StorageError::Unavailable("connection refused".to_string()))]
#[case(StorageError::OperationFailed("syntax error".to_string()))]
#[tokio::test]
async fn storage_failures_propagate_unchanged(#[case] failure: StorageError) {
    let service = TodoService::new(Arc::new(FailingStorage(failure.clone())));
    let expected = TodoError::Storage(failure);

    assert_eq!(service.get_todos().await.unwrap_err(), expected);
    assert_eq!(service.add_todo("x").await.unwrap_err(), expected);
    assert_eq!(service.filter_todos("").await.unwrap_err(), expected);
    assert_eq!(service.filter_todos("x").await.unwrap_err(), expected);
    assert_eq!(service.delete_todo(1).await.unwrap_err(), expected);
    let replacement = Task {
        id: 1,
        name: "x".to_string(),
        done: false,
    };
    assert_eq!(service.update_todo(1, replacement).await.unwrap_err(), expected);
}
