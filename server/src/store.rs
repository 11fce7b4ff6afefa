//! SQLite-backed item store.
//!
//! # Design
//! One `rusqlite::Connection` behind an async mutex, shared by every request
//! through the router state. Each public operation takes the lock, runs a
//! single statement (or one transaction) on tokio's blocking pool, and
//! releases it, so every request commits exactly once and SQLite I/O never
//! stalls a runtime worker.

use std::path::Path;
use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use todo_core::{TodoId, TodoItemDto};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS todo_items (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT NOT NULL CHECK (length(title) <= 200),
  is_done INTEGER NOT NULL DEFAULT 0
);
"#;

const SEED_ITEMS: [(&str, bool); 3] = [
    ("Learn the basics of MVVM", false),
    ("Call the API from the client", false),
    ("Persist data in SQLite", true),
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A persisted todo row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    pub is_done: bool,
}

impl TodoItem {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            is_done: row.get(2)?,
        })
    }
}

impl From<TodoItem> for TodoItemDto {
    fn from(item: TodoItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            is_done: item.is_done,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TodoStore {
    conn: Arc<Mutex<Connection>>,
}

impl TodoStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!(database = %path.display(), "opening todo store");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool. The lock is held
    /// until `f` returns.
    async fn with_conn<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<R> + Send + 'static,
    {
        let mut conn = Arc::clone(&self.conn).lock_owned().await;
        let result = tokio::task::spawn_blocking(move || f(&mut *conn)).await?;
        Ok(result?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        let items = self
            .with_conn(|conn| {
                let mut stmt =
                    conn.prepare_cached("SELECT id, title, is_done FROM todo_items ORDER BY id ASC")?;
                let rows = stmt.query_map([], TodoItem::from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;
        debug!(count = items.len(), "listed todo items");
        Ok(items)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: TodoId) -> Result<Option<TodoItem>, StoreError> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, title, is_done FROM todo_items WHERE id = ?1",
                params![id],
                TodoItem::from_row,
            )
            .optional()
        })
        .await
    }

    /// Insert a new, not-done item. `title` must already be normalized.
    #[tracing::instrument(skip(self))]
    pub async fn insert(&self, title: &str) -> Result<TodoItem, StoreError> {
        let title = title.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO todo_items (title, is_done) VALUES (?1, 0)",
                params![title],
            )?;
            Ok(TodoItem {
                id: conn.last_insert_rowid(),
                title,
                is_done: false,
            })
        })
        .await
    }

    /// Overwrite title and done flag. Returns `false` when no row has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: TodoId, title: &str, is_done: bool) -> Result<bool, StoreError> {
        let title = title.to_string();
        let changed = self
            .with_conn(move |conn| {
                conn.execute(
                    "UPDATE todo_items SET title = ?1, is_done = ?2 WHERE id = ?3",
                    params![title, is_done, id],
                )
            })
            .await?;
        Ok(changed > 0)
    }

    /// Remove a row. Returns `false` when no row has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: TodoId) -> Result<bool, StoreError> {
        let changed = self
            .with_conn(move |conn| conn.execute("DELETE FROM todo_items WHERE id = ?1", params![id]))
            .await?;
        Ok(changed > 0)
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .with_conn(|conn| conn.query_row("SELECT COUNT(*) FROM todo_items", [], |row| row.get(0)))
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Insert the sample rows when the table is empty. Returns how many rows
    /// were inserted.
    #[tracing::instrument(skip(self))]
    pub async fn seed_if_empty(&self) -> Result<usize, StoreError> {
        let inserted = self
            .with_conn(|conn| {
                let tx = conn.transaction()?;
                let existing: i64 = tx.query_row("SELECT COUNT(*) FROM todo_items", [], |row| row.get(0))?;
                if existing > 0 {
                    return Ok(0);
                }
                for (title, is_done) in SEED_ITEMS {
                    tx.execute(
                        "INSERT INTO todo_items (title, is_done) VALUES (?1, ?2)",
                        params![title, is_done],
                    )?;
                }
                tx.commit()?;
                Ok(SEED_ITEMS.len())
            })
            .await?;
        if inserted > 0 {
            info!(count = inserted, "seeded empty todo store");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TodoStore {
        TodoStore::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn ids_are_assigned_in_ascending_order() {
        let store = store();
        let a = store.insert("first").await.unwrap();
        let b = store.insert("second").await.unwrap();
        assert!(b.id > a.id);
        assert!(!a.is_done);

        let listed: Vec<TodoId> = store.list().await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(listed, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = store();
        let a = store.insert("first").await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        let b = store.insert("second").await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = store();
        assert!(!store.update(99, "nope", true).await.unwrap());
        assert!(!store.delete(99).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_overwrites_title_and_flag() {
        let store = store();
        let item = store.insert("old").await.unwrap();
        assert!(store.update(item.id, "new", true).await.unwrap());
        let fetched = store.get(item.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "new");
        assert!(fetched.is_done);
    }

    #[tokio::test]
    async fn schema_rejects_overlong_titles() {
        let store = store();
        let err = store.insert(&"x".repeat(201)).await.unwrap_err();
        assert!(matches!(err, StoreError::Sql(_)));
    }

    #[tokio::test]
    async fn seed_only_fills_an_empty_table() {
        let store = store();
        assert_eq!(store.seed_if_empty().await.unwrap(), 3);
        assert_eq!(store.seed_if_empty().await.unwrap(), 0);

        let items = store.list().await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items.iter().filter(|i| i.is_done).count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_inserts_get_distinct_ids() {
        let store = store();
        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&format!("item {n}")).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(store.count().await.unwrap(), 16);
    }

    #[tokio::test]
    async fn file_backed_store_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("todos.db");
        {
            let store = TodoStore::open(&path).unwrap();
            store.insert("kept").await.unwrap();
        }
        let reopened = TodoStore::open(&path).unwrap();
        let items = reopened.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "kept");
    }
}
