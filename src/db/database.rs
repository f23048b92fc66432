use crate::db::transaction::{DataView, Transaction};
use crate::error::{RuntimeError, RuntimeResult};
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// The committed view of the row store.
///
/// Rows live in a dedicated sled tree under `"{model}:{id}"` keys, serialized
/// as JSON. A `Database` handle never observes writes staged by an open
/// [`Transaction`]; anything read through it is durable, committed state.
#[derive(Clone)]
pub struct Database {
    db: sled::Db,
    rows_tree: sled::Tree,
}

impl Database {
    /// Opens (or creates) the store at the given path.
    pub fn open(path: &Path) -> RuntimeResult<Self> {
        let db = sled::open(path)?;
        Self::from_sled(db)
    }

    /// Wraps an already opened sled database. Used by tests with temporary
    /// databases.
    pub fn from_sled(db: sled::Db) -> RuntimeResult<Self> {
        let rows_tree = db.open_tree("rows")?;
        Ok(Self { db, rows_tree })
    }

    /// Gets a reference to the underlying sled database.
    pub fn sled(&self) -> &sled::Db {
        &self.db
    }

    pub(crate) fn row_key(model: &str, id: &str) -> String {
        format!("{}:{}", model, id)
    }

    pub(crate) fn read_row(&self, key: &str) -> RuntimeResult<Option<Value>> {
        match self.rows_tree.get(key.as_bytes())? {
            Some(bytes) => {
                let row = serde_json::from_slice(&bytes)
                    .map_err(|e| RuntimeError::Database(format!("corrupt row '{}': {}", key, e)))?;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    /// Lists all committed `(key, row)` pairs for a model, in key order.
    pub(crate) fn scan_model(&self, model: &str) -> RuntimeResult<Vec<(String, Value)>> {
        let prefix = format!("{}:", model);
        let mut rows = Vec::new();
        for entry in self.rows_tree.scan_prefix(prefix.as_bytes()) {
            let (key, bytes) = entry?;
            let key_str = String::from_utf8_lossy(&key).to_string();
            let row = serde_json::from_slice(&bytes).map_err(|e| {
                RuntimeError::Database(format!("corrupt row '{}': {}", key_str, e))
            })?;
            rows.push((key_str, row));
        }
        Ok(rows)
    }

    /// Applies a batch of staged writes atomically and flushes to disk.
    pub(crate) fn apply(&self, batch: sled::Batch) -> RuntimeResult<()> {
        self.rows_tree.apply_batch(batch)?;
        self.rows_tree.flush()?;
        Ok(())
    }

    /// Runs `body` inside a fresh transaction.
    ///
    /// The body receives the transaction handle; every write it stages stays
    /// in memory until the body returns. `Ok` commits the staged writes
    /// atomically; `Err` discards them, so an aborted body leaves the store
    /// exactly as it found it.
    pub async fn transaction<T, F, Fut>(&self, body: F) -> RuntimeResult<T>
    where
        F: FnOnce(Arc<Transaction>) -> Fut,
        Fut: Future<Output = RuntimeResult<T>>,
    {
        let tx = Arc::new(Transaction::new(self.clone()));
        match body(Arc::clone(&tx)).await {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }
}

impl DataView for Database {
    fn get_row(&self, model: &str, id: &str) -> RuntimeResult<Option<Value>> {
        self.read_row(&Self::row_key(model, id))
    }

    fn list_rows(&self, model: &str) -> RuntimeResult<Vec<Value>> {
        Ok(self.scan_model(model)?.into_iter().map(|(_, row)| row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_database() -> Database {
        let db = sled::Config::new().temporary(true).open().unwrap();
        Database::from_sled(db).unwrap()
    }

    #[tokio::test]
    async fn test_transaction_commits_on_ok() {
        let db = temp_database();
        db.transaction(|tx| async move {
            tx.insert_row("task", "t1", json!({"id": "t1", "title": "first"}))?;
            Ok(())
        })
        .await
        .unwrap();

        let row = db.get_row("task", "t1").unwrap().unwrap();
        assert_eq!(row["title"], "first");
    }

    #[tokio::test]
    async fn test_transaction_discards_on_err() {
        let db = temp_database();
        let result: RuntimeResult<()> = db
            .transaction(|tx| async move {
                tx.insert_row("task", "t1", json!({"id": "t1"}))?;
                Err(RuntimeError::Function("abort".into()))
            })
            .await;

        assert!(result.is_err());
        assert!(db.get_row("task", "t1").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_rows_scans_single_model() {
        let db = temp_database();
        db.transaction(|tx| async move {
            tx.insert_row("task", "a", json!({"id": "a"}))?;
            tx.insert_row("task", "b", json!({"id": "b"}))?;
            tx.insert_row("user", "u", json!({"id": "u"}))?;
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(db.list_rows("task").unwrap().len(), 2);
        assert_eq!(db.list_rows("user").unwrap().len(), 1);
    }
}
