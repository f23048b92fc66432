use crate::db::database::Database;
use crate::error::{RuntimeError, RuntimeResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Read access to row data.
///
/// Permission rules receive this as an explicit parameter so the choice of
/// handle is visible at every call site: a [`Database`] view observes
/// committed state only, a [`Transaction`] view additionally observes the
/// writes staged by that transaction.
pub trait DataView: Send + Sync {
    fn get_row(&self, model: &str, id: &str) -> RuntimeResult<Option<Value>>;
    fn list_rows(&self, model: &str) -> RuntimeResult<Vec<Value>>;
}

/// A single request's staging area over the committed store.
///
/// Writes accumulate in an in-memory overlay keyed like the backing tree;
/// `None` entries are tombstones for deletes. Nothing reaches sled until
/// [`Transaction::commit`], which applies the whole overlay as one atomic
/// batch. Dropping the transaction without committing discards the overlay.
pub struct Transaction {
    base: Database,
    staged: Mutex<BTreeMap<String, Option<Value>>>,
}

impl Transaction {
    pub(crate) fn new(base: Database) -> Self {
        Self {
            base,
            staged: Mutex::new(BTreeMap::new()),
        }
    }

    fn stage(&self, key: String, value: Option<Value>) {
        let mut staged = self.staged.lock().expect("transaction overlay poisoned");
        staged.insert(key, value);
    }

    /// Stages an insert. The row becomes visible to this transaction's own
    /// reads immediately, and to everyone else only after commit.
    pub fn insert_row(&self, model: &str, id: &str, row: Value) -> RuntimeResult<()> {
        if !row.is_object() {
            return Err(RuntimeError::Database(format!(
                "row '{}:{}' must be a JSON object",
                model, id
            )));
        }
        self.stage(Database::row_key(model, id), Some(row));
        Ok(())
    }

    /// Stages an update by merging `changes` over the current row value.
    /// Fails if the row does not exist in this transaction's view.
    pub fn update_row(&self, model: &str, id: &str, changes: Value) -> RuntimeResult<Value> {
        let mut row = self.get_row(model, id)?.ok_or_else(|| {
            RuntimeError::Database(format!("row '{}:{}' not found", model, id))
        })?;

        let changes = changes.as_object().cloned().ok_or_else(|| {
            RuntimeError::Database(format!(
                "update for '{}:{}' must be a JSON object",
                model, id
            ))
        })?;
        if let Some(target) = row.as_object_mut() {
            for (field, value) in changes {
                target.insert(field, value);
            }
        }

        self.stage(Database::row_key(model, id), Some(row.clone()));
        Ok(row)
    }

    /// Stages a delete. Returns whether the row existed in this
    /// transaction's view.
    pub fn delete_row(&self, model: &str, id: &str) -> RuntimeResult<bool> {
        let existed = self.get_row(model, id)?.is_some();
        self.stage(Database::row_key(model, id), None);
        Ok(existed)
    }

    /// Applies the overlay to the backing store as one atomic batch.
    pub(crate) fn commit(&self) -> RuntimeResult<()> {
        let staged = self.staged.lock().expect("transaction overlay poisoned");
        if staged.is_empty() {
            return Ok(());
        }

        let mut batch = sled::Batch::default();
        for (key, value) in staged.iter() {
            match value {
                Some(row) => batch.insert(key.as_bytes(), serde_json::to_vec(row)?),
                None => batch.remove(key.as_bytes()),
            }
        }
        self.base.apply(batch)
    }
}

impl DataView for Transaction {
    fn get_row(&self, model: &str, id: &str) -> RuntimeResult<Option<Value>> {
        let key = Database::row_key(model, id);
        {
            let staged = self.staged.lock().expect("transaction overlay poisoned");
            if let Some(entry) = staged.get(&key) {
                return Ok(entry.clone());
            }
        }
        self.base.read_row(&key)
    }

    fn list_rows(&self, model: &str) -> RuntimeResult<Vec<Value>> {
        // Committed rows first, then the overlay wins per key.
        let mut merged: BTreeMap<String, Value> = self.base.scan_model(model)?.into_iter().collect();

        let prefix = format!("{}:", model);
        let staged = self.staged.lock().expect("transaction overlay poisoned");
        for (key, value) in staged.range(prefix.clone()..) {
            if !key.starts_with(&prefix) {
                break;
            }
            match value {
                Some(row) => {
                    merged.insert(key.clone(), row.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(merged.into_values().collect())
    }
}
