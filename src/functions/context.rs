use crate::db::{DataView, Transaction};
use crate::error::RuntimeResult;
use crate::permissions::PermissionTracker;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Response headers shared between the dispatcher and the function context.
/// The dispatcher collects them after the transaction has resolved.
pub type SharedHeaders = Arc<Mutex<HashMap<String, Vec<String>>>>;

/// Who is making this request, as resolved by the configured context
/// builder. Visible to function bodies and permission rules alike.
#[derive(Debug, Clone, Default)]
pub struct CallerIdentity {
    /// Identity id of the caller, if the request was authenticated upstream.
    pub id: Option<String>,
    /// Host-supplied environment values (feature flags, deployment info).
    pub env: HashMap<String, String>,
}

/// The context object handed to a custom function body.
///
/// Everything a function touches goes through here: explicit permission
/// decisions are routed to the request's tracker, data access is scoped to
/// the open transaction, and response headers accumulate for the dispatcher
/// to attach to the success envelope.
pub struct FunctionContext {
    method: String,
    caller: CallerIdentity,
    permissions: Arc<PermissionTracker>,
    headers: SharedHeaders,
    tx: Arc<Transaction>,
}

impl FunctionContext {
    pub(crate) fn new(
        method: &str,
        caller: CallerIdentity,
        permissions: Arc<PermissionTracker>,
        headers: SharedHeaders,
        tx: Arc<Transaction>,
    ) -> Self {
        Self {
            method: method.to_string(),
            caller,
            permissions,
            headers,
            tx,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn caller(&self) -> &CallerIdentity {
        &self.caller
    }

    /// The authenticated caller id, if any.
    pub fn identity(&self) -> Option<&str> {
        self.caller.id.as_deref()
    }

    /// Explicitly permits this request, bypassing built-in rule evaluation.
    pub fn permit(&self) {
        self.permissions.permit();
    }

    /// Explicitly denies this request; the transaction will not commit.
    pub fn deny(&self) {
        self.permissions.deny();
    }

    /// Appends a response header. Names are normalized to lowercase and
    /// comma-joined values are split into individual entries.
    pub fn set_header(&self, name: &str, value: &str) {
        let mut headers = self.headers.lock().expect("response headers poisoned");
        let entry = headers.entry(name.to_ascii_lowercase()).or_default();
        for part in value.split(", ") {
            entry.push(part.to_string());
        }
    }

    /// A fresh unique row id.
    pub fn new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// The current timestamp, RFC 3339 formatted, for created/updated fields.
    pub fn now(&self) -> String {
        chrono::Utc::now().to_rfc3339()
    }

    // Data access, scoped to the active transaction. Writes stay invisible
    // outside the transaction until the permission outcome allows a commit.

    pub fn insert(&self, model: &str, id: &str, row: Value) -> RuntimeResult<()> {
        self.tx.insert_row(model, id, row)
    }

    pub fn update(&self, model: &str, id: &str, changes: Value) -> RuntimeResult<Value> {
        self.tx.update_row(model, id, changes)
    }

    pub fn delete(&self, model: &str, id: &str) -> RuntimeResult<bool> {
        self.tx.delete_row(model, id)
    }

    pub fn get(&self, model: &str, id: &str) -> RuntimeResult<Option<Value>> {
        self.tx.get_row(model, id)
    }

    pub fn list(&self, model: &str) -> RuntimeResult<Vec<Value>> {
        self.tx.list_rows(model)
    }
}
