//! Common test utilities and fixtures for runtime integration tests.
//!
//! Provides a dispatcher over a temporary row store, a small task-domain
//! function set, and the permission rules the scenarios share.

#![allow(dead_code)]

use datagate::rpc::PermissionGrant;
use datagate::{
    handler_fn, CallerIdentity, CustomFunction, DataView, Database, Dispatcher, PermissionRule,
    Request, RequestMeta, RuntimeConfig, RuntimeError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

/// Dispatcher plus direct store access, over a temporary sled database.
pub struct TestFixture {
    pub db: Database,
    pub dispatcher: Dispatcher,
    pub _temp_dir: TempDir,
}

impl TestFixture {
    pub fn new(config: RuntimeConfig) -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp directory");
        let db = sled::Config::new()
            .path(temp_dir.path())
            .temporary(true)
            .open()
            .expect("failed to open temporary database");
        let db = Database::from_sled(db).expect("failed to create row store");

        Self {
            dispatcher: Dispatcher::new(db.clone(), config),
            db,
            _temp_dir: temp_dir,
        }
    }

    /// Commits a task row directly, bypassing the dispatcher.
    pub async fn seed_task(&self, id: &str, owner: &str, status: &str) {
        let row = json!({"id": id, "owner_id": owner, "status": status});
        self.db
            .transaction(|tx| async move { tx.insert_row("task", id, row) })
            .await
            .expect("failed to seed task");
    }

    pub fn committed_tasks(&self) -> Vec<Value> {
        self.db.list_rows("task").expect("failed to list tasks")
    }
}

pub fn request(method: &str, params: Value) -> Request {
    Request {
        id: json!(1),
        method: method.to_string(),
        params,
        meta: None,
    }
}

pub fn request_as(method: &str, params: Value, identity: &str) -> Request {
    Request {
        id: json!(1),
        method: method.to_string(),
        params,
        meta: Some(RequestMeta {
            identity: Some(identity.to_string()),
            ..Default::default()
        }),
    }
}

/// A request whose authorization was already granted by an outer layer.
pub fn request_granted(method: &str, params: Value, identity: &str) -> Request {
    Request {
        id: json!(1),
        method: method.to_string(),
        params,
        meta: Some(RequestMeta {
            identity: Some(identity.to_string()),
            permission_state: Some(PermissionGrant {
                status: "granted".to_string(),
            }),
            ..Default::default()
        }),
    }
}

// ---------------------------------------------------------------------------
// Permission rules
// ---------------------------------------------------------------------------

pub fn allow_all() -> Arc<dyn PermissionRule> {
    Arc::new(|_: &Value, _: &dyn DataView, _: &CallerIdentity| Ok(true))
}

pub fn deny_all() -> Arc<dyn PermissionRule> {
    Arc::new(|_: &Value, _: &dyn DataView, _: &CallerIdentity| Ok(false))
}

/// The row's `owner_id` must match the caller. Delete results only carry an
/// id, so the rule falls back to looking the row up through the view.
pub fn task_owner_rule() -> Arc<dyn PermissionRule> {
    Arc::new(
        |row: &Value, view: &dyn DataView, caller: &CallerIdentity| {
            let Some(caller_id) = caller.id.as_deref() else {
                return Ok(false);
            };

            if let Some(owner) = row.get("owner_id").and_then(Value::as_str) {
                return Ok(owner == caller_id);
            }

            if let Some(id) = row.get("id").and_then(Value::as_str) {
                let stored = view.get_row("task", id)?;
                return Ok(stored
                    .and_then(|r| r.get("owner_id").and_then(Value::as_str).map(String::from))
                    .as_deref()
                    == Some(caller_id));
            }

            Ok(false)
        },
    )
}

// ---------------------------------------------------------------------------
// Task-domain function handlers
// ---------------------------------------------------------------------------

/// Inserts a task owned by the caller (or an explicit `owner_id` param) and
/// returns the created row. Makes no explicit permission decision.
pub fn create_task_handler() -> Arc<dyn CustomFunction> {
    handler_fn(|ctx, params| {
        Box::pin(async move {
            let id = params
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("t1")
                .to_string();
            let owner = params
                .get("owner_id")
                .and_then(Value::as_str)
                .map(String::from)
                .or_else(|| ctx.identity().map(String::from));
            let row = json!({
                "id": id,
                "owner_id": owner,
                "status": "new",
            });
            ctx.insert("task", &id, row.clone())?;
            Ok(Some(row))
        })
    })
}

pub fn get_task_handler() -> Arc<dyn CustomFunction> {
    handler_fn(|ctx, params| {
        Box::pin(async move {
            let id = require_id(&params)?;
            let row = ctx
                .get("task", &id)?
                .ok_or_else(|| RuntimeError::Function(format!("task '{}' not found", id)))?;
            Ok(Some(row))
        })
    })
}

pub fn list_tasks_handler() -> Arc<dyn CustomFunction> {
    handler_fn(|ctx, _params| Box::pin(async move { Ok(Some(Value::Array(ctx.list("task")?))) }))
}

/// Sets the task's `status` from params and returns the updated row.
pub fn update_status_handler() -> Arc<dyn CustomFunction> {
    handler_fn(|ctx, params| {
        Box::pin(async move {
            let id = require_id(&params)?;
            let status = params
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("done");
            let row = ctx.update("task", &id, json!({"status": status}))?;
            Ok(Some(row))
        })
    })
}

/// Deletes the task and returns its id, the shape delete rules evaluate.
pub fn delete_task_handler() -> Arc<dyn CustomFunction> {
    handler_fn(|ctx, params| {
        Box::pin(async move {
            let id = require_id(&params)?;
            ctx.delete("task", &id)?;
            Ok(Some(json!(id)))
        })
    })
}

fn require_id(params: &Value) -> Result<String, RuntimeError> {
    params
        .get("id")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| RuntimeError::Function("missing required param 'id'".to_string()))
}
