use crate::db::{Database, DataView};
use crate::error::{RuntimeError, RuntimeResult};
use crate::functions::context::{CallerIdentity, FunctionContext, SharedHeaders};
use crate::functions::{CustomFunction, OperationKind};
use crate::permissions::{
    check_built_in_permissions, rows_for_permissions, PermissionRule, PermissionState,
    PermissionTracker,
};
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// Everything the executor needs to run one function call. Assembled by the
/// dispatcher; every piece of per-request state is an explicit field here
/// rather than ambient lookup.
pub struct FunctionCall {
    pub method: String,
    pub kind: OperationKind,
    pub handler: Arc<dyn CustomFunction>,
    pub rules: Vec<Arc<dyn PermissionRule>>,
    pub caller: CallerIdentity,
    pub tracker: Arc<PermissionTracker>,
    pub headers: SharedHeaders,
    pub params: Value,
}

/// Runs a custom function inside a single transaction and enforces the
/// permission outcome.
///
/// The function body executes against a transaction-scoped context, so every
/// write it performs is staged, not persisted. After the body returns, the
/// tracker decides what happens:
///
/// - `Permitted`: the staged writes commit and the function result stands.
/// - `Unpermitted`: the call fails with a denial; nothing commits.
/// - `Unresolved`: the function result is resolved into rows and the
///   built-in rules run. Creates are checked against the transaction's own
///   view (the inserted row exists nowhere else yet); every other kind is
///   checked against the committed view, so rules cannot observe the
///   mutations this transaction has staged.
///
/// Errors raised by the function body abort the transaction and propagate
/// unchanged. A `None` result does not influence the commit decision; the
/// dispatcher reports it separately once the transaction has resolved.
pub async fn execute_call(db: &Database, call: FunctionCall) -> RuntimeResult<Option<Value>> {
    let FunctionCall {
        method,
        kind,
        handler,
        rules,
        caller,
        tracker,
        headers,
        params,
    } = call;

    db.transaction(move |tx| async move {
        let ctx = Arc::new(FunctionContext::new(
            &method,
            caller.clone(),
            Arc::clone(&tracker),
            headers,
            Arc::clone(&tx),
        ));

        let result = handler.call(ctx, params).await?;

        match tracker.state() {
            PermissionState::Permitted => Ok(result),
            PermissionState::Unpermitted => Err(RuntimeError::NotPermitted(method)),
            PermissionState::Unresolved => {
                debug!(
                    "no explicit permission decision for '{}', checking built-in rules",
                    method
                );
                let value = result.clone().unwrap_or(Value::Null);
                let rows = rows_for_permissions(kind, &value);

                let view: &dyn DataView = if kind.peeks_inside_transaction() {
                    tx.as_ref()
                } else {
                    db
                };
                check_built_in_permissions(&method, &rows, &rules, view, &caller)?;

                Ok(result)
            }
        }
    })
    .await
}
