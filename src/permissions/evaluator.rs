use crate::db::DataView;
use crate::error::{RuntimeError, RuntimeResult};
use crate::functions::context::CallerIdentity;
use crate::permissions::PermissionRule;
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// Evaluates the schema-declared permission rules for an operation.
///
/// This is the fallback path taken when the function body made no explicit
/// decision. Every rule must pass for every row; an empty rule set fails
/// closed. The caller chooses `view` deliberately: for creates it is the
/// in-transaction view (the inserted row does not exist anywhere else yet),
/// for everything else it is the committed view, so checks can never be
/// influenced by writes the current transaction has staged.
///
/// A rule returning `Ok(false)` denies the request; a rule returning `Err`
/// is a fault and propagates as-is.
pub fn check_built_in_permissions(
    method: &str,
    rows: &[Value],
    rules: &[Arc<dyn PermissionRule>],
    view: &dyn DataView,
    caller: &CallerIdentity,
) -> RuntimeResult<()> {
    if rules.is_empty() {
        debug!("no permission rules configured for '{}', failing closed", method);
        return Err(RuntimeError::NotPermitted(method.to_string()));
    }

    for row in rows {
        for rule in rules {
            if !rule.allows(row, view, caller)? {
                debug!("permission rule rejected a row for '{}'", method);
                return Err(RuntimeError::NotPermitted(method.to_string()));
            }
        }
    }

    Ok(())
}
