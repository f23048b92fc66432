//! Permission state tracking and built-in rule evaluation.
//!
//! Every request carries exactly one [`PermissionTracker`]. Function bodies
//! may settle the decision explicitly; when they do not, the executor falls
//! back to evaluating the schema-declared [`PermissionRule`]s against the
//! rows the operation touched.

pub mod evaluator;
pub mod rows;
pub mod state;

use crate::db::DataView;
use crate::error::RuntimeResult;
use crate::functions::context::CallerIdentity;
use serde_json::Value;

pub use evaluator::check_built_in_permissions;
pub use rows::rows_for_permissions;
pub use state::{PermissionState, PermissionTracker};

/// A schema-declared predicate bound to an operation.
///
/// Rules are read-only collaborators: they may look up whatever data they
/// need through the supplied view, but must not mutate anything. All rules
/// configured for an operation must pass for every resolved row.
pub trait PermissionRule: Send + Sync {
    fn allows(
        &self,
        row: &Value,
        view: &dyn DataView,
        caller: &CallerIdentity,
    ) -> RuntimeResult<bool>;
}

impl<F> PermissionRule for F
where
    F: Fn(&Value, &dyn DataView, &CallerIdentity) -> RuntimeResult<bool> + Send + Sync,
{
    fn allows(
        &self,
        row: &Value,
        view: &dyn DataView,
        caller: &CallerIdentity,
    ) -> RuntimeResult<bool> {
        self(row, view, caller)
    }
}
