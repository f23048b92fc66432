//! Custom function handlers and the configuration that binds them to
//! operations, permission rules, and caller context.

pub mod context;
pub mod registry;

use crate::error::RuntimeResult;
use crate::functions::context::FunctionContext;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub use context::{CallerIdentity, SharedHeaders};
pub use registry::{ContextBuilder, MetaContextBuilder, RuntimeConfig};

/// Classification of an operation, as declared by the host's schema.
///
/// The kind drives two things: how the function's return value resolves into
/// rows for the built-in permission rules, and which database view those
/// rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Get,
    Create,
    Update,
    List,
    Delete,
    /// Custom read operation; treated as singular for row resolution.
    Read,
    /// Custom write operation; treated as singular for row resolution.
    Write,
}

impl OperationKind {
    /// Whether built-in permission checks for this kind must run against the
    /// in-transaction view. Only creates qualify: the row they need to
    /// inspect has no existence outside the transaction yet.
    pub fn peeks_inside_transaction(&self) -> bool {
        matches!(self, OperationKind::Create)
    }
}

/// User-supplied logic implementing one backend operation.
///
/// The function receives its execution context and the request params, and
/// returns an optional result value. Returning `None` where the operation
/// requires a result surfaces as a no-result error to the caller; it does
/// not affect the commit decision.
#[async_trait]
pub trait CustomFunction: Send + Sync {
    async fn call(&self, ctx: Arc<FunctionContext>, params: Value) -> RuntimeResult<Option<Value>>;
}

struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F> CustomFunction for FnHandler<F>
where
    F: Fn(Arc<FunctionContext>, Value) -> BoxFuture<'static, RuntimeResult<Option<Value>>>
        + Send
        + Sync,
{
    async fn call(&self, ctx: Arc<FunctionContext>, params: Value) -> RuntimeResult<Option<Value>> {
        (self.f)(ctx, params).await
    }
}

/// Wraps an async closure as a [`CustomFunction`].
///
/// ```
/// use datagate::functions::handler_fn;
/// use serde_json::json;
///
/// let handler = handler_fn(|ctx, params| {
///     Box::pin(async move {
///         ctx.permit();
///         Ok(Some(json!({"echo": params})))
///     })
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F>(f: F) -> Arc<dyn CustomFunction>
where
    F: Fn(Arc<FunctionContext>, Value) -> BoxFuture<'static, RuntimeResult<Option<Value>>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnHandler { f })
}
