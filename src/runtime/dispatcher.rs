use crate::db::Database;
use crate::error::RuntimeError;
use crate::functions::context::SharedHeaders;
use crate::functions::RuntimeConfig;
use crate::permissions::PermissionTracker;
use crate::rpc::{Request, Response};
use crate::runtime::executor::{execute_call, FunctionCall};
use log::{error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{field, info_span, Instrument, Span};

/// Top-level entry point for a runtime instance.
///
/// Owns the committed-state database handle and the host configuration, and
/// turns each inbound [`Request`] into exactly one [`Response`]. Nothing
/// escapes as a panic or unhandled error; every outcome is an envelope.
pub struct Dispatcher {
    db: Database,
    config: RuntimeConfig,
}

impl Dispatcher {
    pub fn new(db: Database, config: RuntimeConfig) -> Self {
        Self { db, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Dispatches one request, wrapping the whole execution in a single
    /// tracing span. The span records the error message and is marked
    /// failed on every error path.
    pub async fn dispatch(&self, request: Request) -> Response {
        let span = info_span!(
            "handle_request",
            method = %request.method,
            otel.status_code = field::Empty,
            error = field::Empty,
        );

        async move {
            let response = self.dispatch_inner(request).await;
            match &response.error {
                Some(e) => {
                    Span::current().record("otel.status_code", "ERROR");
                    Span::current().record("error", e.message.as_str());
                }
                None => {
                    Span::current().record("otel.status_code", "OK");
                }
            }
            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch_inner(&self, request: Request) -> Response {
        let Request {
            id,
            method,
            params,
            meta,
        } = request;

        info!("dispatching '{}'", method);

        // No handler means no transaction is ever opened.
        let Some(handler) = self.config.function(&method) else {
            let err = RuntimeError::MethodNotFound(method);
            warn!("{}", err);
            return Response::error(id, err.code(), err.to_string());
        };

        let caller = self.config.build_context(meta.as_ref());

        // An upstream layer may have settled authorization already; a granted
        // verdict pre-seeds the tracker and short-circuits built-in rules.
        let granted = meta
            .as_ref()
            .and_then(|m| m.permission_state.as_ref())
            .is_some_and(|g| g.is_granted());
        let tracker = Arc::new(if granted {
            PermissionTracker::pre_granted()
        } else {
            PermissionTracker::new()
        });

        let headers: SharedHeaders = Arc::new(Mutex::new(HashMap::new()));

        let call = FunctionCall {
            method: method.clone(),
            kind: self.config.kind(&method),
            handler,
            rules: self.config.rules(&method).to_vec(),
            caller,
            tracker,
            headers: Arc::clone(&headers),
            params,
        };

        match execute_call(&self.db, call).await {
            Ok(Some(result)) => {
                let collected = headers.lock().expect("response headers poisoned").clone();
                Response::success(id, result, collected)
            }
            Ok(None) => {
                // The transaction has already resolved by now; the missing
                // result is reported without disturbing its outcome.
                let err = RuntimeError::NoResult(method);
                warn!("{}", err);
                Response::error(id, err.code(), err.to_string())
            }
            Err(e) => {
                // Denials are an expected outcome, not a fault.
                if e.is_denial() {
                    warn!("'{}' denied: {}", method, e);
                } else {
                    error!("'{}' failed: {}", method, e);
                }
                Response::error(id, e.code(), e.to_string())
            }
        }
    }
}
