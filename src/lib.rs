//! # Datagate
//!
//! Datagate executes user-supplied "custom functions" that implement backend
//! operations (create/update/get/list/delete) over a row store, and enforces
//! an authorization decision for every execution before its side effects
//! become visible.
//!
//! ## Core Components
//!
//! * `rpc` - JSON-RPC request and response envelopes
//! * `runtime` - The transactional executor and the request dispatcher
//! * `permissions` - Permission state tracking and built-in rule evaluation
//! * `functions` - Custom function handlers, execution context, and registry
//! * `db` - Row storage with a staged transaction overlay
//! * `error` - Error types and stable wire-level error codes
//! * `config` - Node settings
//! * `server` - Thin HTTP host for a dispatcher
//!
//! ## Execution Model
//!
//! Each request runs inside exactly one transaction. The function body may
//! explicitly permit or deny the request through its context; if it does
//! neither, the schema-declared permission rules registered for the method
//! are evaluated against the rows the operation touched. The transaction
//! commits if and only if the final permission state is permitted, so no
//! write ever becomes visible on a denied or failed request.
//!
//! Built-in checks for create operations run against the transaction's own
//! view of the data (the created row exists nowhere else yet); checks for
//! every other operation run against the committed view and can never
//! observe the transaction's staged writes.

pub mod config;
pub mod db;
pub mod error;
pub mod functions;
pub mod permissions;
pub mod rpc;
pub mod runtime;
pub mod server;

// Re-export main types for convenience
pub use config::{load_settings, NodeSettings};
pub use db::{DataView, Database, Transaction};
pub use error::{RuntimeError, RuntimeResult};
pub use functions::context::{CallerIdentity, FunctionContext};
pub use functions::{handler_fn, CustomFunction, OperationKind, RuntimeConfig};
pub use permissions::{PermissionRule, PermissionState, PermissionTracker};
pub use rpc::{Request, RequestMeta, Response};
pub use runtime::Dispatcher;
