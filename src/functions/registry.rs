use crate::functions::context::CallerIdentity;
use crate::functions::{CustomFunction, OperationKind};
use crate::permissions::PermissionRule;
use crate::rpc::RequestMeta;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds the caller identity for a request from its metadata.
///
/// Hosts plug in their own implementation when identity resolution involves
/// more than reading the upstream-provided id (sessions, API keys, ...).
pub trait ContextBuilder: Send + Sync {
    fn build(&self, meta: Option<&RequestMeta>) -> CallerIdentity;
}

/// Default context builder: takes the identity straight from the request
/// metadata and attaches a fixed environment map.
#[derive(Default)]
pub struct MetaContextBuilder {
    env: HashMap<String, String>,
}

impl MetaContextBuilder {
    pub fn new(env: HashMap<String, String>) -> Self {
        Self { env }
    }
}

impl ContextBuilder for MetaContextBuilder {
    fn build(&self, meta: Option<&RequestMeta>) -> CallerIdentity {
        CallerIdentity {
            id: meta.and_then(|m| m.identity.clone()),
            env: self.env.clone(),
        }
    }
}

/// Host-supplied configuration for the runtime: which functions exist, what
/// kind of operation each implements, and which permission rules guard it.
///
/// The registry is read-only once the dispatcher owns it; per-request state
/// lives elsewhere.
pub struct RuntimeConfig {
    functions: HashMap<String, Arc<dyn CustomFunction>>,
    permission_rules: HashMap<String, Vec<Arc<dyn PermissionRule>>>,
    operation_kinds: HashMap<String, OperationKind>,
    context_builder: Arc<dyn ContextBuilder>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            permission_rules: HashMap::new(),
            operation_kinds: HashMap::new(),
            context_builder: Arc::new(MetaContextBuilder::default()),
        }
    }

    /// Registers a function under a method name with its operation kind.
    pub fn with_function(
        mut self,
        method: &str,
        kind: OperationKind,
        handler: Arc<dyn CustomFunction>,
    ) -> Self {
        self.functions.insert(method.to_string(), handler);
        self.operation_kinds.insert(method.to_string(), kind);
        self
    }

    /// Adds a built-in permission rule for a method. Rules accumulate; all
    /// of them must pass for implicit permission to succeed.
    pub fn with_rule(mut self, method: &str, rule: Arc<dyn PermissionRule>) -> Self {
        self.permission_rules
            .entry(method.to_string())
            .or_default()
            .push(rule);
        self
    }

    pub fn with_context_builder(mut self, builder: Arc<dyn ContextBuilder>) -> Self {
        self.context_builder = builder;
        self
    }

    pub fn function(&self, method: &str) -> Option<Arc<dyn CustomFunction>> {
        self.functions.get(method).cloned()
    }

    pub fn rules(&self, method: &str) -> &[Arc<dyn PermissionRule>] {
        self.permission_rules
            .get(method)
            .map_or(&[], Vec::as_slice)
    }

    /// The declared kind for a method. Methods registered without a specific
    /// kind behave as custom singular writes.
    pub fn kind(&self, method: &str) -> OperationKind {
        self.operation_kinds
            .get(method)
            .copied()
            .unwrap_or(OperationKind::Write)
    }

    pub fn build_context(&self, meta: Option<&RequestMeta>) -> CallerIdentity {
        self.context_builder.build(meta)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}
