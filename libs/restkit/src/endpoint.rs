//! Endpoint enumeration.
//!
//! Two endpoint sources feed the mapping engine: the fixed CRUD set derived
//! from a resource's declared routes, and a declarative list the resource
//! enumerates itself. Both produce [`EndpointDef`] values; the engine only
//! resolves paths, schema fallbacks and authentication afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use serde_json::Value;

use crate::auth::AuthRef;
use crate::envelope::{JsonReply, RequestEnvelope};
use crate::error::OpError;
use crate::list::ListAdaptor;
use crate::resource::{OperationKind, Resource};
use crate::schema::OperationSchema;

/// Custom operation invoked with the normalized request envelope.
#[async_trait]
pub trait EnvelopeHandler: Send + Sync {
    async fn call(&self, envelope: RequestEnvelope) -> Result<JsonReply, OpError>;
}

#[async_trait]
impl<F, Fut> EnvelopeHandler for F
where
    F: Fn(RequestEnvelope) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<JsonReply, OpError>> + Send,
{
    async fn call(&self, envelope: RequestEnvelope) -> Result<JsonReply, OpError> {
        (self)(envelope).await
    }
}

/// What a route invokes on the resource.
#[derive(Clone)]
pub enum Binding {
    Operation(OperationKind),
    Custom(Arc<dyn EnvelopeHandler>),
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Operation(kind) => write!(f, "Binding::Operation({})", kind.action()),
            Binding::Custom(_) => write!(f, "Binding::Custom(..)"),
        }
    }
}

/// One declared endpoint of a resource, before path/schema/auth resolution.
#[derive(Debug, Clone)]
pub struct EndpointDef {
    /// Action name used in the operation id and generated docs.
    pub action: String,
    pub method: Method,
    /// Path relative to the resource base path. Empty means the base path
    /// itself; a leading `/` makes it absolute. Declarative endpoints own
    /// their parameter segments (`:id` or `{id}`).
    pub rel_path: String,
    pub binding: Binding,
    /// Explicit schema; when absent the engine projects one from the
    /// resource's field schema.
    pub schema: Option<OperationSchema>,
    /// Per-endpoint authentication override.
    pub auth: Option<AuthRef>,
}

impl EndpointDef {
    pub fn new(action: impl Into<String>, method: Method, rel_path: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            method,
            rel_path: rel_path.into(),
            binding: Binding::Operation(OperationKind::Get),
            schema: None,
            auth: None,
        }
    }

    pub fn operation(mut self, kind: OperationKind) -> Self {
        self.binding = Binding::Operation(kind);
        self
    }

    pub fn handler(mut self, handler: Arc<dyn EnvelopeHandler>) -> Self {
        self.binding = Binding::Custom(handler);
        self
    }

    pub fn with_schema(mut self, schema: OperationSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_auth(mut self, auth: AuthRef) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// Fixed CRUD endpoint source: one endpoint per declared operation, verbs
/// from the resource's methods mapping, entity-scoped operations addressed
/// by an `{id}` segment appended by the engine's path convention.
pub fn crud_endpoints(resource: &dyn Resource) -> Vec<EndpointDef> {
    resource
        .routes()
        .into_iter()
        .map(|kind| {
            let rel = if kind.entity_scoped() { "{id}" } else { "" };
            EndpointDef::new(kind.action(), resource.methods().verb(kind), rel).operation(kind)
        })
        .collect()
}

/// Enumerate a resource's endpoints, preferring its declarative list when
/// it provides one.
pub fn enumerate(
    resource: &dyn Resource,
    list_adaptor: Option<&Arc<dyn ListAdaptor>>,
) -> Vec<EndpointDef> {
    resource
        .endpoints(list_adaptor)
        .unwrap_or_else(|| crud_endpoints(resource))
}

/// Convenience for custom handlers returning a bare JSON value.
pub fn reply(body: Value) -> Result<JsonReply, OpError> {
    Ok(JsonReply::ok(body))
}
